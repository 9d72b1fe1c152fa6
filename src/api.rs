//! REST API for the load planner.
//!
//! Thin adapter over the planning core: requests are validated, handed to the
//! core, and the outcome is returned in one piece. Uses Axum as the web
//! framework and supports CORS.

use std::sync::OnceLock;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

use container_loader::allocator::{
    PlanError, PoolEntry, expand_container_pool, pack_into_multiple_containers_with_config,
};
use container_loader::bundling::calculate_bundling_options;
use container_loader::catalog::{container_presets, filler_catalog};
use container_loader::filler::calculate_filler_options_with_color;
use container_loader::model::{
    BundleDims, BundleLayout, BundlingConfiguration, CargoItem, CargoTemplate, Container,
    FillerOption, MultiContainerPackingResult, PackagingType, PackedContainer, PackingResult,
    Permutation, PlacedCargo, ValidationError,
};
use container_loader::space::{Space, SupportingSurface};

use crate::config::{ApiConfig, PlannerConfig};

#[derive(Clone)]
struct ApiState {
    planner: PlannerConfig,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>container-loader API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Request structure for the packing endpoint.
///
/// `containers` is the pool to draw from; each entry may be used `quantity` times.
#[derive(Deserialize, ToSchema)]
#[schema(
    example = json!({
        "containers": [
            {
                "container": {
                    "id": "20GP",
                    "name": "20' GP",
                    "length": 5898.0,
                    "width": 2352.0,
                    "height": 2393.0,
                    "max_weight": 28200.0
                },
                "quantity": 2
            }
        ],
        "cargo": [
            {
                "id": "large-box",
                "name": "Large Box",
                "length": 1200.0,
                "width": 1000.0,
                "height": 800.0,
                "weight": 250.0,
                "quantity": 15,
                "is_fragile": false,
                "packaging": "other"
            }
        ]
    })
)]
pub struct PackRequest {
    pub containers: Vec<PoolEntry>,
    pub cargo: Vec<CargoItem>,
}

#[derive(Debug)]
struct ValidatedPackRequest {
    pool: Vec<Container>,
    cargo: Vec<CargoItem>,
}

#[derive(Debug)]
enum PackRequestValidationError {
    InvalidContainer(ValidationError),
    InvalidCargo(ValidationError),
    Plan(PlanError),
}

impl PackRequest {
    fn into_validated(self) -> Result<ValidatedPackRequest, PackRequestValidationError> {
        for entry in &self.containers {
            entry
                .container
                .validate()
                .map_err(PackRequestValidationError::InvalidContainer)?;
        }
        for item in &self.cargo {
            item.validate()
                .map_err(PackRequestValidationError::InvalidCargo)?;
        }

        let pool = expand_container_pool(&self.containers);
        if pool.is_empty() {
            return Err(PackRequestValidationError::Plan(
                PlanError::EmptyContainerPool,
            ));
        }

        Ok(ValidatedPackRequest {
            pool,
            cargo: self.cargo,
        })
    }
}

/// Placed unit count of one cargo line.
#[derive(Serialize, ToSchema)]
pub struct ItemCount {
    pub item_id: String,
    pub count: usize,
}

/// Aggregates of a finished plan, as shown next to the container list.
#[derive(Serialize, ToSchema)]
pub struct PlanSummary {
    pub container_count: usize,
    pub placed_count: usize,
    pub unplaced_count: u32,
    pub is_complete: bool,
    pub total_packed_weight: f64,
    pub average_volume_utilization: f64,
    pub placed_by_item: Vec<ItemCount>,
}

impl PlanSummary {
    fn of(result: &MultiContainerPackingResult) -> Self {
        Self {
            container_count: result.container_count(),
            placed_count: result.placed_count(),
            unplaced_count: result.unplaced_count(),
            is_complete: result.is_complete(),
            total_packed_weight: result.total_packed_weight(),
            average_volume_utilization: result.average_volume_utilization(),
            placed_by_item: result
                .placed_by_item()
                .into_iter()
                .map(|(item_id, count)| ItemCount { item_id, count })
                .collect(),
        }
    }
}

/// Response of the packing endpoint.
#[derive(Serialize, ToSchema)]
pub struct PackResponse {
    #[serde(flatten)]
    pub result: MultiContainerPackingResult,
    pub summary: PlanSummary,
}

impl PackResponse {
    fn from_result(result: MultiContainerPackingResult) -> Self {
        let summary = PlanSummary::of(&result);
        Self { result, summary }
    }
}

/// Request structure for the bundling endpoint.
#[derive(Deserialize, ToSchema)]
pub struct BundleRequest {
    pub item: CargoItem,
    /// Candidate containers; a bundle must fit into at least one
    #[serde(default)]
    pub containers: Vec<Container>,
}

/// Response of the bundling endpoint.
#[derive(Serialize, ToSchema)]
pub struct BundleResponse {
    pub options: Vec<BundlingConfiguration>,
    /// True when no containers were supplied and nothing was checked for fit
    pub unchecked: bool,
}

/// Request structure for the filler endpoint.
#[derive(Deserialize, ToSchema)]
pub struct FillerRequest {
    pub container: Container,
    pub result: PackingResult,
    /// Archetypes to try; the standard catalog when omitted
    #[serde(default)]
    #[schema(nullable = true)]
    pub catalog: Option<Vec<CargoTemplate>>,
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn json_deserialize_error(err: JsonRejection) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid JSON data",
        err.to_string(),
    )
}

fn validation_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid input data",
        details,
    )
}

fn container_config_error(details: impl Into<String>) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Invalid container configuration",
        details,
    )
}

fn parse_pack_request(
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Result<ValidatedPackRequest, Response> {
    let Json(payload) = payload.map_err(json_deserialize_error)?;

    match payload.into_validated() {
        Ok(validated) => Ok(validated),
        Err(PackRequestValidationError::InvalidContainer(err)) => {
            Err(container_config_error(err.to_string()))
        }
        Err(PackRequestValidationError::Plan(err)) => Err(container_config_error(err.to_string())),
        Err(PackRequestValidationError::InvalidCargo(err)) => {
            Err(validation_error(err.to_string()))
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handle_pack,
        handle_bundle,
        handle_filler,
        handle_container_catalog,
        handle_filler_catalog
    ),
    components(
        schemas(
            PackRequest,
            PackResponse,
            PlanSummary,
            ItemCount,
            BundleRequest,
            BundleResponse,
            FillerRequest,
            ErrorResponse,
            PoolEntry,
            Container,
            CargoItem,
            CargoTemplate,
            PackagingType,
            PlacedCargo,
            PackingResult,
            PackedContainer,
            MultiContainerPackingResult,
            Space,
            SupportingSurface,
            BundlingConfiguration,
            Permutation,
            BundleLayout,
            BundleDims,
            FillerOption
        )
    ),
    tags(
        (name = "planning", description = "Container load planning"),
        (name = "catalog", description = "Reference data")
    )
)]
struct ApiDoc;

fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/pack", post(handle_pack))
        .route("/bundle", post(handle_bundle))
        .route("/filler", post(handle_filler))
        .route("/catalog/containers", get(handle_container_catalog))
        .route("/catalog/filler", get(handle_filler_catalog))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server.
///
/// Configures CORS for cross-origin requests from the frontend.
/// Runs until the server is terminated.
pub async fn start_api_server(config: ApiConfig, planner: PlannerConfig) -> std::io::Result<()> {
    let app = router(ApiState { planner });

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🚀 Server running on http://{}:{}", config.display_host(), config.port());
    if config.binds_to_all_interfaces() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📑 Documentation: http://{}:{}/docs", config.display_host(), config.port());

    axum::serve(listener, app).await
}

/// Handler for POST /pack endpoint.
///
/// Distributes the cargo list over the container pool.
///
/// # Returns
/// The committed containers, any leftover cargo and a summary
#[utoipa::path(
    post,
    path = "/pack",
    request_body = PackRequest,
    responses(
        (status = 200, description = "Plan computed", body = PackResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid request or empty container pool",
            body = ErrorResponse
        )
    ),
    tag = "planning"
)]
async fn handle_pack(
    State(state): State<ApiState>,
    payload: Result<Json<PackRequest>, JsonRejection>,
) -> Response {
    let request = match parse_pack_request(payload) {
        Ok(request) => request,
        Err(response) => return response,
    };

    info!(
        "📥 New pack request: {} cargo lines, {} containers in pool",
        request.cargo.len(),
        request.pool.len()
    );

    let config = state.planner.packing_config();
    let ValidatedPackRequest { pool, cargo } = request;
    let outcome = tokio::task::spawn_blocking(move || {
        pack_into_multiple_containers_with_config(&pool, &cargo, &config)
    })
    .await;

    match outcome {
        Ok(Ok(result)) => {
            info!(
                "📦 Result: {} containers, {} unplaced units",
                result.container_count(),
                result.unplaced_count()
            );
            (StatusCode::OK, Json(PackResponse::from_result(result))).into_response()
        }
        Ok(Err(err)) => container_config_error(err.to_string()),
        Err(err) => {
            error!(error = %err, "packing task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Packing failed",
                err.to_string(),
            )
        }
    }
}

/// Handler for POST /bundle endpoint.
///
/// Lists the ways all units of one cargo line can be combined into a block.
#[utoipa::path(
    post,
    path = "/bundle",
    request_body = BundleRequest,
    responses(
        (status = 200, description = "Bundle configurations, most cube-like first", body = BundleResponse),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid item or container", body = ErrorResponse)
    ),
    tag = "planning"
)]
async fn handle_bundle(payload: Result<Json<BundleRequest>, JsonRejection>) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };
    if let Err(err) = request.item.validate() {
        return validation_error(err.to_string());
    }
    if let Some(err) = request.containers.iter().find_map(|c| c.validate().err()) {
        return container_config_error(err.to_string());
    }

    let options = calculate_bundling_options(&request.item, &request.containers);
    info!(
        "🧱 Bundling {} x {}: {} configurations",
        request.item.quantity,
        request.item.id,
        options.len()
    );
    let response = BundleResponse {
        options,
        unchecked: request.containers.is_empty(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /filler endpoint.
///
/// Ranks catalog archetypes by how many units still fit into a packed container.
#[utoipa::path(
    post,
    path = "/filler",
    request_body = FillerRequest,
    responses(
        (status = 200, description = "Filler options, most units first", body = [FillerOption]),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid container or catalog entry", body = ErrorResponse)
    ),
    tag = "planning"
)]
async fn handle_filler(
    State(state): State<ApiState>,
    payload: Result<Json<FillerRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(err) => return json_deserialize_error(err),
    };
    let FillerRequest {
        container,
        result,
        catalog,
    } = request;
    if let Err(err) = container.validate() {
        return container_config_error(err.to_string());
    }
    let catalog = catalog.unwrap_or_else(filler_catalog);
    if let Some(err) = catalog.iter().find_map(|t| t.validate().err()) {
        return validation_error(err.to_string());
    }

    let color = state.planner.filler_color().to_string();
    let outcome = tokio::task::spawn_blocking(move || {
        let options = calculate_filler_options_with_color(&container, &result, &catalog, &color);
        (container.id, options)
    })
    .await;

    match outcome {
        Ok((container_id, options)) => {
            info!(
                "🔍 Filler analysis for {}: {} options",
                container_id,
                options.len()
            );
            (StatusCode::OK, Json(options)).into_response()
        }
        Err(err) => {
            error!(error = %err, "filler task failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Filler analysis failed",
                err.to_string(),
            )
        }
    }
}

/// Handler for GET /catalog/containers endpoint.
#[utoipa::path(
    get,
    path = "/catalog/containers",
    responses((status = 200, description = "Standard container types", body = [Container])),
    tag = "catalog"
)]
async fn handle_container_catalog() -> Json<Vec<Container>> {
    Json(container_presets())
}

/// Handler for GET /catalog/filler endpoint.
#[utoipa::path(
    get,
    path = "/catalog/filler",
    responses((status = 200, description = "Standard filler archetypes", body = [CargoTemplate])),
    tag = "catalog"
)]
async fn handle_filler_catalog() -> Json<Vec<CargoTemplate>> {
    Json(filler_catalog())
}

async fn serve_openapi_json() -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}
