use std::env;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use tracing::{info, warn};

use container_loader::catalog::FILLER_COLOR;
use container_loader::packer::PackingConfig;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub planner: PlannerConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            api: ApiConfig::from_env(),
            planner: PlannerConfig::from_env(),
        }
    }
}

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    bind_ip: IpAddr,
    display_host: String,
    port: u16,
}

impl ApiConfig {
    const HOST_VAR: &'static str = "CONTAINER_LOADER_API_HOST";
    const PORT_VAR: &'static str = "CONTAINER_LOADER_API_PORT";
    const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    const DEFAULT_PORT: u16 = 8080;

    fn from_env() -> Self {
        let (bind_ip, display_host) = match env_string(Self::HOST_VAR) {
            Some(raw) => match parse_host(&raw) {
                Some(ip) => (ip, raw),
                None => {
                    warn!(
                        var = Self::HOST_VAR,
                        value = %raw,
                        default = %Self::DEFAULT_HOST,
                        "not an IP address, using default"
                    );
                    (Self::DEFAULT_HOST, Self::DEFAULT_HOST.to_string())
                }
            },
            None => (Self::DEFAULT_HOST, Self::DEFAULT_HOST.to_string()),
        };

        let port = env_string(Self::PORT_VAR)
            .and_then(|raw| parse_port(&raw, Self::PORT_VAR))
            .unwrap_or(Self::DEFAULT_PORT);

        Self {
            bind_ip,
            display_host,
            port,
        }
    }

    /// Socket address to bind the server to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    /// Visible hostname for logging and hints.
    pub fn display_host(&self) -> &str {
        &self.display_host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Indicates whether binding to all interfaces.
    pub fn binds_to_all_interfaces(&self) -> bool {
        match self.bind_ip {
            IpAddr::V4(addr) => addr == Ipv4Addr::UNSPECIFIED,
            IpAddr::V6(addr) => addr == Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_ip: Self::DEFAULT_HOST,
            display_host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
        }
    }
}

/// Scoring weights and presentation settings handed to the planning core.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    packing: PackingConfig,
    filler_color: String,
}

impl PlannerConfig {
    const STACK_BONUS_VAR: &'static str = "CONTAINER_LOADER_STACK_BONUS";
    const ADJACENCY_BONUS_VAR: &'static str = "CONTAINER_LOADER_ADJACENCY_BONUS";
    const FILLER_COLOR_VAR: &'static str = "CONTAINER_LOADER_FILLER_COLOR";

    fn from_env() -> Self {
        let stack_bonus = load_f64_with_warning(
            Self::STACK_BONUS_VAR,
            PackingConfig::DEFAULT_STACK_BONUS,
            |value| value >= 0.0,
            "must not be negative",
            "Adjusted stacking bonus changes how identical units are grouped",
        );

        let adjacency_bonus = load_f64_with_warning(
            Self::ADJACENCY_BONUS_VAR,
            PackingConfig::DEFAULT_ADJACENCY_BONUS,
            |value| value >= 0.0,
            "must not be negative",
            "Adjusted adjacency bonus changes how identical units are grouped",
        );

        let filler_color = match env_string(Self::FILLER_COLOR_VAR) {
            Some(raw) if is_hex_color(&raw) => raw,
            Some(raw) => {
                warn!(
                    var = Self::FILLER_COLOR_VAR,
                    value = %raw,
                    default = FILLER_COLOR,
                    "expected a colour like #rrggbb, using default"
                );
                FILLER_COLOR.to_string()
            }
            None => FILLER_COLOR.to_string(),
        };

        let packing = PackingConfig::builder()
            .stack_bonus(stack_bonus)
            .adjacency_bonus(adjacency_bonus)
            .build();

        Self {
            packing,
            filler_color,
        }
    }

    /// Returns the configured PackingConfig.
    pub fn packing_config(&self) -> PackingConfig {
        self.packing
    }

    /// Highlight colour for hypothetical filler placements.
    pub fn filler_color(&self) -> &str {
        &self.filler_color
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            packing: PackingConfig::default(),
            filler_color: FILLER_COLOR.to_string(),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(var = name, error = %err, "could not read variable, using default");
            None
        }
    }
}

fn parse_host(raw: &str) -> Option<IpAddr> {
    raw.trim().parse::<IpAddr>().ok()
}

fn parse_port(raw: &str, var_name: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(0) => {
            warn!(var = var_name, "port must not be 0, using default");
            None
        }
        Ok(value) => Some(value),
        Err(err) => {
            warn!(var = var_name, value = %raw, error = %err, "could not parse port, using default");
            None
        }
    }
}

fn is_hex_color(raw: &str) -> bool {
    raw.len() == 7
        && raw.starts_with('#')
        && raw[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn parse_f64_value(
    var_name: &str,
    raw: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && validator(value) => value,
        Ok(_) => {
            warn!(var = var_name, value = %raw, hint = invalid_hint, default, "invalid value, using default");
            default
        }
        Err(err) => {
            warn!(var = var_name, value = %raw, error = %err, default, "could not parse number, using default");
            default
        }
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    notice: &str,
) -> f64 {
    let Some(raw) = env_string(var_name) else {
        return default;
    };
    let value = parse_f64_value(var_name, &raw, default, validator, invalid_hint);
    let tolerance = default.abs().max(1.0) * 1e-9;
    if (value - default).abs() > tolerance {
        info!(var = var_name, value, "{notice}");
    }
    value
}
