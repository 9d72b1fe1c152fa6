//! Data model of the load planner.
//!
//! - `Container`: a rentable container type from the catalog
//! - `CargoItem`: one line of the caller's cargo list (a type with a quantity)
//! - `PackingBox`: a single physical unit of a cargo item, alive during one pack
//! - `PlacedCargo`: where a unit ended up
//! - `PackingResult` / `MultiContainerPackingResult`: the outputs of the packers
//!
//! All lengths are millimetres, all weights kilograms.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::space::Space;
use crate::types::{BoundingBox, Dimensional, Positioned, Vec3, Weighted, percentage};

/// Validation error for caller-supplied records.
///
/// The packing core never raises these; they are used at the service boundary
/// to reject input before it reaches the planner.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
}

fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_weight(value: f64, name: &str) -> Result<(), ValidationError> {
    if value < 0.0 || !value.is_finite() {
        return Err(ValidationError::InvalidWeight(format!(
            "{} must not be negative, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_identity(id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::InvalidIdentity(
            "id must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Packaging category of a cargo item.
///
/// Only `Carton` carries a stacking rule: a carton may rest on the floor or on
/// another carton, never on anything else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PackagingType {
    Carton,
    WoodenBox,
    Pallet,
    Bundle,
    Other,
}

/// A container type: interior dimensions and payload limit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "20GP",
    "name": "20' GP",
    "length": 5898.0,
    "width": 2352.0,
    "height": 2393.0,
    "max_weight": 28200.0
}))]
pub struct Container {
    pub id: String,
    pub name: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub max_weight: f64,
}

impl Container {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        dims: (f64, f64, f64),
        max_weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            length: dims.0,
            width: dims.1,
            height: dims.2,
            max_weight,
        }
    }

    /// Checks a container record before it is handed to the planner.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_identity(&self.id)?;
        validate_dimension(self.length, "Container length")?;
        validate_dimension(self.width, "Container width")?;
        validate_dimension(self.height, "Container height")?;
        validate_weight(self.max_weight, "Container max weight")?;
        Ok(())
    }

    /// Bounding box of the container interior.
    pub fn interior(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(Vec3::zero(), self.dimensions())
    }
}

impl Dimensional for Container {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

/// A cargo type without identity or quantity.
///
/// Used for catalog archetypes (filler candidates) and for freshly built
/// bundles before they are given an id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CargoTemplate {
    pub name: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub is_fragile: bool,
    pub packaging: PackagingType,
}

impl CargoTemplate {
    /// Gives the template an identity and a quantity.
    pub fn with_identity(self, id: impl Into<String>, quantity: u32) -> CargoItem {
        CargoItem {
            id: id.into(),
            name: self.name,
            length: self.length,
            width: self.width,
            height: self.height,
            weight: self.weight,
            quantity,
            is_fragile: self.is_fragile,
            packaging: self.packaging,
        }
    }
}

impl CargoTemplate {
    /// Whether units of this shape can occupy space at all.
    pub fn is_packable(&self) -> bool {
        self.dimensions().is_positive()
    }

    /// Checks a caller-supplied archetype before it is handed to the planner.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_dimension(self.length, "Length")?;
        validate_dimension(self.width, "Width")?;
        validate_dimension(self.height, "Height")?;
        validate_weight(self.weight, "Weight")?;
        Ok(())
    }
}

impl Dimensional for CargoTemplate {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

/// One line of the caller's cargo list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "large-box",
    "name": "Large Box",
    "length": 1200.0,
    "width": 1000.0,
    "height": 800.0,
    "weight": 250.0,
    "quantity": 15,
    "is_fragile": false,
    "packaging": "other"
}))]
pub struct CargoItem {
    pub id: String,
    pub name: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// Weight of a single unit in kg
    pub weight: f64,
    pub quantity: u32,
    pub is_fragile: bool,
    pub packaging: PackagingType,
}

impl CargoItem {
    /// Whether expansion into packing boxes yields anything at all.
    ///
    /// Items with zero quantity or a non-positive dimension are skipped by the
    /// planner without being reported.
    pub fn is_packable(&self) -> bool {
        self.quantity > 0 && self.dimensions().is_positive()
    }

    /// Checks a cargo record before it is handed to the planner.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_identity(&self.id)?;
        validate_dimension(self.length, "Length")?;
        validate_dimension(self.width, "Width")?;
        validate_dimension(self.height, "Height")?;
        validate_weight(self.weight, "Weight")?;
        Ok(())
    }

    /// Strips identity and quantity.
    pub fn template(&self) -> CargoTemplate {
        CargoTemplate {
            name: self.name.clone(),
            length: self.length,
            width: self.width,
            height: self.height,
            weight: self.weight,
            is_fragile: self.is_fragile,
            packaging: self.packaging,
        }
    }
}

impl Dimensional for CargoItem {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

/// A single physical unit of a cargo item during one packing computation.
#[derive(Clone, Debug, PartialEq)]
pub struct PackingBox {
    /// Id of the originating `CargoItem`
    pub item_id: String,
    /// Unique per unit
    pub instance_id: String,
    pub name: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub is_fragile: bool,
    pub packaging: PackagingType,
}

impl PackingBox {
    /// Copies one unit's worth of physical attributes from a cargo item.
    pub fn from_item(item: &CargoItem, instance_id: impl Into<String>) -> Self {
        Self {
            item_id: item.id.clone(),
            instance_id: instance_id.into(),
            name: item.name.clone(),
            length: item.length,
            width: item.width,
            height: item.height,
            weight: item.weight,
            is_fragile: item.is_fragile,
            packaging: item.packaging,
        }
    }

    /// Materialises the placement record of this unit.
    pub fn place_at(&self, position: Vec3, color: impl Into<String>) -> PlacedCargo {
        PlacedCargo {
            item_id: self.item_id.clone(),
            instance_id: self.instance_id.clone(),
            name: self.name.clone(),
            x: position.x,
            y: position.y,
            z: position.z,
            length: self.length,
            width: self.width,
            height: self.height,
            weight: self.weight,
            is_fragile: self.is_fragile,
            packaging: self.packaging,
            color: color.into(),
        }
    }
}

impl Dimensional for PackingBox {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

impl Weighted for PackingBox {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Final placement of one unit inside a container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlacedCargo {
    /// Id of the originating `CargoItem`
    pub item_id: String,
    pub instance_id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub is_fragile: bool,
    pub packaging: PackagingType,
    /// Display colour, e.g. `#ef4444`
    pub color: String,
}

impl PlacedCargo {
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(self.position(), self.dimensions())
    }

    /// Height of the top face.
    #[inline]
    pub fn top_z(&self) -> f64 {
        self.z + self.height
    }
}

impl Positioned for PlacedCargo {
    fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl Dimensional for PlacedCargo {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}

impl Weighted for PlacedCargo {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Outcome of packing one container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PackingResult {
    pub placed_cargo: Vec<PlacedCargo>,
    /// Percentage of container volume occupied
    pub volume_utilization: f64,
    /// Percentage of the payload limit used
    pub weight_utilization: f64,
    pub total_weight: f64,
    /// Free spaces left when packing finished
    pub remaining_spaces: Vec<Space>,
}

impl PackingResult {
    /// Assembles a result and derives both utilisation figures.
    pub fn new(
        container: &Container,
        placed_cargo: Vec<PlacedCargo>,
        total_weight: f64,
        remaining_spaces: Vec<Space>,
    ) -> Self {
        let placed_volume = placed_cargo.iter().map(|p| p.volume()).sum::<f64>();
        Self {
            volume_utilization: percentage(placed_volume, container.volume()),
            weight_utilization: percentage(total_weight, container.max_weight),
            placed_cargo,
            total_weight,
            remaining_spaces,
        }
    }

    /// Sum of the volumes of all placed units.
    pub fn placed_volume(&self) -> f64 {
        self.placed_cargo.iter().map(|p| p.volume()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.placed_cargo.is_empty()
    }
}

/// A container that was actually used, with what went into it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PackedContainer {
    pub container: Container,
    pub result: PackingResult,
}

/// Outcome of distributing a cargo list over a pool of containers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MultiContainerPackingResult {
    /// Containers in the order they were committed
    pub packed_containers: Vec<PackedContainer>,
    /// Cargo lines with the quantity that could not be placed anywhere
    pub unplaced_cargo: Vec<CargoItem>,
}

impl MultiContainerPackingResult {
    /// True when every unit found a place.
    pub fn is_complete(&self) -> bool {
        self.unplaced_cargo.is_empty()
    }

    pub fn container_count(&self) -> usize {
        self.packed_containers.len()
    }

    /// Number of placed units over all containers.
    pub fn placed_count(&self) -> usize {
        self.packed_containers
            .iter()
            .map(|pc| pc.result.placed_cargo.len())
            .sum()
    }

    /// Number of units (not lines) left over.
    pub fn unplaced_count(&self) -> u32 {
        self.unplaced_cargo.iter().map(|item| item.quantity).sum()
    }

    pub fn total_packed_weight(&self) -> f64 {
        self.packed_containers
            .iter()
            .map(|pc| pc.result.total_weight)
            .sum()
    }

    /// Mean volume utilisation of the committed containers.
    pub fn average_volume_utilization(&self) -> f64 {
        if self.packed_containers.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .packed_containers
            .iter()
            .map(|pc| pc.result.volume_utilization)
            .sum();
        sum / self.packed_containers.len() as f64
    }

    /// Placed unit counts per originating item id, in first-placement order.
    pub fn placed_by_item(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for placed in self
            .packed_containers
            .iter()
            .flat_map(|pc| pc.result.placed_cargo.iter())
        {
            match counts.iter_mut().find(|(id, _)| *id == placed.item_id) {
                Some((_, count)) => *count += 1,
                None => counts.push((placed.item_id.clone(), 1)),
            }
        }
        counts
    }
}

/// Grid layout of one bundle orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BundleLayout {
    /// Units along the length axis
    pub x: u32,
    /// Units along the width axis
    pub y: u32,
    /// Units along the height axis
    pub z: u32,
}

/// Outer dimensions of a bundle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BundleDims {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

/// One axis assignment of a factor triplet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Permutation {
    pub layout: BundleLayout,
    pub final_dims: BundleDims,
}

/// All valid orientations of one way to arrange `item_count` units in a grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BundlingConfiguration {
    /// Ascending factors whose product is `item_count`
    pub base_factors: [u32; 3],
    pub permutations: Vec<Permutation>,
    /// Number of original units the bundle replaces
    pub item_count: u32,
}

impl BundlingConfiguration {
    /// Largest over smallest factor; 1.0 is a perfect cube.
    pub fn cube_ratio(&self) -> f64 {
        f64::from(self.base_factors[2]) / f64::from(self.base_factors[0])
    }
}

/// How many units of one catalog archetype still fit into a packed container.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FillerOption {
    pub item: CargoTemplate,
    pub placed_filler_cargo: Vec<PlacedCargo>,
    pub quantity: usize,
    pub added_weight: f64,
    /// Percentage of the container volume the additions occupy
    pub added_volume_utilization: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> CargoItem {
        CargoItem {
            id: "a".to_string(),
            name: "Box".to_string(),
            length: 100.0,
            width: 50.0,
            height: 20.0,
            weight: 4.0,
            quantity: 3,
            is_fragile: false,
            packaging: PackagingType::Carton,
        }
    }

    #[test]
    fn template_validation_rejects_degenerate_shapes() {
        let template = sample_item().template();
        assert!(template.validate().is_ok());
        assert!(template.is_packable());

        let flat = CargoTemplate {
            length: 0.0,
            ..template.clone()
        };
        assert!(matches!(
            flat.validate(),
            Err(ValidationError::InvalidDimension(_))
        ));
        assert!(!flat.is_packable());

        let negative_weight = CargoTemplate {
            weight: -1.0,
            ..template
        };
        assert!(matches!(
            negative_weight.validate(),
            Err(ValidationError::InvalidWeight(_))
        ));
    }

    #[test]
    fn packable_requires_quantity_and_positive_dims() {
        let item = sample_item();
        assert!(item.is_packable());

        let empty = CargoItem {
            quantity: 0,
            ..sample_item()
        };
        assert!(!empty.is_packable());

        let flat = CargoItem {
            height: 0.0,
            ..sample_item()
        };
        assert!(!flat.is_packable());
    }

    #[test]
    fn validation_rejects_bad_records() {
        assert!(sample_item().validate().is_ok());

        let negative = CargoItem {
            width: -1.0,
            ..sample_item()
        };
        assert!(matches!(
            negative.validate(),
            Err(ValidationError::InvalidDimension(_))
        ));

        let nameless = CargoItem {
            id: "  ".to_string(),
            ..sample_item()
        };
        assert!(matches!(
            nameless.validate(),
            Err(ValidationError::InvalidIdentity(_))
        ));

        let container = Container::new("c", "C", (10.0, 10.0, 10.0), f64::NAN);
        assert!(matches!(
            container.validate(),
            Err(ValidationError::InvalidWeight(_))
        ));
    }

    #[test]
    fn template_round_trips_through_identity() {
        let item = sample_item();
        let restored = item.template().with_identity("a", 3);
        assert_eq!(restored, item);
    }

    #[test]
    fn packaging_serializes_snake_case() {
        let json = serde_json::to_string(&PackagingType::WoodenBox).unwrap();
        assert_eq!(json, "\"wooden_box\"");
        let parsed: PackagingType = serde_json::from_str("\"carton\"").unwrap();
        assert_eq!(parsed, PackagingType::Carton);
    }

    #[test]
    fn packing_result_guards_zero_denominators() {
        let container = Container::new("zero", "Zero", (0.0, 10.0, 10.0), 0.0);
        let unit = PackingBox::from_item(&sample_item(), "a-1");
        let placed = vec![unit.place_at(Vec3::zero(), "#fff")];
        let result = PackingResult::new(&container, placed, 4.0, Vec::new());
        assert_eq!(result.volume_utilization, 0.0);
        assert_eq!(result.weight_utilization, 0.0);
        assert_eq!(result.total_weight, 4.0);
    }

    #[test]
    fn cube_ratio_uses_extreme_factors() {
        let config = BundlingConfiguration {
            base_factors: [1, 2, 3],
            permutations: Vec::new(),
            item_count: 6,
        };
        assert_eq!(config.cube_ratio(), 3.0);
    }
}
