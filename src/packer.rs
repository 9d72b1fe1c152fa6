//! Single-container packing.
//!
//! Places an ordered list of units into one container by repeatedly picking the
//! best-scoring free space and splitting it. Scoring prefers low, front, left
//! positions and adds bonuses that make identical units form stacks and blocks:
//! - a large bonus for resting directly on a unit of the same cargo line
//! - a smaller bonus for standing flush next to one on the same level
//!
//! Sturdy units are always placed before fragile ones, and fragile units never
//! get anything stacked on top of them.

use tracing::trace;

use crate::catalog::ColorMap;
use crate::geometry::is_flush_neighbour;
use crate::model::{Container, PackingBox, PackingResult, PlacedCargo};
use crate::space::{Occupant, Space};
use crate::types::{Dimensional, Positioned, Weighted};

/// Weights of the placement scoring heuristic.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PackingConfig {
    /// Constant the positional penalty is subtracted from
    pub base_score: f64,
    /// Penalty per millimetre of height
    pub z_weight: f64,
    /// Penalty per millimetre of width; length counts 1:1
    pub y_weight: f64,
    /// Bonus for a space whose supporting unit belongs to the same cargo line
    pub stack_bonus: f64,
    /// Bonus for a space flush against a unit of the same cargo line
    pub adjacency_bonus: f64,
}

impl PackingConfig {
    pub const DEFAULT_BASE_SCORE: f64 = 1_000_000_000.0;
    pub const DEFAULT_Z_WEIGHT: f64 = 10_000.0;
    pub const DEFAULT_Y_WEIGHT: f64 = 100.0;
    pub const DEFAULT_STACK_BONUS: f64 = 3_000_000_000.0;
    pub const DEFAULT_ADJACENCY_BONUS: f64 = 1_500_000_000.0;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder::default()
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            base_score: Self::DEFAULT_BASE_SCORE,
            z_weight: Self::DEFAULT_Z_WEIGHT,
            y_weight: Self::DEFAULT_Y_WEIGHT,
            stack_bonus: Self::DEFAULT_STACK_BONUS,
            adjacency_bonus: Self::DEFAULT_ADJACENCY_BONUS,
        }
    }
}

/// Builder for `PackingConfig`.
#[derive(Default)]
pub struct PackingConfigBuilder {
    config: PackingConfig,
}

impl PackingConfigBuilder {
    pub fn stack_bonus(mut self, bonus: f64) -> Self {
        self.config.stack_bonus = bonus;
        self
    }

    pub fn adjacency_bonus(mut self, bonus: f64) -> Self {
        self.config.adjacency_bonus = bonus;
        self
    }

    pub fn build(self) -> PackingConfig {
        self.config
    }
}

/// Packs `boxes` into `container` with the default scoring weights.
///
/// # Parameters
/// * `container` - The container to fill, starting empty
/// * `boxes` - Units in the caller's preferred order
/// * `colors` - Display colour per cargo line
///
/// # Returns
/// The placements, utilisation figures and the free spaces left over. Units that
/// did not fit are simply absent from the placements.
pub fn pack(container: &Container, boxes: &[PackingBox], colors: &ColorMap) -> PackingResult {
    pack_with_config(container, boxes, colors, &PackingConfig::default())
}

/// Like `pack`, with custom scoring weights.
pub fn pack_with_config(
    container: &Container,
    boxes: &[PackingBox],
    colors: &ColorMap,
    config: &PackingConfig,
) -> PackingResult {
    let mut load = ContainerLoad::new(container);

    let sturdy = boxes.iter().filter(|unit| !unit.is_fragile);
    let fragile = boxes.iter().filter(|unit| unit.is_fragile);
    for unit in sturdy.chain(fragile) {
        load.try_place(unit, colors, config);
    }

    load.into_result()
}

/// Mutable state of one packing attempt. Owns its space list, so attempts on
/// different containers never see each other's spaces.
struct ContainerLoad<'c> {
    container: &'c Container,
    spaces: Vec<Space>,
    placed: Vec<PlacedCargo>,
    total_weight: f64,
}

impl<'c> ContainerLoad<'c> {
    fn new(container: &'c Container) -> Self {
        Self {
            container,
            spaces: vec![Space::container_floor(container)],
            placed: Vec::new(),
            total_weight: 0.0,
        }
    }

    /// Places `unit` in the best-scoring space, if any. Returns whether it was placed.
    fn try_place(&mut self, unit: &PackingBox, colors: &ColorMap, config: &PackingConfig) -> bool {
        if self.total_weight + unit.weight() > self.container.max_weight {
            trace!(instance = %unit.instance_id, "weight limit reached, skipping unit");
            return false;
        }

        let dims = unit.dimensions();
        let mut best: Option<(usize, f64)> = None;
        for (index, space) in self.spaces.iter().enumerate() {
            if !space.accepts(&dims, unit.packaging) {
                continue;
            }
            let score = self.score(space, unit, config);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((index, score));
            }
        }

        let Some((index, _)) = best else {
            trace!(instance = %unit.instance_id, "no fitting space");
            return false;
        };

        let space = self.spaces.remove(index);
        self.placed
            .push(unit.place_at(space.position(), colors.color_of(&unit.item_id)));
        self.total_weight += unit.weight();

        let occupant = Occupant {
            item_id: &unit.item_id,
            dims,
            is_fragile: unit.is_fragile,
            packaging: unit.packaging,
        };
        self.spaces.extend(space.subdivide(&occupant));
        true
    }

    /// Higher is better.
    fn score(&self, space: &Space, unit: &PackingBox, config: &PackingConfig) -> f64 {
        let mut score =
            config.base_score - (space.z * config.z_weight + space.y * config.y_weight + space.x);

        if space.rests_on_item(&unit.item_id) {
            score += config.stack_bonus;
        }

        let corner = space.position();
        let next_to_twin = self.placed.iter().any(|p| {
            p.item_id == unit.item_id && p.height >= unit.height && is_flush_neighbour(p, &corner)
        });
        if next_to_twin {
            score += config.adjacency_bonus;
        }

        score
    }

    fn into_result(self) -> PackingResult {
        PackingResult::new(self.container, self.placed, self.total_weight, self.spaces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{intersects, lies_within, rests_on};
    use crate::model::{CargoItem, PackagingType};

    fn item(id: &str, dims: (f64, f64, f64), weight: f64) -> CargoItem {
        CargoItem {
            id: id.to_string(),
            name: id.to_uppercase(),
            length: dims.0,
            width: dims.1,
            height: dims.2,
            weight,
            quantity: 1,
            is_fragile: false,
            packaging: PackagingType::Other,
        }
    }

    fn units(item: &CargoItem, count: usize) -> Vec<PackingBox> {
        (1..=count)
            .map(|n| PackingBox::from_item(item, format!("{}-{}", item.id, n)))
            .collect()
    }

    fn find<'a>(result: &'a PackingResult, instance: &str) -> &'a PlacedCargo {
        result
            .placed_cargo
            .iter()
            .find(|p| p.instance_id == instance)
            .unwrap_or_else(|| panic!("{instance} was not placed"))
    }

    #[test]
    fn scenario_standard_crates_in_twenty_foot_container() {
        let container = Container::new("20GP", "20' GP", (5898.0, 2352.0, 2393.0), 28200.0);
        let crate_item = item("large", (1200.0, 1000.0, 800.0), 250.0);
        let colors = ColorMap::for_items(std::slice::from_ref(&crate_item));

        let result = pack(&container, &units(&crate_item, 15), &colors);

        assert_eq!(result.placed_cargo.len(), 15);
        assert_eq!(result.total_weight, 3750.0);
        assert!((result.weight_utilization - 13.297).abs() < 0.01);
        for placed in &result.placed_cargo {
            assert!(lies_within(placed, &container), "{placed:?} sticks out");
        }
        for (i, a) in result.placed_cargo.iter().enumerate() {
            for b in &result.placed_cargo[i + 1..] {
                assert!(!intersects(a, b), "{} overlaps {}", a.instance_id, b.instance_id);
            }
        }
    }

    #[test]
    fn first_unit_goes_to_origin_corner() {
        let container = Container::new("c", "C", (100.0, 100.0, 100.0), 100.0);
        let cube = item("cube", (10.0, 10.0, 10.0), 1.0);
        let result = pack(&container, &units(&cube, 1), &ColorMap::default());
        let placed = &result.placed_cargo[0];
        assert_eq!((placed.x, placed.y, placed.z), (0.0, 0.0, 0.0));
    }

    #[test]
    fn identical_units_stack_before_spreading() {
        let container = Container::new("c", "C", (30.0, 10.0, 20.0), 100.0);
        let x = item("x", (10.0, 10.0, 10.0), 1.0);
        let y = item("y", (10.0, 10.0, 10.0), 1.0);
        let boxes = vec![
            PackingBox::from_item(&x, "x-1"),
            PackingBox::from_item(&y, "y-1"),
            PackingBox::from_item(&x, "x-2"),
        ];

        let result = pack(&container, &boxes, &ColorMap::default());

        let y1 = find(&result, "y-1");
        assert_eq!((y1.x, y1.z), (10.0, 0.0));
        let x2 = find(&result, "x-2");
        assert_eq!((x2.x, x2.y, x2.z), (0.0, 0.0, 10.0));
    }

    #[test]
    fn identical_units_cluster_side_by_side() {
        let container = Container::new("c", "C", (30.0, 30.0, 10.0), 100.0);
        let a = item("a", (10.0, 10.0, 10.0), 1.0);
        let b = item("b", (10.0, 10.0, 10.0), 1.0);
        let boxes = vec![
            PackingBox::from_item(&a, "a-1"),
            PackingBox::from_item(&b, "b-1"),
            PackingBox::from_item(&a, "a-2"),
        ];

        let clustered = pack(&container, &boxes, &ColorMap::default());
        let a2 = find(&clustered, "a-2");
        assert_eq!((a2.x, a2.y), (0.0, 10.0));

        let no_bonus = PackingConfig::builder().adjacency_bonus(0.0).build();
        let plain = pack_with_config(&container, &boxes, &ColorMap::default(), &no_bonus);
        let a2 = find(&plain, "a-2");
        assert_eq!((a2.x, a2.y), (20.0, 0.0));
    }

    #[test]
    fn fragile_units_go_last_and_carry_nothing() {
        let container = Container::new("c", "C", (10.0, 10.0, 30.0), 100.0);
        let glass = CargoItem {
            is_fragile: true,
            ..item("glass", (10.0, 10.0, 10.0), 1.0)
        };
        let brick = item("brick", (10.0, 10.0, 10.0), 5.0);
        let boxes = vec![
            PackingBox::from_item(&glass, "glass-1"),
            PackingBox::from_item(&glass, "glass-2"),
            PackingBox::from_item(&brick, "brick-1"),
        ];

        let result = pack(&container, &boxes, &ColorMap::default());

        assert_eq!(result.placed_cargo.len(), 2);
        assert_eq!(find(&result, "brick-1").z, 0.0);
        assert_eq!(find(&result, "glass-1").z, 10.0);
        for upper in &result.placed_cargo {
            for lower in result.placed_cargo.iter().filter(|p| p.is_fragile) {
                assert!(!rests_on(upper, lower), "{} rests on fragile cargo", upper.instance_id);
            }
        }
    }

    #[test]
    fn cartons_do_not_rest_on_other_packaging() {
        let container = Container::new("c", "C", (100.0, 100.0, 100.0), 100.0);
        let pallet = CargoItem {
            packaging: PackagingType::Pallet,
            ..item("pallet", (100.0, 100.0, 50.0), 10.0)
        };
        let carton = CargoItem {
            packaging: PackagingType::Carton,
            ..item("carton", (50.0, 50.0, 50.0), 1.0)
        };
        let boxes = vec![
            PackingBox::from_item(&pallet, "pallet-1"),
            PackingBox::from_item(&carton, "carton-1"),
        ];

        let result = pack(&container, &boxes, &ColorMap::default());
        assert_eq!(result.placed_cargo.len(), 1);
        assert_eq!(result.placed_cargo[0].instance_id, "pallet-1");
    }

    #[test]
    fn cartons_stack_on_cartons() {
        let container = Container::new("c", "C", (100.0, 100.0, 100.0), 100.0);
        let base = CargoItem {
            packaging: PackagingType::Carton,
            ..item("base", (100.0, 100.0, 50.0), 10.0)
        };
        let small = CargoItem {
            packaging: PackagingType::Carton,
            ..item("small", (50.0, 50.0, 50.0), 1.0)
        };
        let boxes = vec![
            PackingBox::from_item(&base, "base-1"),
            PackingBox::from_item(&small, "small-1"),
        ];

        let result = pack(&container, &boxes, &ColorMap::default());
        assert_eq!(find(&result, "small-1").z, 50.0);
    }

    #[test]
    fn weight_limit_skips_heavy_units_but_keeps_going() {
        let container = Container::new("c", "C", (100.0, 100.0, 100.0), 100.0);
        let heavy = item("heavy", (10.0, 10.0, 10.0), 60.0);
        let light = item("light", (10.0, 10.0, 10.0), 30.0);
        let boxes = vec![
            PackingBox::from_item(&heavy, "heavy-1"),
            PackingBox::from_item(&heavy, "heavy-2"),
            PackingBox::from_item(&light, "light-1"),
        ];

        let result = pack(&container, &boxes, &ColorMap::default());
        let placed: Vec<&str> = result
            .placed_cargo
            .iter()
            .map(|p| p.instance_id.as_str())
            .collect();
        assert_eq!(placed, vec!["heavy-1", "light-1"]);
        assert_eq!(result.total_weight, 90.0);
        assert!(result.total_weight <= container.max_weight);
        assert!((result.weight_utilization - 90.0).abs() < 1e-9);
    }

    #[test]
    fn repacking_is_deterministic() {
        let container = Container::new("c", "C", (250.0, 120.0, 90.0), 1000.0);
        let a = item("a", (60.0, 40.0, 30.0), 5.0);
        let b = CargoItem {
            is_fragile: true,
            ..item("b", (50.0, 50.0, 20.0), 2.0)
        };
        let mut boxes = units(&a, 12);
        boxes.extend(units(&b, 8));
        let colors = ColorMap::for_items(&[a, b]);

        let first = pack(&container, &boxes, &colors);
        let second = pack(&container, &boxes, &colors);
        assert_eq!(first, second);
    }

    #[test]
    fn placements_carry_line_color() {
        let container = Container::new("c", "C", (100.0, 100.0, 100.0), 100.0);
        let a = item("a", (10.0, 10.0, 10.0), 1.0);
        let b = item("b", (10.0, 10.0, 10.0), 1.0);
        let colors = ColorMap::for_items(&[a.clone(), b.clone()]);
        let boxes = vec![PackingBox::from_item(&a, "a-1"), PackingBox::from_item(&b, "b-1")];

        let result = pack(&container, &boxes, &colors);
        assert_eq!(find(&result, "a-1").color, colors.color_of("a"));
        assert_eq!(find(&result, "b-1").color, colors.color_of("b"));
        assert_ne!(find(&result, "a-1").color, find(&result, "b-1").color);
    }

    #[test]
    fn empty_container_reports_zero_utilization() {
        let container = Container::new("c", "C", (0.0, 0.0, 0.0), 0.0);
        let a = item("a", (10.0, 10.0, 10.0), 1.0);
        let result = pack(&container, &units(&a, 2), &ColorMap::default());
        assert!(result.is_empty());
        assert_eq!(result.volume_utilization, 0.0);
        assert_eq!(result.weight_utilization, 0.0);
    }

    #[test]
    fn remaining_spaces_are_exposed() {
        let container = Container::new("c", "C", (20.0, 10.0, 10.0), 100.0);
        let a = item("a", (10.0, 10.0, 10.0), 1.0);
        let result = pack(&container, &units(&a, 1), &ColorMap::default());
        assert_eq!(result.remaining_spaces.len(), 1);
        assert_eq!(result.remaining_spaces[0].x, 10.0);
        assert!((result.volume_utilization - 50.0).abs() < 1e-9);
    }
}
