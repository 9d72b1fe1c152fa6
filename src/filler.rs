//! Filler analysis.
//!
//! Takes a finished single-container pack and checks how many units of each
//! catalog archetype would still fit into its leftover spaces and weight margin.
//! Placed cargo is never revisited; only the free spaces are.

use std::cmp::Ordering;

use tracing::debug;

use crate::catalog::FILLER_COLOR;
use crate::model::{
    CargoTemplate, Container, FillerOption, PackingBox, PackingResult, PlacedCargo,
};
use crate::space::{Occupant, Space};
use crate::types::{Dimensional, Positioned, Weighted, percentage};

/// Item id shared by every hypothetical filler placement.
pub const FILLER_ITEM_ID: &str = "filler-item";

/// Ranks catalog archetypes by how many units fit into what `primary` left over.
///
/// # Parameters
/// * `container` - The container `primary` was packed into
/// * `primary` - The finished pack whose spaces and weight margin are reused
/// * `catalog` - Archetypes to try, one at a time. Archetypes with a
///   non-positive dimension are skipped.
///
/// # Returns
/// One option per archetype that fits at least once, most units first, ties
/// broken by the larger added volume. Empty when no weight margin or no space
/// is left.
pub fn calculate_filler_options(
    container: &Container,
    primary: &PackingResult,
    catalog: &[CargoTemplate],
) -> Vec<FillerOption> {
    calculate_filler_options_with_color(container, primary, catalog, FILLER_COLOR)
}

/// Like `calculate_filler_options`, with a custom highlight colour.
pub fn calculate_filler_options_with_color(
    container: &Container,
    primary: &PackingResult,
    catalog: &[CargoTemplate],
    color: &str,
) -> Vec<FillerOption> {
    let weight_margin = container.max_weight - primary.total_weight;
    if weight_margin <= 0.0 || primary.remaining_spaces.is_empty() {
        debug!(
            container = %container.id,
            weight_margin,
            spaces = primary.remaining_spaces.len(),
            "nothing left to fill"
        );
        return Vec::new();
    }

    let container_volume = container.volume();
    let mut options: Vec<FillerOption> = catalog
        .iter()
        .filter(|template| template.is_packable())
        .filter_map(|template| {
            let placed = fill_with(&primary.remaining_spaces, template, weight_margin, color);
            if placed.is_empty() {
                return None;
            }
            let added_weight = placed.iter().map(|p| p.weight()).sum();
            let added_volume: f64 = placed.iter().map(|p| p.volume()).sum();
            Some(FillerOption {
                item: template.clone(),
                quantity: placed.len(),
                placed_filler_cargo: placed,
                added_weight,
                added_volume_utilization: percentage(added_volume, container_volume),
            })
        })
        .collect();

    options.sort_by(|a, b| {
        b.quantity.cmp(&a.quantity).then_with(|| {
            b.added_volume_utilization
                .partial_cmp(&a.added_volume_utilization)
                .unwrap_or(Ordering::Equal)
        })
    });

    debug!(
        container = %container.id,
        weight_margin,
        candidates = catalog.len(),
        options = options.len(),
        "analysed filler options"
    );
    options
}

/// Packs as many units of `template` as possible into a private copy of `spaces`.
fn fill_with(
    spaces: &[Space],
    template: &CargoTemplate,
    weight_margin: f64,
    color: &str,
) -> Vec<PlacedCargo> {
    let mut spaces = spaces.to_vec();
    let mut placed = Vec::new();
    let mut added_weight = 0.0;
    let dims = template.dimensions();

    while added_weight + template.weight <= weight_margin {
        let Some(index) = lowest_fitting_space(&spaces, template) else {
            break;
        };
        let space = spaces.remove(index);

        let unit = PackingBox::from_item(
            &template.clone().with_identity(FILLER_ITEM_ID, 1),
            format!("filler-{}", placed.len() + 1),
        );
        placed.push(unit.place_at(space.position(), color));
        added_weight += template.weight;

        let occupant = Occupant {
            item_id: FILLER_ITEM_ID,
            dims,
            is_fragile: template.is_fragile,
            packaging: template.packaging,
        };
        spaces.extend(space.subdivide(&occupant));
    }

    placed
}

/// Index of the fitting space with the lowest z, then y, then x. The first such
/// space wins ties.
fn lowest_fitting_space(spaces: &[Space], template: &CargoTemplate) -> Option<usize> {
    let mut best: Option<(usize, &Space)> = None;
    for (index, space) in spaces.iter().enumerate() {
        if !template.fits_in(&space.dimensions()) {
            continue;
        }
        let lower = best.is_none_or(|(_, current)| {
            (space.z, space.y, space.x) < (current.z, current.y, current.x)
        });
        if lower {
            best = Some((index, space));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::expand_cargo;
    use crate::catalog::{CARGO_COLORS, ColorMap, filler_catalog};
    use crate::geometry::{intersects, lies_within};
    use crate::model::PackagingType;
    use crate::packer::pack;

    fn cube(name: &str, side: f64, weight: f64) -> CargoTemplate {
        CargoTemplate {
            name: name.to_string(),
            length: side,
            width: side,
            height: side,
            weight,
            is_fragile: false,
            packaging: PackagingType::WoodenBox,
        }
    }

    fn empty_result(container: &Container) -> PackingResult {
        PackingResult::new(container, Vec::new(), 0.0, vec![Space::container_floor(container)])
    }

    #[test]
    fn fills_an_empty_container_bottom_first() {
        let container = Container::new("c", "C", (20.0, 20.0, 20.0), 1000.0);
        let options =
            calculate_filler_options(&container, &empty_result(&container), &[cube("q", 10.0, 1.0)]);

        assert_eq!(options.len(), 1);
        let option = &options[0];
        assert_eq!(option.quantity, 8);
        assert_eq!(option.added_weight, 8.0);
        assert!((option.added_volume_utilization - 100.0).abs() < 1e-9);

        let floor_units = option.placed_filler_cargo[..4].iter().all(|p| p.z == 0.0);
        assert!(floor_units, "the floor is covered before stacking");
        for (n, placed) in option.placed_filler_cargo.iter().enumerate() {
            assert_eq!(placed.item_id, FILLER_ITEM_ID);
            assert_eq!(placed.instance_id, format!("filler-{}", n + 1));
            assert_eq!(placed.color, FILLER_COLOR);
            assert!(lies_within(placed, &container));
        }
    }

    #[test]
    fn weight_margin_caps_the_quantity() {
        let container = Container::new("c", "C", (20.0, 20.0, 20.0), 100.0);
        let primary = PackingResult::new(
            &container,
            Vec::new(),
            75.0,
            vec![Space::container_floor(&container)],
        );
        let options = calculate_filler_options(&container, &primary, &[cube("q", 10.0, 10.0)]);
        assert_eq!(options[0].quantity, 2);
        assert_eq!(options[0].added_weight, 20.0);
    }

    #[test]
    fn no_margin_or_no_space_means_no_options() {
        let container = Container::new("c", "C", (20.0, 20.0, 20.0), 100.0);
        let full = PackingResult::new(
            &container,
            Vec::new(),
            100.0,
            vec![Space::container_floor(&container)],
        );
        assert!(calculate_filler_options(&container, &full, &[cube("q", 1.0, 1.0)]).is_empty());

        let no_space = PackingResult::new(&container, Vec::new(), 0.0, Vec::new());
        assert!(calculate_filler_options(&container, &no_space, &[cube("q", 1.0, 1.0)]).is_empty());
    }

    #[test]
    fn options_rank_by_quantity_then_volume() {
        let container = Container::new("c", "C", (20.0, 20.0, 20.0), 1000.0);
        let catalog = vec![
            cube("big", 20.0, 1.0),
            cube("huge", 30.0, 1.0),
            cube("small", 10.0, 1.0),
            CargoTemplate {
                length: 20.0,
                ..cube("slab", 10.0, 1.0)
            },
        ];
        let options = calculate_filler_options(&container, &empty_result(&container), &catalog);

        let names: Vec<&str> = options.iter().map(|o| o.item.name.as_str()).collect();
        assert_eq!(names, vec!["small", "slab", "big"]);
        assert_eq!(options[1].quantity, 4);
        assert_eq!(options[2].quantity, 1);
    }

    #[test]
    fn fragile_archetypes_are_not_stacked() {
        let container = Container::new("c", "C", (20.0, 20.0, 20.0), 1000.0);
        let fragile = CargoTemplate {
            is_fragile: true,
            ..cube("glass", 10.0, 1.0)
        };
        let options = calculate_filler_options(&container, &empty_result(&container), &[fragile]);
        assert_eq!(options[0].quantity, 4);
        assert!(options[0].placed_filler_cargo.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn leaves_the_primary_result_untouched() {
        let container = Container::new("c", "C", (100.0, 100.0, 100.0), 10_000.0);
        let cargo = vec![
            CargoTemplate {
                length: 60.0,
                width: 100.0,
                height: 50.0,
                ..cube("crate", 1.0, 50.0)
            }
            .with_identity("crate", 2),
        ];
        let primary = pack(&container, &expand_cargo(&cargo), &ColorMap::for_items(&cargo));
        let snapshot = primary.clone();

        let options = calculate_filler_options(&container, &primary, &filler_catalog());
        assert_eq!(primary, snapshot);

        let small = vec![cube("q", 20.0, 1.0), cube("r", 25.0, 1.0)];
        let options_again = calculate_filler_options(&container, &primary, &small);
        assert_eq!(
            calculate_filler_options(&container, &primary, &small),
            options_again
        );
        for option in options.iter().chain(&options_again) {
            for filler in &option.placed_filler_cargo {
                assert!(lies_within(filler, &container));
                assert!(!CARGO_COLORS.contains(&filler.color.as_str()));
                for existing in &primary.placed_cargo {
                    assert!(!intersects(filler, existing));
                }
            }
        }
    }

    #[test]
    fn degenerate_archetypes_are_skipped() {
        let container = Container::new("c", "C", (20.0, 20.0, 20.0), 1000.0);
        let flat = CargoTemplate {
            length: 0.0,
            ..cube("flat", 10.0, 100.0)
        };
        let weightless_sliver = CargoTemplate {
            width: -5.0,
            ..cube("sliver", 10.0, 0.0)
        };
        let options = calculate_filler_options(
            &container,
            &empty_result(&container),
            &[flat, weightless_sliver, cube("q", 10.0, 1.0)],
        );

        assert_eq!(options.len(), 1, "only the real archetype yields an option");
        assert_eq!(options[0].item.name, "q");
        assert_eq!(options[0].quantity, 8);
    }

    #[test]
    fn custom_color_is_applied() {
        let container = Container::new("c", "C", (10.0, 10.0, 10.0), 100.0);
        let options = calculate_filler_options_with_color(
            &container,
            &empty_result(&container),
            &[cube("q", 10.0, 1.0)],
            "#000000",
        );
        assert_eq!(options[0].placed_filler_cargo[0].color, "#000000");
    }
}
