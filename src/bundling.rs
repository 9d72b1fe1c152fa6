//! Bundle configurations.
//!
//! Looks for ways to consolidate all units of one cargo line into a single
//! rectangular block: every factorisation of the quantity into three factors is
//! tried in every distinct axis assignment, and kept if the block fits into at
//! least one candidate container.

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::model::{
    BundleDims, BundleLayout, BundlingConfiguration, CargoItem, CargoTemplate, Container,
    PackagingType, Permutation,
};
use crate::types::{Dimensional, Vec3};

/// Index orders applied to a sorted triplet, in enumeration order.
const AXIS_ORDERS: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 1, 0],
    [2, 0, 1],
];

/// All ascending triplets `[i, j, k]` with `i * j * k == n`, in discovery order.
pub fn factor_triplets(n: u32) -> Vec<[u32; 3]> {
    let mut seen = HashSet::new();
    let mut triplets = Vec::new();

    for i in (1..=n).filter(|i| n % i == 0) {
        let rest = n / i;
        for j in (1..=rest).filter(|j| rest % j == 0) {
            let mut triplet = [i, j, rest / j];
            triplet.sort_unstable();
            if seen.insert(triplet) {
                triplets.push(triplet);
            }
        }
    }

    triplets
}

/// Distinct orderings of a triplet. Repeated factors yield fewer than six.
pub fn distinct_permutations(triplet: [u32; 3]) -> Vec<[u32; 3]> {
    let mut permutations: Vec<[u32; 3]> = Vec::with_capacity(AXIS_ORDERS.len());
    for order in AXIS_ORDERS {
        let candidate = [triplet[order[0]], triplet[order[1]], triplet[order[2]]];
        if !permutations.contains(&candidate) {
            permutations.push(candidate);
        }
    }
    permutations
}

/// Enumerates bundle configurations for all units of `item`.
///
/// # Parameters
/// * `item` - The cargo line; its full quantity is bundled
/// * `candidates` - Containers a bundle must fit into (any one suffices). When
///   empty, every arrangement is accepted without checking.
///
/// # Returns
/// Configurations ordered from most to least cube-like. Empty for quantities
/// below 2.
pub fn calculate_bundling_options(
    item: &CargoItem,
    candidates: &[Container],
) -> Vec<BundlingConfiguration> {
    if item.quantity < 2 {
        return Vec::new();
    }

    let mut configurations: Vec<BundlingConfiguration> = factor_triplets(item.quantity)
        .into_iter()
        .filter_map(|base_factors| {
            let permutations: Vec<Permutation> = distinct_permutations(base_factors)
                .into_iter()
                .map(|[x, y, z]| arrange(item, BundleLayout { x, y, z }))
                .filter(|permutation| fits_any(permutation, candidates))
                .collect();

            (!permutations.is_empty()).then_some(BundlingConfiguration {
                base_factors,
                permutations,
                item_count: item.quantity,
            })
        })
        .collect();

    configurations.sort_by(|a, b| {
        a.cube_ratio()
            .partial_cmp(&b.cube_ratio())
            .unwrap_or(Ordering::Equal)
    });

    debug!(
        item = %item.id,
        quantity = item.quantity,
        configurations = configurations.len(),
        checked = !candidates.is_empty(),
        "calculated bundling options"
    );
    configurations
}

fn arrange(item: &CargoItem, layout: BundleLayout) -> Permutation {
    Permutation {
        layout,
        final_dims: BundleDims {
            length: item.length * f64::from(layout.x),
            width: item.width * f64::from(layout.y),
            height: item.height * f64::from(layout.z),
        },
    }
}

fn fits_any(permutation: &Permutation, candidates: &[Container]) -> bool {
    let dims = Vec3::new(
        permutation.final_dims.length,
        permutation.final_dims.width,
        permutation.final_dims.height,
    );
    candidates.is_empty()
        || candidates
            .iter()
            .any(|container| dims.fits_within(&container.dimensions()))
}

/// Builds the cargo type that replaces `item_count` units of `item`.
pub fn bundle_template(
    item: &CargoItem,
    permutation: &Permutation,
    item_count: u32,
) -> CargoTemplate {
    let BundleLayout { x, y, z } = permutation.layout;
    CargoTemplate {
        name: format!("{} (Bundle {x}x{y}x{z})", item.name),
        length: permutation.final_dims.length,
        width: permutation.final_dims.width,
        height: permutation.final_dims.height,
        weight: item.weight * f64::from(item_count),
        is_fragile: item.is_fragile,
        packaging: PackagingType::Bundle,
    }
}

/// Replaces `items_used` units of the line `original_id` with one bundle.
///
/// The original line is removed, the bundle is appended with quantity 1 under
/// `bundle_id`, and the original is re-appended with whatever quantity is left,
/// if any. An unknown `original_id` leaves the list untouched.
pub fn substitute_bundle(
    cargo: &[CargoItem],
    original_id: &str,
    bundle: CargoTemplate,
    items_used: u32,
    bundle_id: impl Into<String>,
) -> Vec<CargoItem> {
    let Some(original) = cargo.iter().find(|item| item.id == original_id) else {
        return cargo.to_vec();
    };
    let remaining_quantity = original.quantity.saturating_sub(items_used);

    let mut updated: Vec<CargoItem> = cargo
        .iter()
        .filter(|item| item.id != original_id)
        .cloned()
        .collect();
    updated.push(bundle.with_identity(bundle_id, 1));
    if remaining_quantity > 0 {
        updated.push(CargoItem {
            quantity: remaining_quantity,
            ..original.clone()
        });
    }
    updated
}
