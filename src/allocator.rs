//! Multi-container allocation.
//!
//! Distributes a cargo list over a pool of physical containers. Each round packs
//! every remaining unit into every remaining container from scratch, commits the
//! container whose trial placed the most volume relative to its own size, and
//! removes what it took. Rounds stop as soon as nothing more can be placed.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;

use crate::catalog::ColorMap;
use crate::model::{
    CargoItem, Container, MultiContainerPackingResult, PackedContainer, PackingBox, PackingResult,
};
use crate::packer::{PackingConfig, pack_with_config};
use crate::types::Dimensional;

/// Caller-facing planning failure.
///
/// Cargo that does not fit is not an error; it is reported as unplaced cargo.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlanError {
    #[error("The container pool is empty: select at least one container with a quantity greater than 0")]
    EmptyContainerPool,
}

/// A container type together with how many physical units of it are available.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PoolEntry {
    pub container: Container,
    pub quantity: u32,
}

/// Flattens pool entries into one container per physical unit.
///
/// Entries with quantity 0 contribute nothing.
pub fn expand_container_pool(entries: &[PoolEntry]) -> Vec<Container> {
    entries
        .iter()
        .flat_map(|entry| std::iter::repeat_n(&entry.container, entry.quantity as usize))
        .cloned()
        .collect()
}

/// Expands cargo lines into individual units and orders them for loading.
///
/// Lines with zero quantity or a non-positive dimension are dropped silently.
/// Units are ordered by their largest single dimension, then by volume, both
/// descending; the sort is stable so input order breaks remaining ties.
pub fn expand_cargo(items: &[CargoItem]) -> Vec<PackingBox> {
    let mut sequence = 0usize;
    let mut boxes = Vec::new();
    for item in items.iter().filter(|item| item.is_packable()) {
        for _ in 0..item.quantity {
            sequence += 1;
            boxes.push(PackingBox::from_item(item, format!("{}-{}", item.id, sequence)));
        }
    }

    boxes.sort_by(|a, b| {
        b.dimensions()
            .max_component()
            .partial_cmp(&a.dimensions().max_component())
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.volume().partial_cmp(&a.volume()).unwrap_or(Ordering::Equal))
    });
    boxes
}

/// Distributes `items` over the containers of `pool` with default scoring.
///
/// # Parameters
/// * `pool` - One entry per physical container; repeat a type to rent it twice
/// * `items` - The cargo list
///
/// # Returns
/// The used containers in commit order plus the cargo that fit nowhere, or
/// `PlanError::EmptyContainerPool` when `pool` is empty.
pub fn pack_into_multiple_containers(
    pool: &[Container],
    items: &[CargoItem],
) -> Result<MultiContainerPackingResult, PlanError> {
    pack_into_multiple_containers_with_config(pool, items, &PackingConfig::default())
}

/// Like `pack_into_multiple_containers`, with custom scoring weights.
pub fn pack_into_multiple_containers_with_config(
    pool: &[Container],
    items: &[CargoItem],
    config: &PackingConfig,
) -> Result<MultiContainerPackingResult, PlanError> {
    if pool.is_empty() {
        return Err(PlanError::EmptyContainerPool);
    }

    let colors = ColorMap::for_items(items);
    let mut remaining = expand_cargo(items);
    let mut pool = pool.to_vec();
    let mut packed_containers = Vec::new();

    while !remaining.is_empty() && !pool.is_empty() {
        let Some((index, result)) = best_trial(&pool, &remaining, &colors, config) else {
            debug!(
                remaining = remaining.len(),
                "no container in the pool can take any remaining unit"
            );
            break;
        };

        let container = pool.remove(index);
        let taken: HashSet<&str> = result
            .placed_cargo
            .iter()
            .map(|p| p.instance_id.as_str())
            .collect();
        remaining.retain(|unit| !taken.contains(unit.instance_id.as_str()));

        debug!(
            container = %container.id,
            placed = result.placed_cargo.len(),
            volume_utilization = result.volume_utilization,
            remaining = remaining.len(),
            "committed container"
        );
        packed_containers.push(PackedContainer { container, result });
    }

    Ok(MultiContainerPackingResult {
        packed_containers,
        unplaced_cargo: collect_unplaced(items, &remaining),
    })
}

/// Packs `remaining` into every container of `pool` and returns the index and
/// result of the trial with the highest placed-volume share. The first of equal
/// trials wins. Trials that place nothing are never chosen.
fn best_trial(
    pool: &[Container],
    remaining: &[PackingBox],
    colors: &ColorMap,
    config: &PackingConfig,
) -> Option<(usize, PackingResult)> {
    let mut best: Option<(usize, f64, PackingResult)> = None;

    for (index, container) in pool.iter().enumerate() {
        let container_volume = container.volume();
        if container_volume <= 0.0 {
            continue;
        }

        let trial = pack_with_config(container, remaining, colors, config);
        if trial.is_empty() {
            continue;
        }

        let share = trial.placed_volume() / container_volume;
        if best
            .as_ref()
            .is_none_or(|(_, best_share, _)| share > *best_share)
        {
            best = Some((index, share, trial));
        }
    }

    best.map(|(index, _, result)| (index, result))
}

/// Regroups never-placed units into cargo lines carrying the residual quantity.
fn collect_unplaced(items: &[CargoItem], remaining: &[PackingBox]) -> Vec<CargoItem> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for unit in remaining {
        *counts.entry(unit.item_id.as_str()).or_default() += 1;
    }

    items
        .iter()
        .filter_map(|item| {
            counts.remove(item.id.as_str()).map(|quantity| CargoItem {
                quantity,
                ..item.clone()
            })
        })
        .collect()
}
