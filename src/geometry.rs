//! Geometric relations between placed units.
//!
//! Provides the adjacency test used by the packer's clustering bonus and the
//! contact/containment checks used to verify finished load plans.

use crate::model::{Container, PlacedCargo};
use crate::types::{Positioned, Vec3};

/// Length of the overlap of two intervals, at least 0.0.
///
/// # Example
/// ```
/// use container_loader::geometry::overlap_1d;
///
/// assert_eq!(overlap_1d(0.0, 5.0, 3.0, 8.0), 2.0);
/// ```
pub fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    (a2.min(b2) - a1.max(b1)).max(0.0)
}

/// Checks if two placed units share any volume. Touching faces do not count.
pub fn intersects(a: &PlacedCargo, b: &PlacedCargo) -> bool {
    a.bounding_box().intersects(&b.bounding_box())
}

/// Checks if `upper` sits directly on the top face of `lower` with a non-zero
/// contact area.
pub fn rests_on(upper: &PlacedCargo, lower: &PlacedCargo) -> bool {
    if upper.z != lower.top_z() {
        return false;
    }
    let over_x = overlap_1d(upper.x, upper.x + upper.length, lower.x, lower.x + lower.length);
    let over_y = overlap_1d(upper.y, upper.y + upper.width, lower.y, lower.y + lower.width);
    over_x > 0.0 && over_y > 0.0
}

/// Checks if a corner at `corner` is flush against `placed` on the same level.
///
/// Flush means the corner touches the far length face of `placed` with equal
/// `y`, or its far width face with equal `x`.
pub fn is_flush_neighbour(placed: &PlacedCargo, corner: &Vec3) -> bool {
    let position = placed.position();
    if position.z != corner.z {
        return false;
    }
    let beside = position.x + placed.length == corner.x && position.y == corner.y;
    let behind = position.y + placed.width == corner.y && position.x == corner.x;
    beside || behind
}

/// Checks if a placed unit lies entirely inside the container interior.
pub fn lies_within(placed: &PlacedCargo, container: &Container) -> bool {
    placed.bounding_box().is_inside(&container.interior())
}
