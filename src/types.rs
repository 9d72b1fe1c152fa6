//! Common types and traits for container geometry.
//!
//! The planner is axis-agnostic: `x` runs along a container's length, `y` along
//! its width and `z` along its height. Which of these is "up" on screen is a
//! rendering decision and never leaks into the packing logic.

use std::ops::Add;

/// A point or an extent in container space, in millimetres.
///
/// # Examples
/// ```
/// use container_loader::types::Vec3;
///
/// let origin = Vec3::new(1200.0, 0.0, 0.0);
/// let extent = Vec3::new(1200.0, 1000.0, 800.0);
/// assert_eq!((origin + extent).x, 2400.0);
/// assert_eq!(extent.volume(), 960_000_000.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Creates a new vector from its length, width and height components.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The container origin corner.
    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Product of all three components.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.x * self.y * self.z
    }

    /// Largest of the three components.
    #[inline]
    pub fn max_component(&self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    /// Checks if all components are strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.x > 0.0 && self.y > 0.0 && self.z > 0.0
    }

    /// Component-wise `<=` against an enclosing extent. No rotation is tried.
    #[inline]
    pub fn fits_within(&self, outer: &Self) -> bool {
        self.x <= outer.x && self.y <= outer.y && self.z <= outer.z
    }
}

impl Add for Vec3 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Anything with a rectangular extent.
pub trait Dimensional {
    /// Returns length, width and height as a vector.
    fn dimensions(&self) -> Vec3;

    /// Calculates the volume.
    fn volume(&self) -> f64 {
        self.dimensions().volume()
    }

    /// Checks if this object fits into the given extent without rotation.
    fn fits_in(&self, outer: &Vec3) -> bool {
        self.dimensions().fits_within(outer)
    }
}

/// Anything that occupies a fixed corner position inside a container.
pub trait Positioned {
    /// Returns the position of the corner closest to the container origin.
    fn position(&self) -> Vec3;
}

/// Anything with a weight in kg.
pub trait Weighted {
    fn weight(&self) -> f64;
}

/// Axis-aligned bounding box of a placed object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Corner closest to the origin
    pub min: Vec3,
    /// Opposite corner (position + dimensions)
    pub max: Vec3,
}

impl BoundingBox {
    #[inline]
    pub fn from_position_and_dims(position: Vec3, dims: Vec3) -> Self {
        Self {
            min: position,
            max: position + dims,
        }
    }

    /// Separating-axis test; touching faces do not count as intersection.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.max.x <= other.min.x
            || other.max.x <= self.min.x
            || self.max.y <= other.min.y
            || other.max.y <= self.min.y
            || self.max.z <= other.min.z
            || other.max.z <= self.min.z)
    }

    /// Checks if `self` lies completely inside `outer`.
    #[inline]
    pub fn is_inside(&self, outer: &Self) -> bool {
        self.min.x >= outer.min.x
            && self.min.y >= outer.min.y
            && self.min.z >= outer.min.z
            && self.max.x <= outer.max.x
            && self.max.y <= outer.max.y
            && self.max.z <= outer.max.z
    }
}

/// Expresses `part / whole` as a percentage.
///
/// Yields `0.0` instead of NaN or infinity when `whole` is zero or the ratio is
/// otherwise not finite.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    let value = part / whole * 100.0;
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_volume_and_max() {
        let dims = Vec3::new(10.0, 20.0, 30.0);
        assert_eq!(dims.volume(), 6000.0);
        assert_eq!(dims.max_component(), 30.0);
    }

    #[test]
    fn test_vec3_fits_within_is_exact() {
        let item = Vec3::new(5.0, 5.0, 5.0);
        assert!(item.fits_within(&Vec3::new(5.0, 5.0, 5.0)));
        assert!(!item.fits_within(&Vec3::new(5.0, 4.999, 5.0)));
    }

    #[test]
    fn test_vec3_positive() {
        assert!(Vec3::new(1.0, 1.0, 1.0).is_positive());
        assert!(!Vec3::new(1.0, 0.0, 1.0).is_positive());
        assert!(!Vec3::new(-1.0, 1.0, 1.0).is_positive());
    }

    #[test]
    fn test_bounding_box_intersects() {
        let a = BoundingBox::from_position_and_dims(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0));
        let b = BoundingBox::from_position_and_dims(
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::new(10.0, 10.0, 10.0),
        );
        let touching = BoundingBox::from_position_and_dims(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 10.0, 10.0),
        );

        assert!(a.intersects(&b));
        assert!(!a.intersects(&touching));
    }

    #[test]
    fn test_bounding_box_inside() {
        let outer = BoundingBox::from_position_and_dims(Vec3::zero(), Vec3::new(10.0, 10.0, 10.0));
        let inner =
            BoundingBox::from_position_and_dims(Vec3::new(5.0, 0.0, 0.0), Vec3::new(5.0, 5.0, 5.0));
        let sticking_out =
            BoundingBox::from_position_and_dims(Vec3::new(6.0, 0.0, 0.0), Vec3::new(5.0, 5.0, 5.0));

        assert!(inner.is_inside(&outer));
        assert!(!sticking_out.is_inside(&outer));
    }

    #[test]
    fn test_percentage_guards_zero_denominator() {
        assert_eq!(percentage(50.0, 200.0), 25.0);
        assert_eq!(percentage(50.0, 0.0), 0.0);
        assert_eq!(percentage(f64::INFINITY, 1.0), 0.0);
    }
}
