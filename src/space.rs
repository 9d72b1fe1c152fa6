//! Free-volume bookkeeping shared by the packers.
//!
//! A `Space` is an axis-aligned empty region of a container. Placing a unit at a
//! space's origin corner consumes the space and leaves up to three residual
//! children (right, back and top). Children are never checked against each
//! other, so a space list must not be assumed to be mutually disjoint.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{Container, PackagingType};
use crate::types::{Dimensional, Positioned, Vec3};

/// What a space rests on when it does not start on the container floor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SupportingSurface {
    /// Originating item id of the unit underneath
    pub item_id: String,
    pub length: f64,
    pub width: f64,
    pub packaging: PackagingType,
}

/// An empty box-shaped region available for placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Space {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// `None` for the container floor, which supports anything
    pub supporting_surface: Option<SupportingSurface>,
}

/// The parts of a unit that matter when it is dropped into a space.
#[derive(Clone, Copy, Debug)]
pub struct Occupant<'a> {
    pub item_id: &'a str,
    pub dims: Vec3,
    pub is_fragile: bool,
    pub packaging: PackagingType,
}

impl Space {
    /// The full interior of an empty container.
    pub fn container_floor(container: &Container) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            length: container.length,
            width: container.width,
            height: container.height,
            supporting_surface: None,
        }
    }

    /// Checks if a unit of the given size and packaging may go here.
    ///
    /// Cartons may only rest on the floor or on other cartons.
    pub fn accepts(&self, dims: &Vec3, packaging: PackagingType) -> bool {
        if packaging == PackagingType::Carton {
            if let Some(surface) = &self.supporting_surface {
                if surface.packaging != PackagingType::Carton {
                    return false;
                }
            }
        }
        dims.fits_within(&self.dimensions())
    }

    /// Whether the unit underneath this space belongs to `item_id`.
    pub fn rests_on_item(&self, item_id: &str) -> bool {
        self.supporting_surface
            .as_ref()
            .is_some_and(|surface| surface.item_id == item_id)
    }

    /// Splits the space after `occupant` was placed at its origin corner.
    ///
    /// Returns the right, back and top residuals, in that order, skipping any
    /// with a zero extent. Fragile occupants never get a top space.
    pub fn subdivide(&self, occupant: &Occupant<'_>) -> Vec<Space> {
        let Vec3 {
            x: length,
            y: width,
            z: height,
        } = occupant.dims;
        let mut children = Vec::with_capacity(3);

        if self.length - length > 0.0 {
            children.push(Space {
                x: self.x + length,
                y: self.y,
                z: self.z,
                length: self.length - length,
                width: self.width,
                height: self.height,
                supporting_surface: self.supporting_surface.clone(),
            });
        }

        if self.width - width > 0.0 {
            children.push(Space {
                x: self.x,
                y: self.y + width,
                z: self.z,
                length,
                width: self.width - width,
                height: self.height,
                supporting_surface: self.supporting_surface.clone(),
            });
        }

        if !occupant.is_fragile && self.height - height > 0.0 {
            children.push(Space {
                x: self.x,
                y: self.y,
                z: self.z + height,
                length,
                width,
                height: self.height - height,
                supporting_surface: Some(SupportingSurface {
                    item_id: occupant.item_id.to_string(),
                    length,
                    width,
                    packaging: occupant.packaging,
                }),
            });
        }

        children
    }
}

impl Positioned for Space {
    fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl Dimensional for Space {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height)
    }
}
