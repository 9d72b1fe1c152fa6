//! Container load planning.
//!
//! Packs cargo lists into containers with a space-partitioning heuristic,
//! distributes them over a pool of containers, proposes bundle arrangements
//! and estimates how much standard cargo still fits into a packed container.
//!
//! Every operation is a synchronous computation over caller-owned input.

pub mod allocator;
pub mod bundling;
pub mod catalog;
pub mod filler;
pub mod geometry;
pub mod model;
pub mod packer;
pub mod space;
pub mod types;
