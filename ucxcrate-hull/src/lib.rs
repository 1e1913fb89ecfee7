//! # ucxcrate hull
//!
//! Geometry builders for collision proxies.
//!
//! This crate turns an arbitrary point set into closed, outward-wound proxy
//! shells: a quickhull based convex hull with coplanar facet merging, a
//! uniform outward offset of a convex shell, and an oriented bounding box.

pub mod quickhull;
pub mod facets;
pub mod offset;
pub mod bounding_box;
pub mod validation;

// Re-export commonly used items
pub use quickhull::*;
pub use offset::*;
pub use bounding_box::*;
pub use validation::*;
