//! # ucxcrate
//!
//! Collision proxy generation for Rust.
//!
//! This is the umbrella crate that provides convenient access to all ucxcrate functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Points, polygon meshes, transforms and the shared error type
//! - **Hull**: Convex hull, outward offset and oriented bounding box builders
//! - **Simplification**: Triangle-budget reduction of convex shells
//! - **Proxy**: `UCX_` naming, placement, pipelines and the host adapter
//!
//! ## Quick Start
//!
//! ```rust
//! use ucxcrate::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let corners: Vec<Point3d> = (0..8)
//!         .map(|i| Point3d::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
//!         .collect();
//!     let hull = build_convex_hull(&corners)?;
//!     let source = SourceObject::at_origin("Crate", hull.mesh)?;
//!
//!     let mut scene = MemoryScene::with_active(source);
//!     let name = execute(&mut scene, Command::CreateConvexHull, &CollisionConfig::default())?;
//!     assert_eq!(name, "UCX_Crate");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables simplification and proxy
//! - `simplification`: Triangle-budget reduction
//! - `proxy`: Pipelines, placement and host adapter (implies `simplification`)
//! - `all`: Enables all features

// Re-export core functionality
pub use ucxcrate_core::*;

// Re-export sub-crates
pub use ucxcrate_hull as hull;

#[cfg(feature = "simplification")]
pub use ucxcrate_simplification as simplification;

#[cfg(feature = "proxy")]
pub use ucxcrate_proxy as proxy;

/// Convenient imports for common use cases
pub mod prelude {
    pub use ucxcrate_core::*;
    pub use ucxcrate_hull::*;

    #[cfg(feature = "simplification")]
    pub use ucxcrate_simplification::*;

    #[cfg(feature = "proxy")]
    pub use ucxcrate_proxy::*;
}
