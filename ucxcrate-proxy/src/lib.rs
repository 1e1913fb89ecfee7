//! # ucxcrate proxy
//!
//! Assembles collision proxies from source objects: reads the source mesh
//! and transform, runs the bounding box or convex hull pipeline, and places
//! the result as a `UCX_` prefixed object that can be parented to its
//! source without moving.
//!
//! Host integration is confined to the [`SceneHost`] trait; [`MemoryScene`]
//! is a ready-made in-memory implementation.

pub mod config;
pub mod ingest;
pub mod placement;
pub mod pipeline;
pub mod host;

pub use config::*;
pub use ingest::*;
pub use placement::*;
pub use pipeline::*;
pub use host::*;
