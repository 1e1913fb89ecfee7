//! Naming, pivoting and parenting of finished proxies

use serde::{Deserialize, Serialize};
use tracing::debug;
use ucxcrate_core::{Error, Mesh, Point3d, Result, Transform3D};

/// Name prefix downstream tools use to recognize collision proxies
pub const PROXY_PREFIX: &str = "UCX_";

/// Semantic role of a proxy mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProxyKind {
    BoundingBox,
    ConvexHull,
}

impl std::fmt::Display for ProxyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BoundingBox => write!(f, "bounding box"),
            Self::ConvexHull => write!(f, "convex hull"),
        }
    }
}

/// `UCX_<source>`
pub fn proxy_name(source_name: &str) -> String {
    format!("{}{}", PROXY_PREFIX, source_name)
}

pub fn is_proxy_name(name: &str) -> bool {
    name.len() > PROXY_PREFIX.len() && name.starts_with(PROXY_PREFIX)
}

/// A finished proxy ready to be committed to a scene.
///
/// `mesh` is expressed relative to the proxy's pivot. With a parent, the
/// proxy's world transform is `parent_world * parent_inverse * local_to_world`;
/// without one it is `local_to_world`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyPlacement {
    pub name: String,
    pub kind: ProxyKind,
    pub mesh: Mesh,
    pub local_to_world: Transform3D,
    /// Inverse of the source transform at parenting time
    pub parent_inverse: Option<Transform3D>,
}

impl ProxyPlacement {
    pub fn is_parented(&self) -> bool {
        self.parent_inverse.is_some()
    }

    /// World position of the pivot when the parent sits where it did at
    /// parenting time
    pub fn pivot(&self) -> Point3d {
        Point3d::from(self.local_to_world.translation_part())
    }

    /// World transform of the proxy given its parent's current world transform.
    /// Ignored for unparented proxies.
    pub fn world_transform(&self, parent_world: &Transform3D) -> Transform3D {
        match self.parent_inverse {
            Some(inverse) => *parent_world * inverse * self.local_to_world,
            None => self.local_to_world,
        }
    }

    /// Proxy geometry in world space
    pub fn world_mesh(&self, parent_world: &Transform3D) -> Mesh {
        self.mesh.transformed(&self.world_transform(parent_world))
    }
}

/// Place a world-space convex hull proxy. See [`place_proxy_as`].
pub fn place_proxy(
    mesh: Mesh,
    source_name: &str,
    source_transform: &Transform3D,
    parent_to_target: bool,
) -> Result<ProxyPlacement> {
    place_proxy_as(
        ProxyKind::ConvexHull,
        mesh,
        source_name,
        source_transform,
        parent_to_target,
    )
}

/// Turn a world-space proxy mesh into a placement.
///
/// The pivot moves to the vertex centroid, the proxy is named after its
/// source, and when `parent_to_target` is set the source transform's inverse
/// is recorded so parenting leaves the proxy where it is.
///
/// # Errors
///
/// * [`Error::InvalidData`] for an empty source name, an empty or malformed
///   mesh, or a singular source transform when parenting
pub fn place_proxy_as(
    kind: ProxyKind,
    mesh: Mesh,
    source_name: &str,
    source_transform: &Transform3D,
    parent_to_target: bool,
) -> Result<ProxyPlacement> {
    if source_name.is_empty() {
        return Err(Error::invalid_data("proxy source name must not be empty"));
    }
    if mesh.is_empty() {
        return Err(Error::invalid_data("proxy mesh has no geometry"));
    }
    mesh.validate()?;

    let parent_inverse = if parent_to_target {
        Some(source_transform.try_inverse()?)
    } else {
        None
    };

    let pivot = mesh.centroid();
    let placement = ProxyPlacement {
        name: proxy_name(source_name),
        kind,
        mesh: mesh.translated(&-pivot.coords),
        local_to_world: Transform3D::translation(pivot.coords),
        parent_inverse,
    };

    debug!(
        name = %placement.name,
        kind = %kind,
        pivot = ?pivot,
        parented = parent_to_target,
        "proxy placed"
    );

    Ok(placement)
}
