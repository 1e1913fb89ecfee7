//! The two proxy pipelines
//!
//! Each pipeline is a pure function from a source object and settings to a
//! placement. Nothing touches the host until the caller commits the result.

use tracing::{debug, info};
use ucxcrate_core::Result;
use ucxcrate_hull::{apply_offset, build_bounding_box, build_convex_hull};
use ucxcrate_simplification::reduce_with;

use crate::config::CollisionConfig;
use crate::ingest::SourceObject;
use crate::placement::{place_proxy_as, ProxyKind, ProxyPlacement};

/// Box proxy aligned with the source's local axes.
pub fn create_bounding_box(source: &SourceObject, config: &CollisionConfig) -> Result<ProxyPlacement> {
    config.validate()?;
    info!(source = %source.name, offset = config.effective_offset(), "creating bounding box proxy");

    let mesh = build_bounding_box(
        source.local_points(),
        &source.transform,
        config.offset,
        config.apply_offset,
    )?;

    place_proxy_as(
        ProxyKind::BoundingBox,
        mesh,
        &source.name,
        &source.transform,
        config.parent_to_target,
    )
}

/// Convex hull proxy: hull of the world-space vertices, grown by the
/// effective offset, then reduced to `tri_count_limit` triangles.
///
/// The triangle budget applies to the final, offset shell.
pub fn create_convex_hull(source: &SourceObject, config: &CollisionConfig) -> Result<ProxyPlacement> {
    config.validate()?;
    info!(
        source = %source.name,
        vertices = source.vertex_count(),
        offset = config.effective_offset(),
        tri_count_limit = config.tri_count_limit,
        "creating convex hull proxy"
    );

    let hull = build_convex_hull(&source.world_points())?;
    debug!(
        boundary = hull.boundary_count,
        interior = hull.interior_count,
        triangles = hull.triangle_count(),
        "hull built"
    );

    let margin = config.effective_offset();
    let shell = if margin > 0.0 {
        apply_offset(&hull.mesh, margin)?
    } else {
        hull.mesh
    };

    let reduction = reduce_with(&shell, &config.reduction_params())?;
    debug!(%reduction, "hull reduced");

    place_proxy_as(
        ProxyKind::ConvexHull,
        reduction.mesh,
        &source.name,
        &source.transform,
        config.parent_to_target,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ucxcrate_core::{Error, Mesh, Point3d, Transform3D, Vector3d};
    use ucxcrate_hull::contains_point;

    fn unit_cube_source(transform: Transform3D) -> SourceObject {
        let vertices = (0..8)
            .map(|i| {
                Point3d::new(
                    if i & 1 == 0 { -0.5 } else { 0.5 },
                    if i & 2 == 0 { -0.5 } else { 0.5 },
                    if i & 4 == 0 { -0.5 } else { 0.5 },
                )
            })
            .collect();
        let faces = vec![
            vec![0, 2, 3, 1],
            vec![4, 5, 7, 6],
            vec![0, 1, 5, 4],
            vec![2, 6, 7, 3],
            vec![0, 4, 6, 2],
            vec![1, 3, 7, 5],
        ];
        SourceObject::new("Crate", Mesh::from_vertices_and_faces(vertices, faces), transform).unwrap()
    }

    #[test]
    fn test_bounding_box_pipeline() {
        let transform = Transform3D::translation(Vector3d::new(4.0, 0.0, 0.0));
        let source = unit_cube_source(transform);
        let config = CollisionConfig {
            offset: 0.5,
            ..Default::default()
        };
        let placement = create_bounding_box(&source, &config).unwrap();
        assert_eq!(placement.name, "UCX_Crate");
        assert_eq!(placement.kind, ProxyKind::BoundingBox);
        assert_eq!(placement.mesh.vertex_count(), 8);
        assert_relative_eq!(placement.pivot(), Point3d::new(4.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(placement.mesh.volume(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_convex_hull_without_offset() {
        let source = unit_cube_source(Transform3D::identity());
        let config = CollisionConfig {
            apply_offset: false,
            ..Default::default()
        };
        let placement = create_convex_hull(&source, &config).unwrap();
        assert_eq!(placement.kind, ProxyKind::ConvexHull);
        assert_eq!(placement.mesh.triangle_count(), 12);
        assert_relative_eq!(placement.mesh.volume(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_convex_hull_with_offset_covers_source() {
        let source = unit_cube_source(Transform3D::uniform_scaling(2.0));
        let config = CollisionConfig {
            offset: 0.1,
            tri_count_limit: 24,
            ..Default::default()
        };
        let placement = create_convex_hull(&source, &config).unwrap();
        assert!(placement.mesh.triangle_count() <= 24);
        let world = placement.world_mesh(&source.transform);
        assert!(world.volume() > 8.0);
        for p in source.world_points() {
            assert!(contains_point(&world, &p, 0.0));
        }
    }

    #[test]
    fn test_invalid_config_rejected_first() {
        let source = unit_cube_source(Transform3D::identity());
        let config = CollisionConfig {
            tri_count_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            create_convex_hull(&source, &config),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            create_bounding_box(&source, &config),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_flat_source() {
        let mesh = Mesh::from_triangles(
            vec![
                Point3d::new(0.0, 0.0, 0.0),
                Point3d::new(1.0, 0.0, 0.0),
                Point3d::new(1.0, 1.0, 0.0),
                Point3d::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let source = SourceObject::at_origin("Floor", mesh).unwrap();
        let config = CollisionConfig::default();
        assert!(matches!(
            create_convex_hull(&source, &config),
            Err(Error::DegenerateInput(_))
        ));
        // The box path accepts flat input
        assert!(create_bounding_box(&source, &config).is_ok());
    }
}
