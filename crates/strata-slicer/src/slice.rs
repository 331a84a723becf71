//! Plane slicing - intersect a placed triangle mesh with horizontal planes.

use rayon::prelude::*;
use strata_math::{Point2, Point3};

use crate::mesh::Mesh;
use crate::object::Placement;
use crate::path::Segment;
use crate::settings::SliceSettings;

/// Absolute Z tolerance for classifying vertices against the slice plane.
pub const PLANE_EPSILON: f64 = 1e-4;

/// A single per-object layer skeleton: Z height plus raw segments.
#[derive(Debug, Clone)]
pub struct SlicedLayer {
    /// Z height of this layer (mm).
    pub z: f64,
    /// Unordered triangle-plane intersection segments.
    pub segments: Vec<Segment>,
}

/// Result of slicing one object.
#[derive(Debug, Clone)]
pub struct SlicedObject {
    /// Layers with at least one segment, bottom to top.
    pub layers: Vec<SlicedLayer>,
    /// The object's Z range starts above the configured max Z ceiling.
    pub above_z_limit: bool,
}

/// A transformed triangle with its Z extent cached for fast rejection.
#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [Point3; 3],
    z_min: f64,
    z_max: f64,
}

/// Slice one placed mesh into evenly spaced layers.
///
/// The Z range comes from the transformed bounding box; `max_z_height`
/// (when positive) is a hard ceiling from the build plate. An object whose
/// minimum Z already exceeds the ceiling yields zero layers, a reported
/// condition rather than an error. Layers with no intersection segments
/// are not emitted.
pub fn slice_object(
    mesh: &Mesh,
    placement: &Placement,
    settings: &SliceSettings,
) -> SlicedObject {
    let transform = placement.to_transform();
    let triangles: Vec<Triangle> = mesh
        .triangles()
        .map(|[a, b, c]| {
            let v = [
                transform.apply_point(&a),
                transform.apply_point(&b),
                transform.apply_point(&c),
            ];
            let z_min = v[0].z.min(v[1].z).min(v[2].z);
            let z_max = v[0].z.max(v[1].z).max(v[2].z);
            Triangle { v, z_min, z_max }
        })
        .collect();

    let mut min_z = f64::MAX;
    let mut max_z = f64::MIN;
    for tri in &triangles {
        min_z = min_z.min(tri.z_min);
        max_z = max_z.max(tri.z_max);
    }

    if settings.max_z_height > 0.0 {
        if min_z > settings.max_z_height {
            return SlicedObject {
                layers: Vec::new(),
                above_z_limit: true,
            };
        }
        max_z = settings.max_z_height;
    }

    let count = ((max_z - min_z) / settings.layer_height).ceil().max(0.0) as usize;

    let layers: Vec<SlicedLayer> = (0..count)
        .into_par_iter()
        .filter_map(|i| {
            let z = min_z + i as f64 * settings.layer_height;
            if z > max_z {
                return None;
            }
            let segments = slice_at_z(&triangles, z);
            if segments.is_empty() {
                None
            } else {
                Some(SlicedLayer { z, segments })
            }
        })
        .collect();

    SlicedObject {
        layers,
        above_z_limit: false,
    }
}

/// Collect all triangle-plane intersection segments at one Z height.
fn slice_at_z(triangles: &[Triangle], z: f64) -> Vec<Segment> {
    let mut segments = Vec::new();
    for tri in triangles {
        if tri.z_max < z - PLANE_EPSILON || tri.z_min > z + PLANE_EPSILON {
            continue;
        }
        if let Some(seg) = triangle_plane_intersection(tri, z) {
            segments.push(seg);
        }
    }
    segments
}

/// Intersect one triangle with the horizontal plane at `z`.
///
/// Vertices within `PLANE_EPSILON` of the plane count as lying on it.
/// Intersection points are deduplicated within the same epsilon; exactly
/// two distinct points make a segment. Triangles entirely on one side, or
/// degenerate at the plane (all three vertices on it), yield nothing.
fn triangle_plane_intersection(tri: &Triangle, z: f64) -> Option<Segment> {
    let mut above = 0u8;
    let mut below = 0u8;
    for v in &tri.v {
        let d = v.z - z;
        if d.abs() < PLANE_EPSILON {
            above += 1;
            below += 1;
        } else if d > 0.0 {
            above += 1;
        } else {
            below += 1;
        }
    }
    if above == 0 || below == 0 {
        return None;
    }

    let mut points: Vec<Point2> = Vec::with_capacity(3);
    for (i, j) in [(0usize, 1usize), (1, 2), (2, 0)] {
        let p1 = tri.v[i];
        let p2 = tri.v[j];
        if (p1.z > z && p2.z > z) || (p1.z < z && p2.z < z) {
            continue;
        }
        if (p1.z - p2.z).abs() > PLANE_EPSILON {
            let t = (z - p1.z) / (p2.z - p1.z);
            push_unique(
                &mut points,
                Point2::new(p1.x + t * (p2.x - p1.x), p1.y + t * (p2.y - p1.y)),
            );
        } else if (p1.z - z).abs() < PLANE_EPSILON {
            push_unique(&mut points, Point2::new(p1.x, p1.y));
        }
    }

    if points.len() == 2 {
        Some(Segment::new(points[0], points[1]))
    } else {
        None
    }
}

fn push_unique(points: &mut Vec<Point2>, p: Point2) {
    let duplicate = points.iter().any(|q| {
        (q.x - p.x).abs() < PLANE_EPSILON && (q.y - p.y).abs() < PLANE_EPSILON
    });
    if !duplicate {
        points.push(p);
    }
}
