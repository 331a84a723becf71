//! Perimeter (wall loop) generation from layer contours.

use strata_math::{Point2, Vec2};

use crate::path::{edge_perpendicular, Contour, PathKind, ToolPath};
use crate::settings::SliceSettings;

/// Generate wall loops for one entry's contours.
///
/// Loop `i` of a contour is the contour offset inward by `i × line_width`;
/// loop 0 is the unoffset outer wall. Each loop is then simplified against
/// `min_segment_length` and discarded if fewer than three points remain.
pub fn generate_perimeters(contours: &[Contour], settings: &SliceSettings) -> Vec<ToolPath> {
    let mut perimeters = Vec::new();

    for contour in contours {
        if contour.len() < 3 {
            continue;
        }
        for i in 0..settings.wall_count {
            let points = if i == 0 {
                contour.points.clone()
            } else {
                offset_inward(contour, i as f64 * settings.line_width)
            };
            if let Some(points) = simplify_loop(points, settings.min_segment_length) {
                perimeters.push(ToolPath {
                    kind: if i == 0 {
                        PathKind::OuterWall
                    } else {
                        PathKind::InnerWall
                    },
                    points,
                    width: settings.line_width,
                });
            }
        }
    }

    perimeters
}

/// Offset a contour inward by `distance` using per-vertex normal averaging.
///
/// Each vertex moves by the average of its two adjacent edges' inward
/// perpendiculars. This is a simplified miter offset, not a
/// polygon-clipping offset: self-intersecting or thin contours degrade
/// rather than fail, which downstream stages tolerate. Winding is read
/// from the signed area so "inward" holds for either input orientation.
fn offset_inward(contour: &Contour, distance: f64) -> Vec<Point2> {
    let n = contour.len();
    let signed = if contour.is_ccw() { distance } else { -distance };
    let mut offset = Vec::with_capacity(n);

    for i in 0..n {
        let prev = &contour.points[(i + n - 1) % n];
        let curr = &contour.points[i];
        let next = &contour.points[(i + 1) % n];

        let v1 = edge_perpendicular(prev, curr, signed);
        let v2 = edge_perpendicular(curr, next, signed);
        let shift = Vec2::new((v1.x + v2.x) / 2.0, (v1.y + v2.y) / 2.0);
        offset.push(Point2::new(curr.x + shift.x, curr.y + shift.y));
    }

    offset
}

/// Drop vertices closer than `min_length` to the previously kept vertex.
///
/// If the surviving head and tail collapse below `min_length`, the closing
/// point is dropped too. Returns `None` when fewer than three points
/// survive.
fn simplify_loop(points: Vec<Point2>, min_length: f64) -> Option<Vec<Point2>> {
    if points.is_empty() {
        return None;
    }
    let mut kept: Vec<Point2> = Vec::with_capacity(points.len());
    kept.push(points[0]);
    for p in &points[1..] {
        let last = kept[kept.len() - 1];
        if (p - last).norm() >= min_length {
            kept.push(*p);
        }
    }
    if kept.len() > 1 {
        let head = kept[0];
        let tail = kept[kept.len() - 1];
        if (tail - head).norm() < min_length {
            kept.pop();
        }
    }
    if kept.len() >= 3 {
        Some(kept)
    } else {
        None
    }
}
