//! Infill generation inside the innermost wall loop.

use strata_math::{Point2, Vec2};

use crate::path::{segment_intersection, Contour, PathKind, ToolPath};
use crate::settings::{InfillPattern, SliceSettings};

/// Generate infill paths for one entry, bounded by its innermost wall.
///
/// The boundary is the last inner wall loop when one exists, otherwise the
/// last wall loop of any kind. No walls or zero density means no infill.
/// `layer_index` drives the alternating rectilinear direction.
pub fn generate_infill(
    perimeters: &[ToolPath],
    settings: &SliceSettings,
    layer_index: usize,
) -> Vec<ToolPath> {
    if settings.infill_density <= 0.0 {
        return Vec::new();
    }
    let boundary = match innermost_wall(perimeters) {
        Some(path) => Contour::new(path.points.clone()),
        None => return Vec::new(),
    };
    if boundary.len() < 3 {
        return Vec::new();
    }

    let spacing = settings.line_width / (settings.infill_density / 100.0);
    // Validated settings guarantee this; direct callers may not validate
    if !(spacing > 0.0) {
        return Vec::new();
    }

    match settings.infill_pattern {
        InfillPattern::Rectilinear => {
            let angle = settings.infill_angle + (layer_index % 2) as f64 * 90.0;
            scan_lines(&boundary, angle, spacing, settings)
        }
        InfillPattern::Grid => {
            let mut paths = scan_lines(&boundary, settings.infill_angle, spacing, settings);
            paths.extend(scan_lines(
                &boundary,
                settings.infill_angle + 90.0,
                spacing,
                settings,
            ));
            for path in &mut paths {
                path.kind = PathKind::Infill(InfillPattern::Grid);
            }
            paths
        }
        InfillPattern::Honeycomb => honeycomb(&boundary, spacing, settings),
    }
}

fn innermost_wall(perimeters: &[ToolPath]) -> Option<&ToolPath> {
    perimeters
        .iter()
        .rev()
        .find(|p| p.kind == PathKind::InnerWall)
        .or_else(|| perimeters.last())
}

/// Clip evenly spaced parallel lines at `angle_deg` to the boundary.
///
/// Lines are walked along the axis perpendicular to the fill direction
/// across the boundary's bounding box. Each line's boundary crossings are
/// sorted along the fill direction and consumed in entry/exit pairs; a
/// pair survives if it is at least `min_segment_length` long and its
/// midpoint is inside the boundary. `infill_overlap` extends both ends of
/// each surviving span toward the walls.
fn scan_lines(
    boundary: &Contour,
    angle_deg: f64,
    spacing: f64,
    settings: &SliceSettings,
) -> Vec<ToolPath> {
    let angle = angle_deg.to_radians();
    let dir = Vec2::new(angle.cos(), angle.sin());
    let perp = Vec2::new(-dir.y, dir.x);

    let (min, max) = boundary.bounds();
    let center = Point2::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
    let half_span = (max - min).norm() / 2.0 + spacing;

    // Perpendicular extent of the bounding box
    let mut t_min = f64::MAX;
    let mut t_max = f64::MIN;
    for corner in [
        Point2::new(min.x, min.y),
        Point2::new(max.x, min.y),
        Point2::new(max.x, max.y),
        Point2::new(min.x, max.y),
    ] {
        let t = (corner - center).dot(&perp);
        t_min = t_min.min(t);
        t_max = t_max.max(t);
    }

    let extend = settings.infill_overlap / 100.0 * settings.line_width;
    let mut paths = Vec::new();

    let mut t = t_min + spacing / 2.0;
    while t <= t_max {
        let line_start = center + perp * t - dir * half_span;
        let line_end = center + perp * t + dir * half_span;

        let mut hits: Vec<f64> = Vec::new();
        let n = boundary.len();
        for i in 0..n {
            let a = &boundary.points[i];
            let b = &boundary.points[(i + 1) % n];
            if let Some(p) = segment_intersection(&line_start, &line_end, a, b) {
                let s = (p - line_start).dot(&dir);
                // Vertex crossings report once per incident edge
                if !hits.iter().any(|h| (h - s).abs() < 1e-6) {
                    hits.push(s);
                }
            }
        }
        hits.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for pair in hits.chunks_exact(2) {
            let (s0, s1) = (pair[0], pair[1]);
            if s1 - s0 < settings.min_segment_length {
                continue;
            }
            let mid = line_start + dir * ((s0 + s1) / 2.0);
            if !boundary.contains(&mid) {
                continue;
            }
            let p0 = line_start + dir * (s0 - extend);
            let p1 = line_start + dir * (s1 + extend);
            paths.push(ToolPath {
                kind: PathKind::Infill(InfillPattern::Rectilinear),
                points: vec![p0, p1],
                width: settings.line_width,
            });
        }

        t += spacing;
    }

    paths
}

/// Hexagonal cells clipped to the boundary.
///
/// Hexagons of radius `2 × spacing` on a staggered column grid (column
/// pitch 1.5 cells, row pitch 0.866 cells, odd columns shifted by half a
/// row); each hexagon edge whose midpoint lies inside the boundary is
/// kept, with consecutive kept edges chained into one path.
fn honeycomb(boundary: &Contour, spacing: f64, settings: &SliceSettings) -> Vec<ToolPath> {
    let cell = spacing * 2.0;
    let col_pitch = 1.5 * cell;
    let row_pitch = 0.866 * cell;
    let stagger = 0.433 * cell;

    let (min, max) = boundary.bounds();
    let mut paths = Vec::new();

    let mut col = 0usize;
    let mut cx = min.x;
    while cx <= max.x + cell {
        let offset = if col % 2 == 1 { stagger } else { 0.0 };
        let mut cy = min.y + offset;
        while cy <= max.y + cell {
            let center = Point2::new(cx, cy);
            let corners: Vec<Point2> = (0..6)
                .map(|k| {
                    let a = (k as f64) * std::f64::consts::FRAC_PI_3;
                    Point2::new(center.x + cell * a.cos(), center.y + cell * a.sin())
                })
                .collect();

            let mut chain: Vec<Point2> = Vec::new();
            for k in 0..6 {
                let a = corners[k];
                let b = corners[(k + 1) % 6];
                let mid = Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
                if boundary.contains(&mid) {
                    if chain.is_empty() {
                        chain.push(a);
                    }
                    chain.push(b);
                } else if chain.len() >= 2 {
                    paths.push(ToolPath {
                        kind: PathKind::Infill(InfillPattern::Honeycomb),
                        points: std::mem::take(&mut chain),
                        width: settings.line_width,
                    });
                } else {
                    chain.clear();
                }
            }
            if chain.len() >= 2 {
                paths.push(ToolPath {
                    kind: PathKind::Infill(InfillPattern::Honeycomb),
                    points: chain,
                    width: settings.line_width,
                });
            }

            cy += row_pitch;
        }
        cx += col_pitch;
        col += 1;
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_wall(size: f64, kind: PathKind) -> ToolPath {
        ToolPath {
            kind,
            points: vec![
                Point2::new(0.0, 0.0),
                Point2::new(size, 0.0),
                Point2::new(size, size),
                Point2::new(0.0, size),
            ],
            width: 0.4,
        }
    }

    fn settings(density: f64) -> SliceSettings {
        SliceSettings {
            infill_density: density,
            line_width: 0.4,
            min_segment_length: 0.1,
            infill_overlap: 0.0,
            infill_angle: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_rectilinear_fills_square() {
        let walls = [square_wall(10.0, PathKind::InnerWall)];
        let paths = generate_infill(&walls, &settings(20.0), 0);
        // 20% density at 0.4mm width: one line every 2mm
        assert!(!paths.is_empty());
        assert!(paths.len() <= 6);
        for path in &paths {
            assert_eq!(path.points.len(), 2);
            // Layer 0: lines run along the X axis
            assert!((path.points[0].y - path.points[1].y).abs() < 1e-9);
            assert!((path.points[1] - path.points[0]).norm() > 9.0);
        }
    }

    #[test]
    fn test_alternate_layers_rotate_ninety_degrees() {
        let walls = [square_wall(10.0, PathKind::InnerWall)];
        let paths = generate_infill(&walls, &settings(20.0), 1);
        for path in &paths {
            assert!((path.points[0].x - path.points[1].x).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_density_gives_no_infill() {
        let walls = [square_wall(10.0, PathKind::InnerWall)];
        assert!(generate_infill(&walls, &settings(0.0), 0).is_empty());
    }

    #[test]
    fn test_no_walls_gives_no_infill() {
        assert!(generate_infill(&[], &settings(20.0), 0).is_empty());
    }

    #[test]
    fn test_boundary_is_innermost_wall() {
        let walls = [
            square_wall(20.0, PathKind::OuterWall),
            square_wall(10.0, PathKind::InnerWall),
        ];
        let paths = generate_infill(&walls, &settings(20.0), 0);
        for path in &paths {
            for p in &path.points {
                assert!(p.x >= -1e-9 && p.x <= 10.0 + 1e-9);
                assert!(p.y >= -1e-9 && p.y <= 10.0 + 1e-9);
            }
        }
    }

    #[test]
    fn test_overlap_extends_lines() {
        let walls = [square_wall(10.0, PathKind::InnerWall)];
        let without = generate_infill(&walls, &settings(20.0), 0);
        let mut with_overlap = settings(20.0);
        with_overlap.infill_overlap = 15.0;
        let with = generate_infill(&walls, &with_overlap, 0);
        let avg = |paths: &[ToolPath]| {
            paths.iter().map(|p| p.length()).sum::<f64>() / paths.len() as f64
        };
        assert!(avg(&with) > avg(&without));
    }

    #[test]
    fn test_grid_has_both_directions() {
        let walls = [square_wall(10.0, PathKind::InnerWall)];
        let mut grid = settings(20.0);
        grid.infill_pattern = InfillPattern::Grid;
        let paths = generate_infill(&walls, &grid, 0);
        let horizontal = paths
            .iter()
            .filter(|p| (p.points[0].y - p.points[1].y).abs() < 1e-9)
            .count();
        let vertical = paths
            .iter()
            .filter(|p| (p.points[0].x - p.points[1].x).abs() < 1e-9)
            .count();
        assert!(horizontal > 0);
        assert!(vertical > 0);
        assert_eq!(horizontal + vertical, paths.len());
        for path in &paths {
            assert_eq!(path.kind, PathKind::Infill(InfillPattern::Grid));
        }
    }

    #[test]
    fn test_zero_line_width_yields_no_infill() {
        let walls = [square_wall(10.0, PathKind::InnerWall)];
        let mut bad = settings(20.0);
        bad.line_width = 0.0;
        assert!(generate_infill(&walls, &bad, 0).is_empty());
    }

    #[test]
    fn test_honeycomb_density_matches_spacing() {
        let walls = [square_wall(20.0, PathKind::InnerWall)];
        let mut hc = settings(20.0);
        hc.infill_pattern = InfillPattern::Honeycomb;
        let paths = generate_infill(&walls, &hc, 0);
        // 20% density at 0.4mm lines: 2mm spacing, 4mm cells. A 20mm
        // square crosses four hexagon columns and seven rows per column.
        assert!(paths.len() >= 25);
    }

    #[test]
    fn test_honeycomb_stays_inside_boundary() {
        let walls = [square_wall(20.0, PathKind::InnerWall)];
        let mut hc = settings(20.0);
        hc.infill_pattern = InfillPattern::Honeycomb;
        let paths = generate_infill(&walls, &hc, 0);
        assert!(!paths.is_empty());
        for path in &paths {
            assert!(path.points.len() >= 2);
            assert_eq!(path.kind, PathKind::Infill(InfillPattern::Honeycomb));
            for w in path.points.windows(2) {
                let mid = Point2::new((w[0].x + w[1].x) / 2.0, (w[0].y + w[1].y) / 2.0);
                assert!(walls[0].points.len() >= 3);
                assert!(Contour::new(walls[0].points.clone()).contains(&mid));
            }
        }
    }
}
