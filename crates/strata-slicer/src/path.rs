//! 2D geometry carried between pipeline stages.

use strata_math::{Point2, Vec2};

use crate::settings::InfillPattern;

/// A single line segment from one triangle-plane intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start point.
    pub start: Point2,
    /// End point.
    pub end: Point2,
}

impl Segment {
    /// Create a segment.
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> Point2 {
        Point2::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }
}

/// Toolpath feature classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// The outermost wall loop of a contour.
    OuterWall,
    /// Any wall loop inside the outer one.
    InnerWall,
    /// Interior fill, tagged with the pattern that produced it.
    Infill(InfillPattern),
}

/// An ordered toolpath with its feature tag and extrusion width.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPath {
    /// Feature classification.
    pub kind: PathKind,
    /// Path points in emission order.
    pub points: Vec<Point2>,
    /// Extrusion width (mm).
    pub width: f64,
}

impl ToolPath {
    /// Total polyline length (not counting an implicit closing move).
    pub fn length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    /// Is this path a wall loop (as opposed to infill)?
    pub fn is_wall(&self) -> bool {
        matches!(self.kind, PathKind::OuterWall | PathKind::InnerWall)
    }
}

/// An approximately-closed polygon reconstructed from segments.
///
/// "Closed" means first and last points coincide within the connection
/// tolerance; open best-effort chains are also carried as contours.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Vertices in order.
    pub points: Vec<Point2>,
}

impl Contour {
    /// Create a contour from points.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the contour has no vertices.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Signed area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area / 2.0
    }

    /// Is the contour counter-clockwise?
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Even-odd ray-casting point containment test.
    pub fn contains(&self, point: &Point2) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = &self.points[i];
            let pj = &self.points[j];
            if ((pi.y > point.y) != (pj.y > point.y))
                && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Axis-aligned bounding box as (min, max).
    pub fn bounds(&self) -> (Point2, Point2) {
        bounds_of(&self.points)
    }
}

/// Axis-aligned bounding box of a point set as (min, max).
pub fn bounds_of(points: &[Point2]) -> (Point2, Point2) {
    let mut min = Point2::new(f64::MAX, f64::MAX);
    let mut max = Point2::new(f64::MIN, f64::MIN);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

/// Intersection of segments `a0-a1` and `b0-b1`, if any.
pub fn segment_intersection(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> Option<Point2> {
    let eps = 1e-4;
    let denom = (a0.x - a1.x) * (b0.y - b1.y) - (a0.y - a1.y) * (b0.x - b1.x);
    if denom.abs() < eps {
        return None;
    }
    let t = ((a0.x - b0.x) * (b0.y - b1.y) - (a0.y - b0.y) * (b0.x - b1.x)) / denom;
    let u = -((a0.x - a1.x) * (a0.y - b0.y) - (a0.y - a1.y) * (a0.x - b0.x)) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(Point2::new(
            a0.x + t * (a1.x - a0.x),
            a0.y + t * (a1.y - a0.y),
        ))
    } else {
        None
    }
}

/// Perpendicular of the edge `p1 -> p2`, scaled to `distance`.
///
/// Returns zero for degenerate (zero-length) edges.
pub fn edge_perpendicular(p1: &Point2, p2: &Point2, distance: f64) -> Vec2 {
    let d = p2 - p1;
    let len = d.norm();
    if len == 0.0 {
        return Vec2::zeros();
    }
    Vec2::new(-d.y / len * distance, d.x / len * distance)
}
