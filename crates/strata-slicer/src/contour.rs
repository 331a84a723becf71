//! Contour reconstruction from unordered intersection segments.

use crate::path::{Contour, Segment};

/// Endpoint connection tolerance (mm).
pub const CONNECT_TOLERANCE: f64 = 0.1;

/// Hard cap on chain length, guarding against malformed segment sets.
pub const MAX_CONTOUR_POINTS: usize = 10_000;

/// Link an unordered segment set into closed polygonal contours.
///
/// Greedy chaining: start a chain from an unused segment, then repeatedly
/// append whichever unused segment has an endpoint within
/// [`CONNECT_TOLERANCE`] of the chain's tail, until the chain closes on
/// its head or no match remains. Chains that fail to close are still
/// returned when they have at least three points; downstream consumers
/// treat those as best-effort. O(n²) per layer, acceptable for per-layer
/// segment counts.
pub fn build_contours(segments: &[Segment]) -> Vec<Contour> {
    let mut contours = Vec::new();
    let mut used = vec![false; segments.len()];

    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        used[i] = true;
        let mut chain = vec![segments[i].start, segments[i].end];

        loop {
            if chain.len() >= MAX_CONTOUR_POINTS {
                break;
            }
            let tail = chain[chain.len() - 1];

            let mut found = false;
            for (j, seg) in segments.iter().enumerate() {
                if used[j] {
                    continue;
                }
                if (seg.start - tail).norm() < CONNECT_TOLERANCE {
                    chain.push(seg.end);
                    used[j] = true;
                    found = true;
                    break;
                }
                if (seg.end - tail).norm() < CONNECT_TOLERANCE {
                    chain.push(seg.start);
                    used[j] = true;
                    found = true;
                    break;
                }
            }
            if !found {
                break;
            }
            // Closed back onto the head?
            if (chain[chain.len() - 1] - chain[0]).norm() < CONNECT_TOLERANCE {
                break;
            }
        }

        if chain.len() >= 3 {
            contours.push(Contour::new(chain));
        }
    }

    contours
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_math::Point2;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64) -> Segment {
        Segment::new(Point2::new(x0, y0), Point2::new(x1, y1))
    }

    #[test]
    fn test_square_from_shuffled_segments() {
        // Four sides of a unit square in scrambled order and orientation
        let segments = vec![
            seg(1.0, 1.0, 0.0, 1.0),
            seg(0.0, 0.0, 1.0, 0.0),
            seg(0.0, 1.0, 0.0, 0.0),
            seg(1.0, 0.0, 1.0, 1.0),
        ];
        let contours = build_contours(&segments);
        assert_eq!(contours.len(), 1);
        let contour = &contours[0];
        assert!(contour.len() >= 4);
        // Closed within tolerance
        let head = contour.points[0];
        let tail = contour.points[contour.len() - 1];
        assert!((tail - head).norm() < CONNECT_TOLERANCE);
    }

    #[test]
    fn test_near_coincident_endpoints_connect() {
        // Endpoints 0.05mm apart, inside the 0.1mm tolerance
        let segments = vec![
            seg(0.0, 0.0, 5.0, 0.0),
            seg(5.05, 0.0, 5.0, 5.0),
            seg(5.0, 5.0, 0.0, 5.0),
            seg(0.0, 5.05, 0.0, 0.0),
        ];
        let contours = build_contours(&segments);
        assert_eq!(contours.len(), 1);
        assert!(contours[0].len() >= 4);
    }

    #[test]
    fn test_open_chain_still_returned() {
        let segments = vec![seg(0.0, 0.0, 1.0, 0.0), seg(1.0, 0.0, 2.0, 1.0)];
        let contours = build_contours(&segments);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 3);
    }

    #[test]
    fn test_lone_segment_dropped() {
        let contours = build_contours(&[seg(0.0, 0.0, 1.0, 0.0)]);
        assert!(contours.is_empty());
    }

    #[test]
    fn test_two_separate_squares() {
        let mut segments = Vec::new();
        for offset in [0.0, 20.0] {
            segments.push(seg(offset, 0.0, offset + 1.0, 0.0));
            segments.push(seg(offset + 1.0, 0.0, offset + 1.0, 1.0));
            segments.push(seg(offset + 1.0, 1.0, offset, 1.0));
            segments.push(seg(offset, 1.0, offset, 0.0));
        }
        let contours = build_contours(&segments);
        assert_eq!(contours.len(), 2);
    }
}
