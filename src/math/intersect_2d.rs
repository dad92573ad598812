use super::{Point2, TOLERANCE};

/// Bounded segment-segment intersection in 2D.
///
/// Returns `(intersection_point, t, u)` where `t` and `u` are in `[0, 1]`.
/// Parallel (including collinear) segments return `None`.
#[must_use]
pub fn segment_segment_intersect_2d(
    a0: &Point2,
    a1: &Point2,
    b0: &Point2,
    b1: &Point2,
) -> Option<(Point2, f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;

    let cross = da.x * db.y - da.y * db.x;
    if cross.abs() < TOLERANCE {
        return None;
    }

    let dx = b0.x - a0.x;
    let dy = b0.y - a0.y;
    let t = (dx * db.y - dy * db.x) / cross;
    let u = (dx * da.y - dy * da.x) / cross;

    // Use a small epsilon to include endpoints.
    let eps = TOLERANCE;
    if t >= -eps && t <= 1.0 + eps && u >= -eps && u <= 1.0 + eps {
        let t_clamped = t.clamp(0.0, 1.0);
        Some((a0 + da * t_clamped, t_clamped, u.clamp(0.0, 1.0)))
    } else {
        None
    }
}

/// Returns `true` if the axis-aligned boxes of two segments overlap.
#[must_use]
pub fn segment_boxes_overlap(a0: &Point2, a1: &Point2, b0: &Point2, b1: &Point2) -> bool {
    let eps = TOLERANCE;
    a0.x.min(a1.x) <= b0.x.max(b1.x) + eps
        && b0.x.min(b1.x) <= a0.x.max(a1.x) + eps
        && a0.y.min(a1.y) <= b0.y.max(b1.y) + eps
        && b0.y.min(b1.y) <= a0.y.max(a1.y) + eps
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments() {
        let (p, t, u) = segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(2.0, 2.0),
            &Point2::new(0.0, 2.0),
            &Point2::new(2.0, 0.0),
        )
        .unwrap();
        assert!((p.x - 1.0).abs() < TOLERANCE);
        assert!((p.y - 1.0).abs() < TOLERANCE);
        assert!((t - 0.5).abs() < TOLERANCE);
        assert!((u - 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn disjoint_segments() {
        assert!(segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(2.0, -1.0),
            &Point2::new(2.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn parallel_segments() {
        assert!(segment_segment_intersect_2d(
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            &Point2::new(0.0, 1.0),
            &Point2::new(1.0, 1.0),
        )
        .is_none());
    }

    #[test]
    fn box_overlap() {
        let o = Point2::origin();
        assert!(segment_boxes_overlap(&o, &Point2::new(1.0, 1.0), &Point2::new(0.5, 0.5), &Point2::new(2.0, 2.0)));
        assert!(!segment_boxes_overlap(&o, &Point2::new(1.0, 1.0), &Point2::new(3.0, 3.0), &Point2::new(4.0, 4.0)));
    }
}
