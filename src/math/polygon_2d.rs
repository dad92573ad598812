use super::intersect_2d::{segment_boxes_overlap, segment_segment_intersect_2d};
use super::{Point2, TOLERANCE};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Removes consecutive near-duplicate vertices of a closed loop, including
/// the wrap-around pair (last vs first).
#[must_use]
pub fn dedup_closed(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let tol_sq = tolerance * tolerance;
    let mut deduped: Vec<Point2> = Vec::with_capacity(points.len());
    for &pt in points {
        if let Some(last) = deduped.last() {
            if (pt - last).norm_squared() < tol_sq {
                continue;
            }
        }
        deduped.push(pt);
    }
    while deduped.len() > 1 {
        let first = deduped[0];
        let last = deduped[deduped.len() - 1];
        if (first - last).norm_squared() < tol_sq {
            deduped.pop();
        } else {
            break;
        }
    }
    deduped
}

/// Checks whether segments i and j are adjacent in a closed polygon.
fn are_adjacent(i: usize, j: usize, n: usize) -> bool {
    let diff = i.abs_diff(j);
    diff == 1 || diff == n - 1
}

/// Returns `true` if no two non-adjacent edges of the closed loop touch.
///
/// Edges that merely share an endpoint with a neighbour are ignored, as are
/// parallel edges. Edges are swept in order of their minimum x, so only
/// pairs whose x-extents overlap are tested.
#[must_use]
pub fn is_simple(points: &[Point2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    if n == 3 {
        return signed_area_2d(points).abs() > TOLERANCE;
    }
    let edge = |i: usize| (&points[i], &points[(i + 1) % n]);
    let min_x = |i: usize| points[i].x.min(points[(i + 1) % n].x);
    let max_x = |i: usize| points[i].x.max(points[(i + 1) % n].x);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| min_x(a).total_cmp(&min_x(b)));

    let mut active: Vec<usize> = Vec::new();
    for &i in &order {
        let start = min_x(i);
        active.retain(|&j| max_x(j) + TOLERANCE >= start);
        let (a0, a1) = edge(i);
        for &j in &active {
            if are_adjacent(i, j, n) {
                continue;
            }
            let (b0, b1) = edge(j);
            if !segment_boxes_overlap(a0, a1, b0, b1) {
                continue;
            }
            if segment_segment_intersect_2d(a0, a1, b0, b1).is_some() {
                return false;
            }
        }
        active.push(i);
    }
    true
}
