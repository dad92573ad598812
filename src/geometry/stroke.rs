use super::curve::PathSample;
use crate::error::{GeometryError, Result};
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::{dedup_closed, is_simple, signed_area_2d};
use crate::math::{left_normal, Point2, TOLERANCE};

/// Vertex merge distance used when splitting bands into pieces.
const MERGE_DISTANCE: f64 = TOLERANCE * 1e3;

/// A sampled centerline with a width at every sample.
///
/// Outlines are produced by offsetting each sample along its tangent normal,
/// so arc samples yield radial trapezoids and the outline stays faithful to
/// the curve at any width.
#[derive(Debug, Clone)]
pub struct Stroke {
    samples: Vec<PathSample>,
    widths: Vec<f64>,
}

impl Stroke {
    /// Creates a stroke. `samples` and `widths` must have equal length.
    #[must_use]
    pub fn new(samples: Vec<PathSample>, widths: Vec<f64>) -> Self {
        debug_assert_eq!(samples.len(), widths.len());
        Self { samples, widths }
    }

    /// Centerline samples.
    #[must_use]
    pub fn samples(&self) -> &[PathSample] {
        &self.samples
    }

    /// Widths, one per sample.
    #[must_use]
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Polyline length of the centerline.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|w| (w[1].point - w[0].point).norm())
            .sum()
    }

    /// Smallest width along the stroke.
    #[must_use]
    pub fn min_width(&self) -> f64 {
        self.widths.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Closed loop bounded by the lateral offsets `lower(w)` and `upper(w)`
    /// of every sample, where `w` is the local width and offsets are measured
    /// along the left normal.
    ///
    /// The loop runs forward along `upper`, then back along `lower`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the stroke has fewer than 2
    /// samples.
    pub fn band<L, U>(&self, lower: L, upper: U) -> Result<Vec<Point2>>
    where
        L: Fn(f64) -> f64,
        U: Fn(f64) -> f64,
    {
        if self.samples.len() < 2 {
            return Err(GeometryError::Degenerate(
                "a stroke needs at least 2 centerline samples".to_owned(),
            )
            .into());
        }
        let mut loop_points = Vec::with_capacity(self.samples.len() * 2);
        for (s, &w) in self.samples.iter().zip(&self.widths) {
            loop_points.push(s.point + left_normal(s.angle) * upper(w));
        }
        for (s, &w) in self.samples.iter().zip(&self.widths).rev() {
            loop_points.push(s.point + left_normal(s.angle) * lower(w));
        }
        Ok(loop_points)
    }

    /// The band between `lower` and `upper` as a list of simple loops.
    ///
    /// Usually this is the single loop of [`Stroke::band`]. When an offset
    /// reaches past the local centre of curvature (a cladding wider than the
    /// bend radius, say), neighbouring offset normals cross and the single
    /// loop folds over itself. Each such run of samples is then split at the
    /// crossing points into two fans, one per side, and the runs around it
    /// stay ordinary bands. The pieces tile the swept region without the
    /// fold.
    ///
    /// # Errors
    ///
    /// Same as [`Stroke::band`].
    pub fn band_pieces<L, U>(&self, lower: L, upper: U) -> Result<Vec<Vec<Point2>>>
    where
        L: Fn(f64) -> f64,
        U: Fn(f64) -> f64,
    {
        let whole = self.band(&lower, &upper)?;
        if is_simple(&dedup_closed(&whole, MERGE_DISTANCE)) {
            return Ok(vec![whole]);
        }
        let lo = self.offsets(&lower);
        let hi = self.offsets(&upper);
        let crossings: Vec<Option<Point2>> = (0..lo.len() - 1)
            .map(|k| {
                segment_segment_intersect_2d(&lo[k], &hi[k], &lo[k + 1], &hi[k + 1])
                    .map(|(p, _, _)| p)
            })
            .collect();
        if crossings.iter().all(Option::is_none) {
            // folded for another reason; polygon validation reports it
            return Ok(vec![whole]);
        }

        let mut pieces = Vec::new();
        let mut k = 0;
        while k < crossings.len() {
            let start = k;
            let tangled = crossings[k].is_some();
            while k < crossings.len() && crossings[k].is_some() == tangled {
                k += 1;
            }
            if !tangled {
                let mut run: Vec<Point2> = hi[start..=k].to_vec();
                run.extend(lo[start..=k].iter().rev());
                push_piece(&mut pieces, &run);
                continue;
            }
            let xs: Vec<Point2> = crossings[start..k].iter().flatten().copied().collect();
            let mut lower_fan: Vec<Point2> = lo[start..=k].to_vec();
            lower_fan.extend(xs.iter().rev());
            let mut upper_fan = xs.clone();
            upper_fan.extend(hi[start..=k].iter().rev());
            if is_simple(&dedup_closed(&lower_fan, MERGE_DISTANCE)) {
                push_piece(&mut pieces, &lower_fan);
            } else {
                for (j, x) in (start..k).zip(&xs) {
                    push_piece(&mut pieces, &[lo[j], lo[j + 1], *x]);
                }
            }
            if is_simple(&dedup_closed(&upper_fan, MERGE_DISTANCE)) {
                push_piece(&mut pieces, &upper_fan);
            } else {
                for (j, x) in (start..k).zip(&xs) {
                    push_piece(&mut pieces, &[*x, hi[j + 1], hi[j]]);
                }
            }
        }
        Ok(pieces)
    }

    fn offsets<F: Fn(f64) -> f64>(&self, offset: F) -> Vec<Point2> {
        self.samples
            .iter()
            .zip(&self.widths)
            .map(|(s, &w)| s.point + left_normal(s.angle) * offset(w))
            .collect()
    }

    /// Outline of the full stroke width centred on the path.
    ///
    /// # Errors
    ///
    /// Same as [`Stroke::band`].
    pub fn outline(&self) -> Result<Vec<Point2>> {
        self.band(|w| -0.5 * w, |w| 0.5 * w)
    }
}

/// Keeps `piece` unless it has collapsed to a sliver.
fn push_piece(pieces: &mut Vec<Vec<Point2>>, piece: &[Point2]) {
    let piece = dedup_closed(piece, MERGE_DISTANCE);
    if piece.len() >= 3 && signed_area_2d(&piece).abs() > MERGE_DISTANCE {
        pieces.push(piece);
    }
}
