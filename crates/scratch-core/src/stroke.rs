//! Stroke accumulation and smoothing.
//!
//! Input handlers append samples; each repaint tick drains them into one
//! smoothed path. The last sample is kept so the next tick continues the
//! stroke from where this one ended.

use crate::geometry::Point;
use kurbo::BezPath;

/// Fewer buffered samples than this are left for a later tick unless the
/// stroke is being flushed.
pub const MIN_STROKE_POINTS: usize = 3;

/// Pending samples captured since the last repaint, oldest first.
#[derive(Debug, Default, Clone)]
pub struct StrokeAccumulator {
    pending: Vec<Point>,
}

impl StrokeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: Point) {
        self.pending.push(point);
    }

    pub fn pending(&self) -> &[Point] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Drain the buffered samples into a smoothed path.
    ///
    /// Returns `None` when nothing is buffered, or when fewer than
    /// [`MIN_STROKE_POINTS`] are buffered and `force` is not set. After a
    /// path is produced exactly one sample, the last one, stays queued.
    pub fn take_stroke(&mut self, force: bool) -> Option<BezPath> {
        let last = *self.pending.last()?;
        if !force && self.pending.len() < MIN_STROKE_POINTS {
            return None;
        }
        let path = smooth_path(&self.pending);
        self.pending.clear();
        self.pending.push(last);
        Some(path)
    }
}

/// Build a smoothed polyline through `points`.
///
/// Starts at the first point, bends through each interior point toward the
/// midpoint of it and its successor, and finishes with a straight segment to
/// the last point. The interior loop stops two short of the end, so queues of
/// three points come out as a single straight segment.
///
/// An interior point is skipped only when it equals its successor in both
/// coordinates; samples that merely share a row still bend the curve.
pub fn smooth_path(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return path;
    };

    path.move_to(*first);
    for pair in points.windows(2).take(points.len().saturating_sub(2)).skip(1) {
        let (control, next) = (pair[0], pair[1]);
        if control == next {
            continue;
        }
        path.quad_to(control, control.midpoint(next));
    }
    path.line_to(*last);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::PathEl;
    use pretty_assertions::assert_eq;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().copied().map(Point::from).collect()
    }

    fn endpoints(path: &BezPath) -> (kurbo::Point, kurbo::Point) {
        let els = path.elements();
        let start = match els.first() {
            Some(PathEl::MoveTo(p)) => *p,
            other => panic!("path must open with MoveTo, got {other:?}"),
        };
        let end = els.last().and_then(|el| el.end_point()).expect("path has an end");
        (start, end)
    }

    #[test]
    fn waits_for_three_points_unless_forced() {
        let mut acc = StrokeAccumulator::new();
        acc.push(Point::new(0.0, 0.0));
        acc.push(Point::new(5.0, 0.0));
        assert!(acc.take_stroke(false).is_none());
        assert_eq!(acc.len(), 2);

        assert!(acc.take_stroke(true).is_some());
        assert_eq!(acc.pending(), &[Point::new(5.0, 0.0)]);
    }

    #[test]
    fn empty_queue_yields_nothing_even_when_forced() {
        let mut acc = StrokeAccumulator::new();
        assert!(acc.take_stroke(true).is_none());
        assert!(acc.is_empty());
    }

    #[test]
    fn keeps_only_the_last_point_after_a_stroke() {
        let mut acc = StrokeAccumulator::new();
        for p in pts(&[(0.0, 0.0), (10.0, 5.0), (20.0, 0.0), (30.0, 5.0), (40.0, 0.0)]) {
            acc.push(p);
        }
        acc.take_stroke(false).unwrap();
        assert_eq!(acc.pending(), &[Point::new(40.0, 0.0)]);
    }

    #[test]
    fn endpoints_are_never_smoothed_away() {
        for n in 3..12 {
            let points: Vec<Point> = (0..n)
                .map(|i| Point::new(i as f64 * 7.0, if i % 2 == 0 { 0.0 } else { 9.0 }))
                .collect();
            let path = smooth_path(&points);
            let (start, end) = endpoints(&path);
            assert_eq!(start, kurbo::Point::from(points[0]), "start for n={n}");
            assert_eq!(end, kurbo::Point::from(points[n - 1]), "end for n={n}");
        }
    }

    #[test]
    fn three_points_make_a_straight_segment() {
        let path = smooth_path(&pts(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)]));
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo((0.0, 0.0).into()),
                PathEl::LineTo((20.0, 0.0).into()),
            ]
        );
    }

    #[test]
    fn interior_points_become_quadratic_segments() {
        let path = smooth_path(&pts(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0), (30.0, 10.0)]));
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo((0.0, 0.0).into()),
                PathEl::QuadTo((10.0, 10.0).into(), (15.0, 5.0).into()),
                PathEl::LineTo((30.0, 10.0).into()),
            ]
        );
    }

    #[test]
    fn duplicate_samples_are_skipped() {
        let path = smooth_path(&pts(&[
            (0.0, 0.0),
            (10.0, 10.0),
            (10.0, 10.0),
            (20.0, 0.0),
            (30.0, 10.0),
        ]));
        let quads = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::QuadTo(..)))
            .count();
        assert_eq!(quads, 1);
    }

    #[test]
    fn samples_sharing_a_row_are_kept() {
        let path = smooth_path(&pts(&[
            (0.0, 0.0),
            (10.0, 10.0),
            (15.0, 10.0),
            (20.0, 0.0),
            (30.0, 10.0),
        ]));
        let quads = path
            .elements()
            .iter()
            .filter(|el| matches!(el, PathEl::QuadTo(..)))
            .count();
        assert_eq!(quads, 2);
    }
}
