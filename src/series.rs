use log::warn;

use crate::config::SeriesConfig;
use crate::downsample::downsample;
use crate::ingest::RawSeries;

/// One point handed to the rendering surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderPoint {
    pub x: f64,
    pub y: f64,
}

/// Render-ready series: index-aligned points plus a bounded width hint in
/// pixels. Rebuilt wholesale per ingestion, never patched in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderSeries {
    pub points: Vec<RenderPoint>,
    pub width_hint: f32,
}

impl RenderSeries {
    /// Nearest sampled point by x. Points inherit the document's time
    /// ordering, which is ascending for scan data, so a binary search
    /// finds the insertion slot and the closer neighbor wins.
    pub fn nearest_by_x(&self, x: f64) -> Option<RenderPoint> {
        if self.points.is_empty() {
            return None;
        }
        let idx = self.points.partition_point(|p| p.x < x);
        let candidate = |i: usize| self.points.get(i).copied();
        match (idx.checked_sub(1).and_then(candidate), candidate(idx)) {
            (Some(left), Some(right)) => {
                if (x - left.x).abs() <= (right.x - x).abs() {
                    Some(left)
                } else {
                    Some(right)
                }
            }
            (left, right) => left.or(right),
        }
    }
}

/// Downsamples both columns with the same target and zips them into a
/// [`RenderSeries`].
///
/// The downsampler guarantees equal output lengths for equal-length
/// columns; a mismatch can only come from a malformed `RawSeries`, and is
/// handled by truncating to the shorter side rather than failing.
///
/// `width_hint` allots `unit_width` pixels per point but never more than
/// `max_visible_columns` worth, so long series scroll instead of
/// stretching the surface unboundedly.
pub fn build_series(raw: &RawSeries, config: &SeriesConfig) -> RenderSeries {
    let xs = downsample(&raw.time, config.target_points);
    let ys = downsample(&raw.amplitude, config.target_points);
    if xs.len() != ys.len() {
        warn!(
            "downsampled column length mismatch ({} vs {}), truncating",
            xs.len(),
            ys.len()
        );
    }
    let points: Vec<RenderPoint> = xs
        .iter()
        .zip(&ys)
        .map(|(&x, &y)| RenderPoint { x, y })
        .collect();
    let columns = points.len().min(config.max_visible_columns);
    RenderSeries {
        width_hint: columns as f32 * config.unit_width,
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(n: usize) -> RawSeries {
        RawSeries {
            time: (0..n).map(|i| i as f64 * 100.0).collect(),
            amplitude: (0..n).map(|i| (i as f64 * 0.1).sin()).collect(),
        }
    }

    #[test]
    fn points_are_zipped_by_index() {
        let raw = RawSeries {
            time: vec![0.0, 1.0, 2.0, 3.0],
            amplitude: vec![10.0, 20.0, 30.0, 40.0],
        };
        let series = build_series(&raw, &SeriesConfig::default());
        assert_eq!(series.points.len(), 4);
        assert_eq!(series.points[2], RenderPoint { x: 2.0, y: 30.0 });
    }

    #[test]
    fn long_series_stays_within_target() {
        let series = build_series(&raw(250), &SeriesConfig::default());
        assert!(series.points.len() <= 100);
        assert!(series.points.iter().all(|p| !p.x.is_nan() && !p.y.is_nan()));
        // First point averages the first window of time values {0, 100, 200}.
        assert!((series.points[0].x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn width_hint_is_capped_at_visible_columns() {
        let cfg = SeriesConfig::default();
        let long = build_series(&raw(250), &cfg);
        assert_eq!(long.width_hint, 10.0 * 35.0);

        let short = build_series(&raw(4), &cfg);
        assert_eq!(short.width_hint, 4.0 * 35.0);
    }

    #[test]
    fn mismatched_columns_truncate_instead_of_failing() {
        let raw = RawSeries {
            time: vec![0.0, 1.0, 2.0, 3.0, 4.0],
            amplitude: vec![10.0, 20.0, 30.0],
        };
        let series = build_series(&raw, &SeriesConfig::default());
        assert_eq!(series.points.len(), 3);
    }

    #[test]
    fn empty_raw_series_builds_an_empty_render_series() {
        let series = build_series(&RawSeries::default(), &SeriesConfig::default());
        assert!(series.points.is_empty());
        assert_eq!(series.width_hint, 0.0);
    }

    #[test]
    fn nearest_by_x_picks_the_closer_neighbor() {
        let raw = RawSeries {
            time: vec![0.0, 10.0, 20.0],
            amplitude: vec![1.0, 2.0, 3.0],
        };
        let series = build_series(&raw, &SeriesConfig::default());
        assert_eq!(series.nearest_by_x(4.0).unwrap().y, 1.0);
        assert_eq!(series.nearest_by_x(6.0).unwrap().y, 2.0);
        assert_eq!(series.nearest_by_x(-5.0).unwrap().y, 1.0);
        assert_eq!(series.nearest_by_x(99.0).unwrap().y, 3.0);
        assert!(RenderSeries::default().nearest_by_x(1.0).is_none());
    }
}
