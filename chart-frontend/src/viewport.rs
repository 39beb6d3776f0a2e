//! Plot geometry for the canvas surface: visible window, coordinate mapping,
//! fitting, pan and zoom. Times are seconds since epoch as `f64` so zooming
//! stays smooth below one-second resolution.

use ts_core::{SeriesPoint, Timestamp};

pub const PRICE_AXIS_WIDTH: f64 = 64.0;
pub const TIME_AXIS_HEIGHT: f64 = 28.0;

const MIN_SPAN_SECS: f64 = 60.0;
const MAX_SPAN_SECS: f64 = 200.0 * 365.0 * 86_400.0;
const SINGLE_POINT_MARGIN_SECS: f64 = 43_200.0;
const PRICE_MARGIN: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    left_axis: f64,
    right_axis: f64,
    start: f64,
    end: f64,
    y_min: f64,
    y_max: f64,
    /// Price range follows the visible points until the user scales it.
    pub auto_price: bool,
}

impl Viewport {
    pub fn new(width: f64, height: f64, left_axis: bool, right_axis: bool) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
            left_axis: if left_axis { PRICE_AXIS_WIDTH } else { 0.0 },
            right_axis: if right_axis { PRICE_AXIS_WIDTH } else { 0.0 },
            start: 0.0,
            end: 86_400.0,
            y_min: 0.0,
            y_max: 1.0,
            auto_price: true,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn plot(&self) -> Rect {
        Rect {
            x: self.left_axis,
            y: 0.0,
            width: (self.width - self.left_axis - self.right_axis).max(1.0),
            height: (self.height - TIME_AXIS_HEIGHT).max(1.0),
        }
    }

    pub fn left_axis(&self) -> Option<Rect> {
        (self.left_axis > 0.0).then(|| Rect {
            x: 0.0,
            y: 0.0,
            width: self.left_axis,
            height: self.plot().height,
        })
    }

    pub fn right_axis(&self) -> Option<Rect> {
        let plot = self.plot();
        (self.right_axis > 0.0).then(|| Rect {
            x: plot.right(),
            y: 0.0,
            width: self.right_axis,
            height: plot.height,
        })
    }

    pub fn time_axis(&self) -> Rect {
        let plot = self.plot();
        Rect {
            x: plot.x,
            y: plot.bottom(),
            width: plot.width,
            height: TIME_AXIS_HEIGHT,
        }
    }

    pub fn visible_range(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    pub fn price_range(&self) -> (f64, f64) {
        (self.y_min, self.y_max)
    }

    pub fn set_visible_range(&mut self, start: f64, end: f64) {
        if end > start {
            self.start = start;
            self.end = end;
        }
    }

    pub fn time_to_x(&self, t: f64) -> f64 {
        let plot = self.plot();
        let span = self.end - self.start;
        if span <= 0.0 {
            return plot.x;
        }
        plot.x + (t - self.start) / span * plot.width
    }

    pub fn x_to_time(&self, x: f64) -> f64 {
        let plot = self.plot();
        let ratio = ((x - plot.x) / plot.width).clamp(0.0, 1.0);
        self.start + ratio * (self.end - self.start)
    }

    pub fn price_to_y(&self, price: f64) -> f64 {
        let plot = self.plot();
        let range = (self.y_max - self.y_min).max(1e-9);
        plot.bottom() - (price - self.y_min) / range * plot.height
    }

    pub fn y_to_price(&self, y: f64) -> f64 {
        let plot = self.plot();
        let range = (self.y_max - self.y_min).max(1e-9);
        let rel = ((plot.bottom() - y) / plot.height).clamp(0.0, 1.0);
        self.y_min + rel * range
    }

    /// Show every point, with half a bar of margin on each side.
    pub fn fit(&mut self, points: &[SeriesPoint]) {
        let (Some(first), Some(last)) = (points.first(), points.last()) else {
            return;
        };
        let first = first.time as f64;
        let last = last.time as f64;
        let margin = if points.len() > 1 && last > first {
            (last - first) / (points.len() - 1) as f64 / 2.0
        } else {
            SINGLE_POINT_MARGIN_SECS
        };
        self.start = first - margin;
        self.end = last + margin;
        self.auto_price = true;
        self.autoscale(points);
    }

    /// Fit the price range to the points inside the visible window.
    pub fn autoscale(&mut self, points: &[SeriesPoint]) {
        if !self.auto_price {
            return;
        }
        let (min, max) = points
            .iter()
            .filter(|p| {
                let t = p.time as f64;
                t >= self.start && t <= self.end && p.value.is_finite()
            })
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.value), hi.max(p.value))
            });
        if !min.is_finite() || !max.is_finite() {
            return;
        }
        let span = max - min;
        let pad = if span > 0.0 {
            span * PRICE_MARGIN
        } else {
            min.abs().max(1.0) * PRICE_MARGIN
        };
        self.y_min = min - pad;
        self.y_max = max + pad;
    }

    /// Drag the window by `dx` pixels; dragging right reveals older data.
    pub fn pan_pixels(&mut self, dx: f64) {
        let plot = self.plot();
        let span = self.end - self.start;
        if span <= 0.0 {
            return;
        }
        let delta = dx * span / plot.width;
        self.start -= delta;
        self.end -= delta;
    }

    /// Scale the time window by `factor` keeping the time under `x` fixed.
    pub fn zoom_at(&mut self, x: f64, factor: f64) {
        if factor <= 0.0 || !factor.is_finite() {
            return;
        }
        let span = self.end - self.start;
        if span <= 0.0 {
            return;
        }
        let anchor = self.x_to_time(x);
        let ratio = ((anchor - self.start) / span).clamp(0.0, 1.0);
        let new_span = (span * factor).clamp(MIN_SPAN_SECS, MAX_SPAN_SECS);
        self.start = anchor - new_span * ratio;
        self.end = self.start + new_span;
    }

    /// Stretch the price range around its centre; dragging up (negative `dy`) zooms in.
    pub fn scale_price(&mut self, dy: f64) {
        let plot = self.plot();
        let factor = (1.0 + dy / plot.height).clamp(0.2, 5.0);
        let mid = (self.y_min + self.y_max) / 2.0;
        let half = (self.y_max - self.y_min) / 2.0 * factor;
        if half > 1e-9 {
            self.y_min = mid - half;
            self.y_max = mid + half;
            self.auto_price = false;
        }
    }

    /// `count` evenly spaced prices from bottom to top.
    pub fn price_ticks(&self, count: usize) -> Vec<f64> {
        if count < 2 {
            return Vec::new();
        }
        let step = (self.y_max - self.y_min) / (count as f64 - 1.0);
        (0..count).map(|i| self.y_min + step * i as f64).collect()
    }

    /// `count` evenly spaced interior times.
    pub fn time_ticks(&self, count: usize) -> Vec<Timestamp> {
        let span = self.end - self.start;
        if count == 0 || span <= 0.0 {
            return Vec::new();
        }
        let step = span / (count as f64 + 1.0);
        (1..=count)
            .map(|i| (self.start + step * i as f64).round() as Timestamp)
            .collect()
    }
}

/// Time of the point closest to `t`; ties resolve to the earlier point.
pub fn nearest_time(points: &[SeriesPoint], t: f64) -> Option<Timestamp> {
    let idx = points.partition_point(|p| (p.time as f64) < t);
    let after = points.get(idx);
    let before = idx.checked_sub(1).and_then(|i| points.get(i));
    match (before, after) {
        (Some(b), Some(a)) => {
            if t - b.time as f64 <= a.time as f64 - t {
                Some(b.time)
            } else {
                Some(a.time)
            }
        }
        (b, a) => b.or(a).map(|p| p.time),
    }
}

/// Like [`nearest_time`], but `None` once `t` is more than half a bar outside
/// the plotted range.
pub fn snap_time(points: &[SeriesPoint], t: f64) -> Option<Timestamp> {
    let (first, last) = (points.first()?, points.last()?);
    let (lo, hi) = (first.time as f64, last.time as f64);
    let half_bar = if points.len() > 1 && hi > lo {
        (hi - lo) / (points.len() - 1) as f64 / 2.0
    } else {
        SINGLE_POINT_MARGIN_SECS
    };
    if t < lo - half_bar || t > hi + half_bar {
        return None;
    }
    nearest_time(points, t)
}

/// Time-span factor for a two-finger pinch whose spread went from `previous`
/// to `current` pixels. Spreading the fingers zooms in.
pub fn pinch_factor(previous: f64, current: f64) -> Option<f64> {
    if !(previous > 0.0 && current > 0.0 && previous.is_finite() && current.is_finite()) {
        return None;
    }
    Some((previous / current).clamp(0.5, 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(values: &[(Timestamp, f64)]) -> Vec<SeriesPoint> {
        values
            .iter()
            .map(|&(time, value)| SeriesPoint { time, value })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn plot_area_leaves_room_for_axes() {
        let vp = Viewport::new(800.0, 400.0, true, false);
        let plot = vp.plot();
        assert_eq!(plot.x, PRICE_AXIS_WIDTH);
        assert_eq!(plot.width, 800.0 - PRICE_AXIS_WIDTH);
        assert_eq!(plot.height, 400.0 - TIME_AXIS_HEIGHT);
        assert!(vp.left_axis().is_some());
        assert!(vp.right_axis().is_none());
        assert_eq!(vp.time_axis().y, plot.bottom());
    }

    #[test]
    fn fit_covers_all_points_with_half_bar_margin() {
        let mut vp = Viewport::new(800.0, 400.0, true, false);
        let points = pts(&[(0, 10.0), (100, 20.0), (200, 15.0)]);
        vp.fit(&points);
        assert_eq!(vp.visible_range(), (-50.0, 250.0));
        let (lo, hi) = vp.price_range();
        assert!(approx(lo, 9.0) && approx(hi, 21.0));
        assert!(vp.time_to_x(0.0) > vp.plot().x);
        assert!(vp.time_to_x(200.0) < vp.plot().right());
    }

    #[test]
    fn fit_single_point_and_flat_prices() {
        let mut vp = Viewport::new(500.0, 300.0, true, false);
        vp.fit(&pts(&[(1000, 50.0)]));
        let (start, end) = vp.visible_range();
        assert!(start < 1000.0 && end > 1000.0);
        let (lo, hi) = vp.price_range();
        assert!(approx(lo, 45.0) && approx(hi, 55.0));

        let before = vp.clone();
        vp.fit(&[]);
        assert_eq!(vp, before);
    }

    #[test]
    fn coordinate_mapping_round_trips() {
        let mut vp = Viewport::new(600.0, 300.0, true, false);
        vp.fit(&pts(&[(0, 1.0), (1000, 2.0)]));
        let x = vp.time_to_x(400.0);
        assert!(approx(vp.x_to_time(x), 400.0));
        let y = vp.price_to_y(1.5);
        assert!(approx(vp.y_to_price(y), 1.5));
        assert!(vp.price_to_y(2.0) < vp.price_to_y(1.0));
    }

    #[test]
    fn zoom_keeps_anchor_and_pan_shifts_window() {
        let mut vp = Viewport::new(600.0, 300.0, false, false);
        vp.set_visible_range(0.0, 6000.0);
        let x = vp.time_to_x(3000.0);
        vp.zoom_at(x, 0.5);
        let (start, end) = vp.visible_range();
        assert!(approx(end - start, 3000.0));
        assert!(approx(vp.x_to_time(x), 3000.0));

        vp.zoom_at(x, 1e-9);
        let (start, end) = vp.visible_range();
        assert!(approx(end - start, MIN_SPAN_SECS));

        vp.set_visible_range(0.0, 6000.0);
        vp.pan_pixels(60.0);
        assert_eq!(vp.visible_range(), (-600.0, 5400.0));
    }

    #[test]
    fn price_scaling_disables_autoscale() {
        let mut vp = Viewport::new(600.0, 300.0, true, false);
        let points = pts(&[(0, 10.0), (10, 20.0)]);
        vp.fit(&points);
        vp.scale_price(-100.0);
        assert!(!vp.auto_price);
        let scaled = vp.price_range();
        vp.autoscale(&points);
        assert_eq!(vp.price_range(), scaled);
        vp.fit(&points);
        assert!(vp.auto_price);
    }

    #[test]
    fn ticks_are_evenly_spaced() {
        let mut vp = Viewport::new(600.0, 300.0, true, false);
        vp.set_visible_range(0.0, 400.0);
        assert_eq!(vp.time_ticks(3), vec![100, 200, 300]);
        let ticks = vp.price_ticks(3);
        assert_eq!(ticks.len(), 3);
        assert!(approx(ticks[1] - ticks[0], ticks[2] - ticks[1]));
        assert!(vp.price_ticks(1).is_empty());
    }

    #[test]
    fn nearest_time_snaps_to_closest_point() {
        let points = pts(&[(10, 1.0), (20, 2.0), (40, 4.0)]);
        assert_eq!(nearest_time(&points, 14.0), Some(10));
        assert_eq!(nearest_time(&points, 15.0), Some(10));
        assert_eq!(nearest_time(&points, 31.0), Some(40));
        assert_eq!(nearest_time(&points, -100.0), Some(10));
        assert_eq!(nearest_time(&points, 1e9), Some(40));
        assert_eq!(nearest_time(&[], 0.0), None);
    }

    #[test]
    fn snap_time_is_none_outside_plotted_range() {
        let points = pts(&[(100, 1.0), (200, 2.0), (300, 3.0)]);
        assert_eq!(snap_time(&points, 240.0), Some(200));
        assert_eq!(snap_time(&points, 60.0), Some(100));
        assert_eq!(snap_time(&points, 349.0), Some(300));
        assert_eq!(snap_time(&points, 351.0), None);
        assert_eq!(snap_time(&points, 0.0), None);
        assert_eq!(snap_time(&[], 0.0), None);
    }

    #[test]
    fn pinch_spread_zooms_in_around_the_midpoint() {
        assert_eq!(pinch_factor(100.0, 200.0), Some(0.5));
        assert_eq!(pinch_factor(150.0, 100.0), Some(1.5));
        assert_eq!(pinch_factor(100.0, 1000.0), Some(0.5));
        assert_eq!(pinch_factor(0.0, 100.0), None);
        assert_eq!(pinch_factor(100.0, f64::NAN), None);

        let mut vp = Viewport::new(600.0, 300.0, false, false);
        vp.set_visible_range(0.0, 1000.0);
        let plot = vp.plot();
        let mid = plot.x + plot.width / 2.0;
        vp.zoom_at(mid, pinch_factor(100.0, 200.0).unwrap());
        let (start, end) = vp.visible_range();
        assert!(approx(end - start, 500.0));
        assert!(approx(start, 250.0));
    }
}
