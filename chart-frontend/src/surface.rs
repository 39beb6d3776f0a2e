//! The narrow contract the chart adapter needs from a drawing surface.
//!
//! Anything that can create a surface with one line series, replace its data,
//! fit the time axis, report crosshair moves and tear itself down can back the
//! adapter. The browser implementation lives in `canvas` and `tooltip`.

use thiserror::Error;
use ts_core::{SeriesPoint, Timestamp, TooltipText};

use crate::{ChartOptions, LineSeriesOptions};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("dom error: {0}")]
    Dom(String),
    #[error("invalid series data: {0}")]
    InvalidData(String),
    #[error("surface destroyed")]
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Pointer position over the surface and the plotted time it snaps to.
///
/// `point` is `None` when the pointer left the surface; `time` is `None` when
/// the pointer is outside the plotted range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CrosshairEvent {
    pub point: Option<Point>,
    pub time: Option<Timestamp>,
}

pub type CrosshairHandler = Box<dyn FnMut(&CrosshairEvent)>;

pub trait LineSeries {
    /// Replace the whole plotted content. Points must be in non-decreasing time order.
    fn set_data(&mut self, points: &[SeriesPoint]) -> Result<(), SurfaceError>;
}

pub trait ChartSurface {
    type Series: LineSeries;

    fn add_line_series(&mut self, options: &LineSeriesOptions) -> Result<Self::Series, SurfaceError>;

    /// Rescale the time axis so every plotted point is visible.
    fn fit_content(&mut self);

    fn on_crosshair_move(&mut self, handler: CrosshairHandler);

    /// Release native resources. Drops the crosshair subscription.
    fn destroy(&mut self);
}

pub trait TooltipNode {
    fn show(&self, text: &TooltipText, x: f64, y: f64);
    fn hide(&self);
    /// Detach the node from its container.
    fn remove(&self);
}

/// The container a chart is mounted into.
pub trait ChartHost {
    type Surface: ChartSurface;
    type Tooltip: TooltipNode + Clone + 'static;

    /// Create a surface sized to the container's current dimensions.
    fn create_surface(&self, options: &ChartOptions) -> Result<Self::Surface, SurfaceError>;

    /// Create a hidden tooltip node inside the container.
    fn create_tooltip(&self) -> Result<Self::Tooltip, SurfaceError>;
}
