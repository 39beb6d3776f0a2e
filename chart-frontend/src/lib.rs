//! Line chart for a single price series.
//!
//! [`ChartAdapter`] owns the chart lifecycle and hover tooltip and talks to
//! the drawing layer through the traits in [`surface`]. In the browser the
//! drawing layer is a 2D canvas ([`CanvasHost`]).

mod adapter;
mod options;
pub mod surface;
pub mod viewport;

#[cfg(target_arch = "wasm32")]
mod canvas;
#[cfg(target_arch = "wasm32")]
mod tooltip;

pub use adapter::{ChartAdapter, ChartError, Lifecycle, UpdateOutcome, TOOLTIP_OFFSET_X};
pub use options::{
    AxisPressedMouseMove, ChartOptions, CrosshairLineOptions, CrosshairMode, CrosshairOptions,
    GridLineOptions, GridOptions, HandleScaleOptions, HandleScrollOptions, LayoutOptions,
    LineSeriesOptions, LineStyle, PriceScaleOptions, TimeScaleOptions,
};
pub use surface::{ChartHost, ChartSurface, CrosshairEvent, LineSeries, SurfaceError, TooltipNode};

#[cfg(target_arch = "wasm32")]
pub use canvas::{CanvasHost, CanvasSeries, CanvasSurface};
#[cfg(target_arch = "wasm32")]
pub use tooltip::DomTooltip;
