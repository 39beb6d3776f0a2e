use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, error};
use ts_core::{to_series, Candle, PointError, SeriesPoint, TimeSeries, TooltipText};

use crate::surface::{ChartHost, ChartSurface, CrosshairEvent, LineSeries, SurfaceError, TooltipNode};
use crate::{ChartOptions, LineSeriesOptions};

/// Horizontal gap between the pointer and the tooltip's left edge.
pub const TOOLTIP_OFFSET_X: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Transform(#[from] PointError),
    #[error("chart already attached")]
    AlreadyAttached,
    #[error("chart disposed")]
    Disposed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Ready,
    Disposed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The series now holds this many points.
    Applied(usize),
    /// No candles; the previous plot is left as is.
    Skipped,
    /// Bad data; the previous plot is left as is.
    Failed(ChartError),
    /// Not attached, or already disposed.
    Ignored,
}

struct Mounted<S: ChartSurface, T> {
    surface: S,
    series: S::Series,
    tooltip: T,
    /// Last crosshair position, replayed after the data changes.
    pointer: Rc<Cell<CrosshairEvent>>,
}

enum State<S: ChartSurface, T> {
    Uninitialized,
    Ready(Mounted<S, T>),
    Disposed,
}

/// Owns one chart surface for the lifetime of a mounted view.
///
/// `attach` runs once, `update` any number of times, `detach` (or drop)
/// releases the surface and tooltip. Every entry point checks the lifecycle
/// first, so late updates after teardown are dropped.
pub struct ChartAdapter<H: ChartHost> {
    options: ChartOptions,
    series_options: LineSeriesOptions,
    state: State<H::Surface, H::Tooltip>,
    plotted: Rc<RefCell<TimeSeries<SeriesPoint>>>,
}

impl<H: ChartHost> fmt::Debug for ChartAdapter<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChartAdapter")
            .field("lifecycle", &self.lifecycle())
            .field("points", &self.plotted.borrow().len())
            .finish()
    }
}

impl<H: ChartHost> Default for ChartAdapter<H> {
    fn default() -> Self {
        Self::new(ChartOptions::default(), LineSeriesOptions::default())
    }
}

impl<H: ChartHost> ChartAdapter<H> {
    pub fn new(options: ChartOptions, series_options: LineSeriesOptions) -> Self {
        Self {
            options,
            series_options,
            state: State::Uninitialized,
            plotted: Rc::new(RefCell::new(TimeSeries::new())),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.state {
            State::Uninitialized => Lifecycle::Uninitialized,
            State::Ready(_) => Lifecycle::Ready,
            State::Disposed => Lifecycle::Disposed,
        }
    }

    /// Points currently on the surface.
    pub fn plotted(&self) -> Vec<SeriesPoint> {
        self.plotted.borrow().as_slice().to_vec()
    }

    pub fn attach(&mut self, host: &H) -> Result<(), ChartError> {
        match self.state {
            State::Ready(_) => return Err(ChartError::AlreadyAttached),
            State::Disposed => return Err(ChartError::Disposed),
            State::Uninitialized => {}
        }

        let mut surface = host.create_surface(&self.options)?;
        let series = match surface.add_line_series(&self.series_options) {
            Ok(series) => series,
            Err(err) => {
                surface.destroy();
                return Err(err.into());
            }
        };
        let tooltip = match host.create_tooltip() {
            Ok(tooltip) => tooltip,
            Err(err) => {
                surface.destroy();
                return Err(err.into());
            }
        };
        tooltip.hide();

        let pointer = Rc::new(Cell::new(CrosshairEvent::default()));
        let plotted = self.plotted.clone();
        let tip = tooltip.clone();
        let last = pointer.clone();
        surface.on_crosshair_move(Box::new(move |event| {
            last.set(*event);
            track_crosshair(&plotted.borrow(), &tip, event);
        }));

        self.state = State::Ready(Mounted {
            surface,
            series,
            tooltip,
            pointer,
        });
        debug!("chart attached");
        Ok(())
    }

    /// Plot `candles`, replacing whatever was shown before.
    pub fn update(&mut self, candles: Option<&[Candle]>) -> UpdateOutcome {
        let mounted = match &mut self.state {
            State::Ready(mounted) => mounted,
            State::Uninitialized | State::Disposed => {
                debug!("chart update ignored: not attached");
                return UpdateOutcome::Ignored;
            }
        };
        let Some(candles) = candles.filter(|c| !c.is_empty()) else {
            return UpdateOutcome::Skipped;
        };

        let points = match to_series(candles) {
            Ok(points) => points,
            Err(err) => {
                error!(error = %err, "failed to transform candles");
                return UpdateOutcome::Failed(err.into());
            }
        };
        if let Err(err) = mounted.series.set_data(&points) {
            error!(error = %err, "failed to update chart data");
            return UpdateOutcome::Failed(err.into());
        }
        mounted.surface.fit_content();

        let count = points.len();
        *self.plotted.borrow_mut() = TimeSeries::from_sorted(points);
        // A visible tooltip must describe the new data, not the old.
        track_crosshair(&self.plotted.borrow(), &mounted.tooltip, &mounted.pointer.get());
        debug!(points = count, "chart data replaced");
        UpdateOutcome::Applied(count)
    }

    /// Destroy the surface and remove the tooltip. Safe to call more than once.
    pub fn detach(&mut self) {
        if let State::Ready(mut mounted) = std::mem::replace(&mut self.state, State::Disposed) {
            mounted.surface.destroy();
            mounted.tooltip.remove();
            debug!("chart detached");
        }
        *self.plotted.borrow_mut() = TimeSeries::new();
    }
}

impl<H: ChartHost> Drop for ChartAdapter<H> {
    fn drop(&mut self) {
        self.detach();
    }
}

fn track_crosshair<T: TooltipNode>(
    plotted: &TimeSeries<SeriesPoint>,
    tooltip: &T,
    event: &CrosshairEvent,
) {
    let (Some(point), Some(time)) = (event.point, event.time) else {
        tooltip.hide();
        return;
    };
    match plotted.value_at(time) {
        Some(value) => tooltip.show(
            &TooltipText::new(time, value),
            point.x + TOOLTIP_OFFSET_X,
            point.y,
        ),
        None => tooltip.hide(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{CrosshairHandler, Point};
    use ts_core::{CandleDate, ClosePrice};

    /// Stand-in for the container: tracks appended nodes and surface calls.
    #[derive(Default)]
    struct Dom {
        nodes: Vec<&'static str>,
        handler: Option<CrosshairHandler>,
        set_data_calls: usize,
        fit_calls: usize,
        series_added: usize,
        tooltip: Option<(String, f64, f64)>,
        fail_series: bool,
    }

    type SharedDom = Rc<RefCell<Dom>>;

    struct MockHost {
        dom: SharedDom,
    }

    struct MockSurface {
        dom: SharedDom,
    }

    struct MockSeries {
        dom: SharedDom,
    }

    #[derive(Clone)]
    struct MockTooltip {
        dom: SharedDom,
    }

    impl ChartHost for MockHost {
        type Surface = MockSurface;
        type Tooltip = MockTooltip;

        fn create_surface(&self, _options: &ChartOptions) -> Result<MockSurface, SurfaceError> {
            self.dom.borrow_mut().nodes.push("canvas");
            Ok(MockSurface {
                dom: self.dom.clone(),
            })
        }

        fn create_tooltip(&self) -> Result<MockTooltip, SurfaceError> {
            self.dom.borrow_mut().nodes.push("tooltip");
            Ok(MockTooltip {
                dom: self.dom.clone(),
            })
        }
    }

    impl ChartSurface for MockSurface {
        type Series = MockSeries;

        fn add_line_series(&mut self, _options: &LineSeriesOptions) -> Result<MockSeries, SurfaceError> {
            let mut dom = self.dom.borrow_mut();
            if dom.fail_series {
                return Err(SurfaceError::Dom("series rejected".into()));
            }
            dom.series_added += 1;
            Ok(MockSeries {
                dom: self.dom.clone(),
            })
        }

        fn fit_content(&mut self) {
            self.dom.borrow_mut().fit_calls += 1;
        }

        fn on_crosshair_move(&mut self, handler: CrosshairHandler) {
            self.dom.borrow_mut().handler = Some(handler);
        }

        fn destroy(&mut self) {
            let mut dom = self.dom.borrow_mut();
            dom.handler = None;
            dom.nodes.retain(|n| *n != "canvas");
        }
    }

    impl LineSeries for MockSeries {
        fn set_data(&mut self, points: &[SeriesPoint]) -> Result<(), SurfaceError> {
            if points.iter().any(|p| !p.value.is_finite()) {
                return Err(SurfaceError::InvalidData("non-finite value".into()));
            }
            self.dom.borrow_mut().set_data_calls += 1;
            Ok(())
        }
    }

    impl TooltipNode for MockTooltip {
        fn show(&self, text: &TooltipText, x: f64, y: f64) {
            self.dom.borrow_mut().tooltip = Some((text.to_string(), x, y));
        }

        fn hide(&self) {
            self.dom.borrow_mut().tooltip = None;
        }

        fn remove(&self) {
            self.dom.borrow_mut().nodes.retain(|n| *n != "tooltip");
        }
    }

    fn setup() -> (ChartAdapter<MockHost>, MockHost, SharedDom) {
        let dom: SharedDom = Rc::default();
        let host = MockHost { dom: dom.clone() };
        (ChartAdapter::default(), host, dom)
    }

    fn candles() -> Vec<Candle> {
        vec![
            Candle::new("2024-01-01T00:00:00Z", 100.0),
            Candle {
                date: CandleDate::Text("2024-01-02T00:00:00Z".into()),
                close: ClosePrice::Text("101.5".into()),
            },
        ]
    }

    fn hover(dom: &SharedDom, event: CrosshairEvent) {
        // Take the handler out so it can borrow the dom itself.
        let handler = dom.borrow_mut().handler.take();
        if let Some(mut handler) = handler {
            handler(&event);
            dom.borrow_mut().handler = Some(handler);
        }
    }

    fn at(x: f64, y: f64, time: Option<i64>) -> CrosshairEvent {
        CrosshairEvent {
            point: Some(Point { x, y }),
            time,
        }
    }

    #[test]
    fn attach_creates_surface_series_and_hidden_tooltip() {
        let (mut chart, host, dom) = setup();
        assert_eq!(chart.lifecycle(), Lifecycle::Uninitialized);
        chart.attach(&host).unwrap();
        assert_eq!(chart.lifecycle(), Lifecycle::Ready);
        let dom = dom.borrow();
        assert_eq!(dom.nodes, vec!["canvas", "tooltip"]);
        assert_eq!(dom.series_added, 1);
        assert!(dom.handler.is_some());
        assert!(dom.tooltip.is_none());
    }

    #[test]
    fn second_attach_is_rejected() {
        let (mut chart, host, dom) = setup();
        chart.attach(&host).unwrap();
        assert_eq!(chart.attach(&host), Err(ChartError::AlreadyAttached));
        assert_eq!(dom.borrow().nodes.len(), 2);
        chart.detach();
        assert_eq!(chart.attach(&host), Err(ChartError::Disposed));
        assert!(dom.borrow().nodes.is_empty());
    }

    #[test]
    fn failed_attach_releases_partial_surface() {
        let (mut chart, host, dom) = setup();
        dom.borrow_mut().fail_series = true;
        assert!(matches!(chart.attach(&host), Err(ChartError::Surface(_))));
        assert_eq!(chart.lifecycle(), Lifecycle::Uninitialized);
        assert!(dom.borrow().nodes.is_empty());
    }

    #[test]
    fn update_replaces_series_and_fits() {
        let (mut chart, host, dom) = setup();
        chart.attach(&host).unwrap();
        let data = candles();
        assert_eq!(chart.update(Some(data.as_slice())), UpdateOutcome::Applied(2));
        assert_eq!(
            chart.plotted(),
            vec![
                SeriesPoint { time: 1704067200, value: 100.0 },
                SeriesPoint { time: 1704153600, value: 101.5 },
            ]
        );
        let newer = vec![Candle::new("2024-02-01T00:00:00Z", 200.0)];
        assert_eq!(chart.update(Some(newer.as_slice())), UpdateOutcome::Applied(1));
        assert_eq!(chart.plotted().len(), 1);
        let dom = dom.borrow();
        assert_eq!(dom.set_data_calls, 2);
        assert_eq!(dom.fit_calls, 2);
    }

    #[test]
    fn empty_or_missing_candles_leave_plot_untouched() {
        let (mut chart, host, dom) = setup();
        chart.attach(&host).unwrap();
        chart.update(Some(candles().as_slice()));
        let before = chart.plotted();

        assert_eq!(chart.update(Some(&[][..])), UpdateOutcome::Skipped);
        assert_eq!(chart.update(None), UpdateOutcome::Skipped);
        assert_eq!(chart.plotted(), before);
        assert_eq!(dom.borrow().set_data_calls, 1);
    }

    #[test]
    fn bad_data_is_contained_and_previous_plot_kept() {
        let (mut chart, host, dom) = setup();
        chart.attach(&host).unwrap();
        chart.update(Some(candles().as_slice()));
        let before = chart.plotted();

        let bad_close = vec![Candle {
            date: CandleDate::Text("2024-03-01T00:00:00Z".into()),
            close: ClosePrice::Text("abc".into()),
        }];
        assert!(matches!(
            chart.update(Some(bad_close.as_slice())),
            UpdateOutcome::Failed(ChartError::Transform(_))
        ));

        let rejected = vec![Candle::new("2024-03-01T00:00:00Z", f64::NAN)];
        assert!(matches!(
            chart.update(Some(rejected.as_slice())),
            UpdateOutcome::Failed(ChartError::Surface(SurfaceError::InvalidData(_)))
        ));

        assert_eq!(chart.plotted(), before);
        assert_eq!(chart.lifecycle(), Lifecycle::Ready);
        assert_eq!(dom.borrow().fit_calls, 1);

        // Hover lookups still use the last good data.
        hover(&dom, at(10.0, 20.0, Some(1704067200)));
        assert!(dom.borrow().tooltip.is_some());
    }

    #[test]
    fn bad_candle_from_the_wire_fails_only_the_update() {
        let (mut chart, host, dom) = setup();
        chart.attach(&host).unwrap();
        chart.update(Some(candles().as_slice()));
        let before = chart.plotted();

        // Null or missing close as decoded from the API.
        let missing_close = vec![
            Candle::new("2024-03-01T00:00:00Z", 1.0),
            Candle {
                date: CandleDate::Text("2024-03-02T00:00:00Z".into()),
                close: ClosePrice::default(),
            },
        ];
        assert!(matches!(
            chart.update(Some(missing_close.as_slice())),
            UpdateOutcome::Failed(ChartError::Transform(PointError::InvalidClose(_)))
        ));
        let missing_date = vec![Candle {
            date: CandleDate::default(),
            close: ClosePrice::Number(1.0),
        }];
        assert!(matches!(
            chart.update(Some(missing_date.as_slice())),
            UpdateOutcome::Failed(ChartError::Transform(PointError::InvalidDate(_)))
        ));

        assert_eq!(chart.plotted(), before);
        assert_eq!(chart.lifecycle(), Lifecycle::Ready);
        assert_eq!(dom.borrow().set_data_calls, 1);
    }

    #[test]
    fn visible_tooltip_follows_replaced_data() {
        let (mut chart, host, dom) = setup();
        chart.attach(&host).unwrap();
        chart.update(Some(candles().as_slice()));

        hover(&dom, at(120.0, 40.0, Some(1704153600)));
        assert!(dom.borrow().tooltip.clone().unwrap().0.contains("101.50"));

        let repriced = vec![Candle::new("2024-01-02T00:00:00Z", 250.0)];
        assert_eq!(chart.update(Some(repriced.as_slice())), UpdateOutcome::Applied(1));
        let (text, x, _) = dom.borrow().tooltip.clone().unwrap();
        assert!(text.contains("250.00"));
        assert_eq!(x, 120.0 + TOOLTIP_OFFSET_X);

        let elsewhere = vec![Candle::new("2024-05-01T00:00:00Z", 9.0)];
        assert_eq!(chart.update(Some(elsewhere.as_slice())), UpdateOutcome::Applied(1));
        assert!(dom.borrow().tooltip.is_none());
    }

    #[test]
    fn hover_shows_utc_time_and_two_decimal_price() {
        let (mut chart, host, dom) = setup();
        chart.attach(&host).unwrap();
        chart.update(Some(candles().as_slice()));

        hover(&dom, at(120.0, 40.0, Some(1704153600)));
        let (text, x, y) = dom.borrow().tooltip.clone().unwrap();
        assert!(text.contains("2024-01-02 00:00:00 UTC"));
        assert!(text.contains("101.50"));
        assert_eq!((x, y), (120.0 + TOOLTIP_OFFSET_X, 40.0));

        hover(&dom, at(500.0, 40.0, Some(1800000000)));
        assert!(dom.borrow().tooltip.is_none());

        hover(&dom, at(120.0, 40.0, Some(1704153600)));
        hover(&dom, at(-5.0, 40.0, None));
        assert!(dom.borrow().tooltip.is_none());

        hover(&dom, at(120.0, 40.0, Some(1704153600)));
        hover(&dom, CrosshairEvent::default());
        assert!(dom.borrow().tooltip.is_none());
    }

    #[test]
    fn detach_leaves_no_nodes_and_ignores_later_updates() {
        let (mut chart, host, dom) = setup();
        chart.attach(&host).unwrap();
        chart.update(Some(candles().as_slice()));
        chart.detach();

        assert_eq!(chart.lifecycle(), Lifecycle::Disposed);
        assert!(dom.borrow().nodes.is_empty());
        assert!(dom.borrow().handler.is_none());
        assert_eq!(chart.update(Some(candles().as_slice())), UpdateOutcome::Ignored);
        assert_eq!(dom.borrow().set_data_calls, 1);
        assert!(chart.plotted().is_empty());

        chart.detach();
        assert_eq!(chart.lifecycle(), Lifecycle::Disposed);
    }

    #[test]
    fn update_before_attach_is_ignored() {
        let (mut chart, _host, dom) = setup();
        assert_eq!(chart.update(Some(candles().as_slice())), UpdateOutcome::Ignored);
        assert_eq!(dom.borrow().set_data_calls, 0);
    }

    #[test]
    fn dropping_a_ready_adapter_tears_down() {
        let (mut chart, host, dom) = setup();
        chart.attach(&host).unwrap();
        drop(chart);
        assert!(dom.borrow().nodes.is_empty());
    }
}
