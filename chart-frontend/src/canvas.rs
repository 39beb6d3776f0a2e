//! 2D canvas implementation of the chart surface.
//!
//! One `<canvas>` is appended to the host container. Pointer input drives the
//! crosshair, panning, wheel and pinch zoom and axis scaling; every change redraws the
//! whole frame.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::DateTime;
use js_sys::Array;
use tracing::{debug, warn};
use ts_core::SeriesPoint;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement,
    HtmlElement, MouseEvent, TouchEvent, WheelEvent,
};

use crate::options::{CrosshairLineOptions, CrosshairMode, LineStyle};
use crate::surface::{
    ChartHost, ChartSurface, CrosshairEvent, CrosshairHandler, LineSeries, Point, SurfaceError,
};
use crate::tooltip::DomTooltip;
use crate::viewport::{pinch_factor, snap_time, Viewport};
use crate::{ChartOptions, LineSeriesOptions};

const PRICE_TICKS: usize = 6;
const TIME_TICKS: usize = 5;
const WHEEL_ZOOM_STEP: f64 = 1.1;

fn dom_err(err: JsValue) -> SurfaceError {
    SurfaceError::Dom(format!("{err:?}"))
}

/// The element a chart is mounted into. It should be positioned so the
/// absolutely placed tooltip lines up with the canvas.
#[derive(Clone)]
pub struct CanvasHost {
    container: HtmlElement,
}

impl CanvasHost {
    pub fn new(container: HtmlElement) -> Self {
        Self { container }
    }
}

impl ChartHost for CanvasHost {
    type Surface = CanvasSurface;
    type Tooltip = DomTooltip;

    fn create_surface(&self, options: &ChartOptions) -> Result<CanvasSurface, SurfaceError> {
        let document = self
            .container
            .owner_document()
            .ok_or_else(|| SurfaceError::Dom("container has no document".into()))?;
        let canvas: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(dom_err)?
            .dyn_into()
            .map_err(|_| SurfaceError::Dom("element is not a canvas".into()))?;
        let style = canvas.style();
        style.set_property("display", "block").map_err(dom_err)?;
        style.set_property("width", "100%").map_err(dom_err)?;
        style.set_property("height", "100%").map_err(dom_err)?;

        let ctx = canvas
            .get_context("2d")
            .map_err(dom_err)?
            .ok_or_else(|| SurfaceError::Dom("no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SurfaceError::Dom("no 2d context".into()))?;

        self.container.append_child(&canvas).map_err(dom_err)?;

        let rect = self.container.get_bounding_client_rect();
        let viewport = Viewport::new(
            rect.width().max(1.0),
            rect.height().max(1.0),
            options.left_price_scale.visible,
            options.right_price_scale.visible,
        );
        let state = Rc::new(RefCell::new(SurfaceState {
            container: self.container.clone(),
            canvas: canvas.clone(),
            ctx,
            options: options.clone(),
            viewport,
            series: None,
            pointer: None,
            drag: None,
            pinch: None,
            handler: None,
            destroyed: false,
        }));
        state.borrow_mut().resize_to_container();

        let mut surface = CanvasSurface {
            state,
            listeners: Vec::new(),
        };
        if let Err(err) = surface.install_listeners(&canvas) {
            surface.destroy();
            return Err(err);
        }
        debug!(
            width = rect.width(),
            height = rect.height(),
            "canvas surface created"
        );
        Ok(surface)
    }

    fn create_tooltip(&self) -> Result<DomTooltip, SurfaceError> {
        DomTooltip::append_to(&self.container)
    }
}

#[derive(Debug, Clone, Copy)]
enum Drag {
    Pan { last_x: f64 },
    PriceAxis { last_y: f64 },
    TimeAxis { last_x: f64 },
}

struct PlottedSeries {
    options: LineSeriesOptions,
    points: Vec<SeriesPoint>,
}

struct SurfaceState {
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    options: ChartOptions,
    viewport: Viewport,
    series: Option<PlottedSeries>,
    pointer: Option<Point>,
    drag: Option<Drag>,
    /// Finger spread of an ongoing two-finger pinch.
    pinch: Option<f64>,
    handler: Option<CrosshairHandler>,
    destroyed: bool,
}

impl SurfaceState {
    fn points(&self) -> &[SeriesPoint] {
        self.series.as_ref().map(|s| s.points.as_slice()).unwrap_or(&[])
    }

    fn autoscale(&mut self) {
        let points = self.series.as_ref().map(|s| s.points.as_slice()).unwrap_or(&[]);
        self.viewport.autoscale(points);
    }

    fn resize_to_container(&mut self) {
        let rect = self.container.get_bounding_client_rect();
        let width = rect.width().max(1.0);
        let height = rect.height().max(1.0);
        self.canvas.set_width(width as u32);
        self.canvas.set_height(height as u32);
        self.viewport.resize(width, height);
        self.render();
    }

    fn crosshair_event(&self) -> CrosshairEvent {
        let Some(point) = self.pointer else {
            return CrosshairEvent::default();
        };
        if !self.viewport.plot().contains(point.x, point.y) {
            return CrosshairEvent::default();
        }
        let time = snap_time(self.points(), self.viewport.x_to_time(point.x));
        CrosshairEvent {
            point: Some(point),
            time,
        }
    }

    fn on_mouse_down(&mut self, x: f64, y: f64) {
        let scroll = self.options.handle_scroll;
        let scale = self.options.handle_scale.axis_pressed_mouse_move;
        let on_price_axis = [self.viewport.left_axis(), self.viewport.right_axis()]
            .into_iter()
            .flatten()
            .any(|r| r.contains(x, y));

        self.drag = if self.viewport.plot().contains(x, y) && scroll.pressed_mouse_move {
            Some(Drag::Pan { last_x: x })
        } else if on_price_axis && scale.price {
            Some(Drag::PriceAxis { last_y: y })
        } else if self.viewport.time_axis().contains(x, y) && scale.time {
            Some(Drag::TimeAxis { last_x: x })
        } else {
            None
        };
    }

    fn on_mouse_move(&mut self, x: f64, y: f64) {
        self.pointer = Some(Point { x, y });
        match self.drag {
            Some(Drag::Pan { last_x }) => {
                self.viewport.pan_pixels(x - last_x);
                self.autoscale();
                self.drag = Some(Drag::Pan { last_x: x });
            }
            Some(Drag::PriceAxis { last_y }) => {
                self.viewport.scale_price(y - last_y);
                self.drag = Some(Drag::PriceAxis { last_y: y });
            }
            Some(Drag::TimeAxis { last_x }) => {
                let plot = self.viewport.plot();
                let factor = (1.0 - (x - last_x) / plot.width).clamp(0.5, 2.0);
                self.viewport.zoom_at(plot.x + plot.width / 2.0, factor);
                self.drag = Some(Drag::TimeAxis { last_x: x });
            }
            None => {}
        }
        self.render();
    }

    fn on_wheel(&mut self, delta_x: f64, delta_y: f64, x: f64) -> bool {
        if self.options.handle_scale.mouse_wheel && delta_y != 0.0 {
            let factor = if delta_y > 0.0 {
                WHEEL_ZOOM_STEP
            } else {
                1.0 / WHEEL_ZOOM_STEP
            };
            self.viewport.zoom_at(x, factor);
        } else if self.options.handle_scroll.mouse_wheel && delta_x != 0.0 {
            self.viewport.pan_pixels(-delta_x);
        } else {
            return false;
        }
        self.autoscale();
        self.render();
        true
    }

    fn on_pinch_start(&mut self, spread: f64) -> bool {
        if !self.options.handle_scale.pinch {
            return false;
        }
        self.drag = None;
        self.pinch = Some(spread);
        true
    }

    fn on_pinch_move(&mut self, spread: f64, mid_x: f64) -> bool {
        let Some(previous) = self.pinch else {
            return false;
        };
        if let Some(factor) = pinch_factor(previous, spread) {
            self.viewport.zoom_at(mid_x, factor);
            self.autoscale();
            self.render();
        }
        self.pinch = Some(spread);
        true
    }

    fn reset_price_scale(&mut self) {
        self.viewport.auto_price = true;
        self.autoscale();
        self.render();
    }

    fn render(&self) {
        if self.destroyed {
            return;
        }
        let ctx = &self.ctx;
        let (width, height) = self.viewport.size();
        let plot = self.viewport.plot();
        let price_ticks = self.viewport.price_ticks(PRICE_TICKS);
        let time_ticks = self.viewport.time_ticks(TIME_TICKS);

        ctx.set_fill_style_str(&self.options.layout.background);
        ctx.fill_rect(0.0, 0.0, width, height);

        // Grid
        ctx.set_line_width(1.0);
        let grid = &self.options.grid;
        if grid.horz_lines.visible {
            ctx.set_stroke_style_str(&grid.horz_lines.color);
            ctx.begin_path();
            for p in &price_ticks {
                let y = self.viewport.price_to_y(*p).round() + 0.5;
                ctx.move_to(plot.x, y);
                ctx.line_to(plot.right(), y);
            }
            ctx.stroke();
        }
        if grid.vert_lines.visible {
            ctx.set_stroke_style_str(&grid.vert_lines.color);
            ctx.begin_path();
            for t in &time_ticks {
                let x = self.viewport.time_to_x(*t as f64).round() + 0.5;
                ctx.move_to(x, plot.y);
                ctx.line_to(x, plot.bottom());
            }
            ctx.stroke();
        }

        ctx.save();
        ctx.begin_path();
        ctx.rect(plot.x, plot.y, plot.width, plot.height);
        ctx.clip();
        if let Some(series) = &self.series {
            self.draw_series(series);
        }
        self.draw_crosshair_lines();
        ctx.restore();

        self.draw_axes(&price_ticks, &time_ticks);
        self.draw_crosshair_labels();
    }

    fn draw_series(&self, series: &PlottedSeries) {
        let ctx = &self.ctx;
        let opts = &series.options;
        if series.points.len() > 1 {
            ctx.set_stroke_style_str(&opts.color);
            ctx.set_line_width(opts.line_width);
            ctx.set_line_join("round");
            ctx.begin_path();
            for (i, p) in series.points.iter().enumerate() {
                let x = self.viewport.time_to_x(p.time as f64);
                let y = self.viewport.price_to_y(p.value);
                if i == 0 {
                    ctx.move_to(x, y);
                } else {
                    ctx.line_to(x, y);
                }
            }
            ctx.stroke();
        } else if let Some(p) = series.points.first() {
            self.dot(p.time as f64, p.value, opts.line_width + 1.0, &opts.color);
        }

        if opts.price_line_visible {
            if let Some(last) = series.points.last() {
                let y = self.viewport.price_to_y(last.value);
                set_dash(ctx, LineStyle::Dotted, 1.0);
                ctx.set_stroke_style_str(&opts.color);
                ctx.set_line_width(1.0);
                ctx.begin_path();
                ctx.move_to(self.viewport.plot().x, y);
                ctx.line_to(self.viewport.plot().right(), y);
                ctx.stroke();
                set_dash(ctx, LineStyle::Solid, 1.0);
            }
        }
    }

    fn dot(&self, t: f64, price: f64, radius: f64, color: &str) {
        let ctx = &self.ctx;
        ctx.set_fill_style_str(color);
        ctx.begin_path();
        ctx.arc(
            self.viewport.time_to_x(t),
            self.viewport.price_to_y(price),
            radius,
            0.0,
            std::f64::consts::PI * 2.0,
        )
        .ok();
        ctx.fill();
    }

    /// Crosshair position after applying magnet mode.
    fn crosshair_at(&self) -> Option<(f64, f64, Option<SeriesPoint>)> {
        let event = self.crosshair_event();
        let point = event.point?;
        let snapped = event
            .time
            .and_then(|t| self.points().iter().find(|p| p.time == t).copied());
        let x = match snapped {
            Some(p) => self.viewport.time_to_x(p.time as f64),
            None => point.x,
        };
        let y = match (self.options.crosshair.mode, snapped) {
            (CrosshairMode::Magnet, Some(p)) => self.viewport.price_to_y(p.value),
            _ => point.y,
        };
        Some((x, y, snapped))
    }

    fn draw_crosshair_lines(&self) {
        let Some((x, y, snapped)) = self.crosshair_at() else {
            return;
        };
        let ctx = &self.ctx;
        let plot = self.viewport.plot();
        let crosshair = &self.options.crosshair;

        stroke_line(ctx, &crosshair.vert_line, (x, plot.y), (x, plot.bottom()));
        stroke_line(ctx, &crosshair.horz_line, (plot.x, y), (plot.right(), y));

        if let (Some(series), Some(p)) = (&self.series, snapped) {
            if series.options.crosshair_marker_visible {
                self.dot(p.time as f64, p.value, 4.0, &series.options.color);
            }
        }
    }

    fn draw_axes(&self, price_ticks: &[f64], time_ticks: &[i64]) {
        let ctx = &self.ctx;
        let layout = &self.options.layout;
        let plot = self.viewport.plot();
        ctx.set_font(&self.options.font());
        ctx.set_line_width(1.0);

        let axes = [
            (self.viewport.left_axis(), &self.options.left_price_scale, true),
            (self.viewport.right_axis(), &self.options.right_price_scale, false),
        ];
        for (rect, scale, is_left) in axes {
            let Some(rect) = rect else { continue };
            let edge = if is_left { rect.right() - 0.5 } else { rect.x + 0.5 };
            ctx.set_stroke_style_str(&scale.border_color);
            ctx.begin_path();
            ctx.move_to(edge, rect.y);
            ctx.line_to(edge, rect.bottom());
            ctx.stroke();

            ctx.set_fill_style_str(&layout.text_color);
            ctx.set_text_baseline("middle");
            ctx.set_text_align(if is_left { "right" } else { "left" });
            let text_x = if is_left { rect.right() - 6.0 } else { rect.x + 6.0 };
            for p in price_ticks {
                let y = self.viewport.price_to_y(*p);
                ctx.fill_text(&format!("{p:.2}"), text_x, y).ok();
            }

            if let Some(series) = &self.series {
                if series.options.last_value_visible {
                    if let Some(last) = series.points.last() {
                        let y = self.viewport.price_to_y(last.value);
                        ctx.set_fill_style_str(&series.options.color);
                        ctx.fill_rect(rect.x, y - 9.0, rect.width, 18.0);
                        ctx.set_fill_style_str("#ffffff");
                        ctx.fill_text(&format!("{:.2}", last.value), text_x, y).ok();
                    }
                }
            }
        }

        let axis = self.viewport.time_axis();
        ctx.set_stroke_style_str(&self.options.time_scale.border_color);
        ctx.begin_path();
        ctx.move_to(plot.x, axis.y + 0.5);
        ctx.line_to(plot.right(), axis.y + 0.5);
        ctx.stroke();

        ctx.set_fill_style_str(&layout.text_color);
        ctx.set_text_baseline("middle");
        ctx.set_text_align("center");
        let fmt = self.options.time_scale.label_format();
        for t in time_ticks {
            let x = self.viewport.time_to_x(*t as f64);
            if let Some(label) = format_time(*t, fmt) {
                ctx.fill_text(&label, x, axis.y + axis.height / 2.0).ok();
            }
        }
    }

    fn draw_crosshair_labels(&self) {
        let Some((x, y, snapped)) = self.crosshair_at() else {
            return;
        };
        let ctx = &self.ctx;
        let label_bg = &self.options.crosshair.horz_line.color;
        ctx.set_font(&self.options.font());
        ctx.set_text_baseline("middle");
        ctx.set_text_align("center");

        let price = self.viewport.y_to_price(y);
        for rect in [self.viewport.left_axis(), self.viewport.right_axis()]
            .into_iter()
            .flatten()
        {
            ctx.set_fill_style_str(label_bg);
            ctx.fill_rect(rect.x, y - 9.0, rect.width, 18.0);
            ctx.set_fill_style_str("#ffffff");
            ctx.fill_text(&format!("{price:.2}"), rect.x + rect.width / 2.0, y)
                .ok();
        }

        let t = snapped
            .map(|p| p.time)
            .unwrap_or_else(|| self.viewport.x_to_time(x).round() as i64);
        if let Some(label) = format_time(t, self.options.time_scale.label_format()) {
            let axis = self.viewport.time_axis();
            let w = ctx
                .measure_text(&label)
                .map(|m| m.width())
                .unwrap_or(label.len() as f64 * 7.0)
                + 12.0;
            ctx.set_fill_style_str(&self.options.crosshair.vert_line.color);
            ctx.fill_rect(x - w / 2.0, axis.y + 2.0, w, axis.height - 4.0);
            ctx.set_fill_style_str("#ffffff");
            ctx.fill_text(&label, x, axis.y + axis.height / 2.0).ok();
        }
    }
}

fn set_dash(ctx: &CanvasRenderingContext2d, style: LineStyle, width: f64) {
    let segments = Array::new();
    for s in style.dash_pattern(width) {
        segments.push(&JsValue::from_f64(s));
    }
    ctx.set_line_dash(&segments).ok();
}

fn stroke_line(
    ctx: &CanvasRenderingContext2d,
    line: &CrosshairLineOptions,
    from: (f64, f64),
    to: (f64, f64),
) {
    ctx.set_stroke_style_str(&line.color);
    ctx.set_line_width(line.width);
    set_dash(ctx, line.style, line.width);
    ctx.begin_path();
    ctx.move_to(from.0, from.1);
    ctx.line_to(to.0, to.1);
    ctx.stroke();
    set_dash(ctx, LineStyle::Solid, line.width);
}

fn format_time(secs: i64, fmt: &str) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format(fmt).to_string())
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

pub struct CanvasSurface {
    state: Rc<RefCell<SurfaceState>>,
    listeners: Vec<Listener>,
}

impl CanvasSurface {
    fn listen(
        &mut self,
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), SurfaceError> {
        let closure = Closure::<dyn FnMut(Event)>::wrap(Box::new(handler));
        let opts = AddEventListenerOptions::new();
        opts.set_passive(passive);
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind,
                closure.as_ref().unchecked_ref(),
                &opts,
            )
            .map_err(dom_err)?;
        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    fn install_listeners(&mut self, canvas: &HtmlCanvasElement) -> Result<(), SurfaceError> {
        let window = web_sys::window().ok_or_else(|| SurfaceError::Dom("no window".into()))?;
        let canvas_target: EventTarget = canvas.clone().into();
        let window_target: EventTarget = window.into();

        // mousemove
        {
            let state = self.state.clone();
            let canvas = canvas.clone();
            self.listen(&canvas_target, "mousemove", true, move |event| {
                let event = event.unchecked_into::<MouseEvent>();
                let rect = canvas.get_bounding_client_rect();
                let x = event.client_x() as f64 - rect.left();
                let y = event.client_y() as f64 - rect.top();
                state.borrow_mut().on_mouse_move(x, y);
                notify_crosshair(&state);
            })?;
        }

        // mouseleave
        {
            let state = self.state.clone();
            self.listen(&canvas_target, "mouseleave", true, move |_| {
                {
                    let mut s = state.borrow_mut();
                    s.pointer = None;
                    s.render();
                }
                notify_crosshair(&state);
            })?;
        }

        // mousedown
        {
            let state = self.state.clone();
            let canvas = canvas.clone();
            self.listen(&canvas_target, "mousedown", false, move |event| {
                let event = event.unchecked_into::<MouseEvent>();
                if event.button() != 0 {
                    return;
                }
                event.prevent_default();
                let rect = canvas.get_bounding_client_rect();
                let x = event.client_x() as f64 - rect.left();
                let y = event.client_y() as f64 - rect.top();
                state.borrow_mut().on_mouse_down(x, y);
            })?;
        }

        // mouseup anywhere ends a drag
        {
            let state = self.state.clone();
            self.listen(&window_target, "mouseup", true, move |_| {
                state.borrow_mut().drag = None;
            })?;
        }

        // dblclick on a price axis restores autoscale
        {
            let state = self.state.clone();
            let canvas = canvas.clone();
            self.listen(&canvas_target, "dblclick", true, move |event| {
                let event = event.unchecked_into::<MouseEvent>();
                let rect = canvas.get_bounding_client_rect();
                let x = event.client_x() as f64 - rect.left();
                let y = event.client_y() as f64 - rect.top();
                let mut s = state.borrow_mut();
                let on_axis = [s.viewport.left_axis(), s.viewport.right_axis()]
                    .into_iter()
                    .flatten()
                    .any(|r| r.contains(x, y));
                if on_axis {
                    s.reset_price_scale();
                }
            })?;
        }

        // wheel
        {
            let state = self.state.clone();
            let canvas = canvas.clone();
            self.listen(&canvas_target, "wheel", false, move |event| {
                let event = event.unchecked_into::<WheelEvent>();
                let rect = canvas.get_bounding_client_rect();
                let x = event.client_x() as f64 - rect.left();
                if state.borrow_mut().on_wheel(event.delta_x(), event.delta_y(), x) {
                    event.prevent_default();
                }
            })?;
        }

        // two-finger pinch
        {
            let state = self.state.clone();
            let canvas = canvas.clone();
            self.listen(&canvas_target, "touchstart", false, move |event| {
                let event = event.unchecked_into::<TouchEvent>();
                if let Some((spread, _)) = two_touches(&event, &canvas) {
                    if state.borrow_mut().on_pinch_start(spread) {
                        event.prevent_default();
                    }
                }
            })?;
        }
        {
            let state = self.state.clone();
            let canvas = canvas.clone();
            self.listen(&canvas_target, "touchmove", false, move |event| {
                let event = event.unchecked_into::<TouchEvent>();
                if let Some((spread, mid_x)) = two_touches(&event, &canvas) {
                    if state.borrow_mut().on_pinch_move(spread, mid_x) {
                        event.prevent_default();
                    }
                }
            })?;
        }
        for kind in ["touchend", "touchcancel"] {
            let state = self.state.clone();
            self.listen(&canvas_target, kind, true, move |event| {
                let event = event.unchecked_into::<TouchEvent>();
                if event.touches().length() < 2 {
                    state.borrow_mut().pinch = None;
                }
            })?;
        }

        if self.state.borrow().options.auto_size {
            let state = self.state.clone();
            self.listen(&window_target, "resize", true, move |_| {
                state.borrow_mut().resize_to_container();
            })?;
        }

        Ok(())
    }
}

/// Spread and horizontal midpoint (canvas pixels) of exactly two touches.
fn two_touches(event: &TouchEvent, canvas: &HtmlCanvasElement) -> Option<(f64, f64)> {
    let touches = event.touches();
    if touches.length() != 2 {
        return None;
    }
    let (a, b) = (touches.get(0)?, touches.get(1)?);
    let dx = (a.client_x() - b.client_x()) as f64;
    let dy = (a.client_y() - b.client_y()) as f64;
    let rect = canvas.get_bounding_client_rect();
    let mid_x = (a.client_x() + b.client_x()) as f64 / 2.0 - rect.left();
    Some((dx.hypot(dy), mid_x))
}

/// Hand the current crosshair to the subscriber without holding the state borrow.
fn notify_crosshair(state: &Rc<RefCell<SurfaceState>>) {
    let (event, handler) = {
        let mut s = state.borrow_mut();
        (s.crosshair_event(), s.handler.take())
    };
    if let Some(mut handler) = handler {
        handler(&event);
        let mut s = state.borrow_mut();
        if !s.destroyed && s.handler.is_none() {
            s.handler = Some(handler);
        }
    }
}

impl ChartSurface for CanvasSurface {
    type Series = CanvasSeries;

    fn add_line_series(&mut self, options: &LineSeriesOptions) -> Result<CanvasSeries, SurfaceError> {
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            return Err(SurfaceError::Destroyed);
        }
        state.series = Some(PlottedSeries {
            options: options.clone(),
            points: Vec::new(),
        });
        Ok(CanvasSeries {
            state: self.state.clone(),
        })
    }

    fn fit_content(&mut self) {
        let mut state = self.state.borrow_mut();
        let points = state.points().to_vec();
        state.viewport.fit(&points);
        state.render();
    }

    fn on_crosshair_move(&mut self, handler: CrosshairHandler) {
        let mut state = self.state.borrow_mut();
        if !state.destroyed {
            state.handler = Some(handler);
        }
    }

    fn destroy(&mut self) {
        for l in self.listeners.drain(..) {
            if let Err(err) = l
                .target
                .remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref())
            {
                warn!(kind = l.kind, error = ?err, "failed to remove listener");
            }
        }
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            return;
        }
        state.destroyed = true;
        state.handler = None;
        state.series = None;
        state.canvas.remove();
        debug!("canvas surface destroyed");
    }
}

impl Drop for CanvasSurface {
    fn drop(&mut self) {
        self.destroy();
    }
}

pub struct CanvasSeries {
    state: Rc<RefCell<SurfaceState>>,
}

impl LineSeries for CanvasSeries {
    fn set_data(&mut self, points: &[SeriesPoint]) -> Result<(), SurfaceError> {
        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(SurfaceError::InvalidData(format!(
                "non-finite value at {}",
                bad.time
            )));
        }
        if points.windows(2).any(|w| w[1].time < w[0].time) {
            return Err(SurfaceError::InvalidData("points out of order".into()));
        }
        let mut state = self.state.borrow_mut();
        if state.destroyed {
            return Err(SurfaceError::Destroyed);
        }
        let series = state.series.as_mut().ok_or(SurfaceError::Destroyed)?;
        series.points = points.to_vec();
        state.autoscale();
        state.render();
        Ok(())
    }
}
