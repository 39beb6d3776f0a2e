use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dotted,
    Dashed,
    LargeDashed,
    SparseDotted,
}

impl LineStyle {
    /// Canvas dash segments for a line of width `width`; empty means solid.
    pub fn dash_pattern(&self, width: f64) -> Vec<f64> {
        let w = width.max(1.0);
        match self {
            LineStyle::Solid => Vec::new(),
            LineStyle::Dotted => vec![w, w],
            LineStyle::Dashed => vec![2.0 * w, 2.0 * w],
            LineStyle::LargeDashed => vec![6.0 * w, 6.0 * w],
            LineStyle::SparseDotted => vec![w, 4.0 * w],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrosshairMode {
    /// Crosshair follows the pointer.
    #[default]
    Normal,
    /// Horizontal line sticks to the series value.
    Magnet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub background: String,
    pub text_color: String,
    pub font_size: f64,
    pub font_family: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLineOptions {
    pub visible: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    pub vert_lines: GridLineOptions,
    pub horz_lines: GridLineOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceScaleOptions {
    pub visible: bool,
    pub border_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeScaleOptions {
    pub border_color: String,
    pub time_visible: bool,
    pub seconds_visible: bool,
}

impl TimeScaleOptions {
    /// chrono format string for axis labels.
    pub fn label_format(&self) -> &'static str {
        match (self.time_visible, self.seconds_visible) {
            (false, _) => "%Y-%m-%d",
            (true, false) => "%Y-%m-%d %H:%M",
            (true, true) => "%Y-%m-%d %H:%M:%S",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosshairLineOptions {
    pub color: String,
    pub width: f64,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrosshairOptions {
    pub mode: CrosshairMode,
    pub vert_line: CrosshairLineOptions,
    pub horz_line: CrosshairLineOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleScrollOptions {
    pub mouse_wheel: bool,
    pub pressed_mouse_move: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisPressedMouseMove {
    pub time: bool,
    pub price: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleScaleOptions {
    pub axis_pressed_mouse_move: AxisPressedMouseMove,
    pub mouse_wheel: bool,
    /// Two-finger touch zoom around the pinch midpoint.
    pub pinch: bool,
}

/// Static look and input handling of the chart surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    /// Track the container size.
    pub auto_size: bool,
    pub layout: LayoutOptions,
    pub grid: GridOptions,
    pub left_price_scale: PriceScaleOptions,
    pub right_price_scale: PriceScaleOptions,
    pub time_scale: TimeScaleOptions,
    pub crosshair: CrosshairOptions,
    pub handle_scroll: HandleScrollOptions,
    pub handle_scale: HandleScaleOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        let crosshair_line = CrosshairLineOptions {
            color: "#3b82f6".into(),
            width: 1.0,
            style: LineStyle::Dashed,
        };
        Self {
            auto_size: true,
            layout: LayoutOptions {
                background: "#000000".into(),
                text_color: "#d1d5db".into(),
                font_size: 12.0,
                font_family: "'Inter', sans-serif".into(),
            },
            grid: GridOptions {
                vert_lines: GridLineOptions {
                    visible: false,
                    color: "rgba(255,255,255,0.1)".into(),
                },
                horz_lines: GridLineOptions {
                    visible: true,
                    color: "rgba(255,255,255,0.1)".into(),
                },
            },
            left_price_scale: PriceScaleOptions {
                visible: true,
                border_color: "#1f2937".into(),
            },
            right_price_scale: PriceScaleOptions {
                visible: false,
                border_color: "#1f2937".into(),
            },
            time_scale: TimeScaleOptions {
                border_color: "#1f2937".into(),
                time_visible: true,
                seconds_visible: false,
            },
            crosshair: CrosshairOptions {
                mode: CrosshairMode::Normal,
                vert_line: crosshair_line.clone(),
                horz_line: crosshair_line,
            },
            handle_scroll: HandleScrollOptions {
                mouse_wheel: true,
                pressed_mouse_move: true,
            },
            handle_scale: HandleScaleOptions {
                axis_pressed_mouse_move: AxisPressedMouseMove {
                    time: true,
                    price: true,
                },
                mouse_wheel: true,
                pinch: true,
            },
        }
    }
}

impl ChartOptions {
    pub fn font(&self) -> String {
        format!("{}px {}", self.layout.font_size, self.layout.font_family)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeriesOptions {
    pub color: String,
    pub line_width: f64,
    pub last_value_visible: bool,
    pub price_line_visible: bool,
    pub crosshair_marker_visible: bool,
}

impl Default for LineSeriesOptions {
    fn default() -> Self {
        Self {
            color: "#3b82f6".into(),
            line_width: 2.0,
            last_value_visible: false,
            price_line_visible: false,
            crosshair_marker_visible: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dark_theme() {
        let opts = ChartOptions::default();
        assert_eq!(opts.layout.background, "#000000");
        assert!(!opts.grid.vert_lines.visible);
        assert!(opts.left_price_scale.visible);
        assert!(!opts.right_price_scale.visible);
        assert_eq!(opts.crosshair.vert_line.style, LineStyle::Dashed);
        assert_eq!(opts.time_scale.label_format(), "%Y-%m-%d %H:%M");
        assert_eq!(opts.font(), "12px 'Inter', sans-serif");

        let series = LineSeriesOptions::default();
        assert_eq!(series.line_width, 2.0);
        assert!(!series.price_line_visible);
    }

    #[test]
    fn dash_patterns() {
        assert!(LineStyle::Solid.dash_pattern(1.0).is_empty());
        assert_eq!(LineStyle::Dashed.dash_pattern(1.0), vec![2.0, 2.0]);
        assert_eq!(LineStyle::SparseDotted.dash_pattern(0.5), vec![1.0, 4.0]);
    }
}
