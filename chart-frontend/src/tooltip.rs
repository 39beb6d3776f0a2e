use ts_core::TooltipText;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::surface::{SurfaceError, TooltipNode};

const STYLE: &[(&str, &str)] = &[
    ("position", "absolute"),
    ("display", "none"),
    ("background", "rgba(0,0,0,0.8)"),
    ("color", "#fff"),
    ("padding", "6px 10px"),
    ("border-radius", "6px"),
    ("font-size", "12px"),
    ("pointer-events", "none"),
    ("z-index", "1000"),
    ("white-space", "nowrap"),
];

/// Absolutely positioned `<div>` inside the chart container.
#[derive(Clone)]
pub struct DomTooltip {
    el: HtmlElement,
}

impl DomTooltip {
    pub(crate) fn append_to(container: &HtmlElement) -> Result<Self, SurfaceError> {
        let document = container
            .owner_document()
            .ok_or_else(|| SurfaceError::Dom("container has no document".into()))?;
        let el: HtmlElement = document
            .create_element("div")
            .map_err(|e| SurfaceError::Dom(format!("{e:?}")))?
            .dyn_into()
            .map_err(|_| SurfaceError::Dom("tooltip is not an html element".into()))?;
        el.set_class_name("chart-tooltip");
        let style = el.style();
        for (name, value) in STYLE {
            style
                .set_property(name, value)
                .map_err(|e| SurfaceError::Dom(format!("{e:?}")))?;
        }
        container
            .append_child(&el)
            .map_err(|e| SurfaceError::Dom(format!("{e:?}")))?;
        Ok(Self { el })
    }

    fn set(&self, name: &str, value: &str) {
        self.el.style().set_property(name, value).ok();
    }
}

impl TooltipNode for DomTooltip {
    fn show(&self, text: &TooltipText, x: f64, y: f64) {
        self.el.set_inner_html(&text.to_html());
        self.set("left", &format!("{x}px"));
        self.set("top", &format!("{y}px"));
        self.set("display", "block");
    }

    fn hide(&self) {
        self.set("display", "none");
    }

    fn remove(&self) {
        self.el.remove();
    }
}
