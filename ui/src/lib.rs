pub mod app;
pub mod chart;
pub mod data;
pub mod selector;
pub mod theme;

pub use app::{App, RootView};
pub use chart::ChartView;
pub use selector::TimeFrameSelector;

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
use leptos::*;
#[cfg(all(feature = "csr", target_arch = "wasm32"))]
use wasm_bindgen::prelude::*;

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
#[wasm_bindgen]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    leptos::mount_to_body(|| view! { <App/> });
}
