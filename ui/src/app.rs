use std::rc::Rc;

use data_feed::{FetchState, Fetcher, StockDataSource};
use leptos::*;
use ts_core::TimeFrame;

use crate::{chart::ChartView, data::use_stock_data, selector::TimeFrameSelector};

pub const PAGE_TITLE: &str = "TSLA Stock";
pub const LOAD_ERROR: &str = "Failed to load data";

/// What the root view shows for a fetch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootContent {
    ErrorAlert,
    Chart,
}

/// The alert replaces the whole page while the current key is in error,
/// even if an older payload is still cached.
pub fn root_content(state: &FetchState) -> RootContent {
    if state.is_error() {
        RootContent::ErrorAlert
    } else {
        RootContent::Chart
    }
}

#[cfg(target_arch = "wasm32")]
fn read_global(key: &str) -> Option<String> {
    use js_sys::Reflect;
    use wasm_bindgen::JsValue;

    Reflect::get(&js_sys::global(), &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_string())
}

fn api_base_default() -> String {
    #[cfg(target_arch = "wasm32")]
    {
        read_global("STOCKCHART_API_BASE").unwrap_or_else(|| data_feed::DEFAULT_BASE_URL.to_string())
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        data_feed::DEFAULT_BASE_URL.to_string()
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[component]
pub fn App() -> impl IntoView {
    let _ = api_base_default();
    view! { <div>UI available in browser build.</div> }
}

#[cfg(target_arch = "wasm32")]
#[component]
pub fn App() -> impl IntoView {
    use data_feed::{FeedConfig, GlooFetcher};
    use leptos_meta::{provide_meta_context, Style, Title};

    use crate::theme::GLOBAL_CSS;

    provide_meta_context();
    let config = FeedConfig::new().with_base_url(api_base_default());
    tracing::info!(base_url = %config.base_url, "starting");
    let source = Rc::new(StockDataSource::new(config, GlooFetcher));

    view! {
        <Style>{GLOBAL_CSS}</Style>
        <Title text=PAGE_TITLE/>
        <RootView source=source/>
    }
}

/// Owns the time-frame selection and switches between the chart and the
/// error alert.
#[component]
pub fn RootView<F: Fetcher + 'static>(source: Rc<StockDataSource<F>>) -> impl IntoView {
    let (timeframe, set_timeframe) = create_signal(TimeFrame::default());
    let data = use_stock_data(source, timeframe.into());
    let state = data.state;
    let candles = create_memo(move |_| state.with(|s| s.data.clone()));
    let content = create_memo(move |_| state.with(root_content));
    let refresh = data.refresh;

    move || match content.get() {
        RootContent::ErrorAlert => view! {
            <div class="alert alert-error" role="alert">
                <span>{LOAD_ERROR}</span>
                <button type="button" class="tf-button" on:click=move |_| refresh.call(())>
                    "Retry"
                </button>
            </div>
        }
        .into_view(),
        RootContent::Chart => view! {
            <div class="page">
                <div class="page-stack">
                    <h1 class="page-title">{PAGE_TITLE}</h1>
                    <TimeFrameSelector
                        selected=timeframe
                        on_select=move |tf| set_timeframe.set(tf)
                    />
                    <div class="chart-panel">
                        <ChartView data=candles/>
                    </div>
                </div>
            </div>
        }
        .into_view(),
    }
}
