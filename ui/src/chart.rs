use std::rc::Rc;

use data_feed::CandlesResponse;
use leptos::*;

/// Container the chart surface is mounted into. Attaches once the node
/// exists, replots on every new payload and tears down with the component.
#[component]
pub fn ChartView(#[prop(into)] data: Signal<Option<Rc<CandlesResponse>>>) -> impl IntoView {
    let container = create_node_ref::<html::Div>();

    #[cfg(target_arch = "wasm32")]
    {
        use std::cell::RefCell;

        use chart_frontend::{CanvasHost, ChartAdapter, Lifecycle};
        use tracing::error;

        let adapter = Rc::new(RefCell::new(ChartAdapter::<CanvasHost>::default()));
        {
            let adapter = adapter.clone();
            create_effect(move |_| {
                let data = data.get();
                let Some(el) = container.get() else {
                    return;
                };
                let mut chart = adapter.borrow_mut();
                if chart.lifecycle() == Lifecycle::Uninitialized {
                    let div: &web_sys::HtmlDivElement = &el;
                    let host = CanvasHost::new(div.clone().into());
                    if let Err(err) = chart.attach(&host) {
                        error!(error = %err, "failed to create chart");
                        return;
                    }
                }
                chart.update(data.as_deref().map(|d| d.candles.as_slice()));
            });
        }
        on_cleanup(move || adapter.borrow_mut().detach());
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = data;

    view! { <div class="chart-container" node_ref=container></div> }
}
