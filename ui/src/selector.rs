use leptos::*;
use ts_core::TimeFrame;

fn button_class(active: bool) -> &'static str {
    if active {
        "tf-button active"
    } else {
        "tf-button"
    }
}

/// One toggle button per time-frame. Holds no state: the caller owns the
/// selection and is told about clicks through `on_select`.
#[component]
pub fn TimeFrameSelector(
    #[prop(into)] selected: Signal<TimeFrame>,
    #[prop(into)] on_select: Callback<TimeFrame>,
) -> impl IntoView {
    view! {
        <div class="tf-group" role="group" aria-label="Time frame">
            {TimeFrame::ALL
                .iter()
                .copied()
                .map(|tf| {
                    let active = move || selected.get() == tf;
                    view! {
                        <button
                            type="button"
                            class=move || button_class(active())
                            aria-pressed=move || active().to_string()
                            on:click=move |_| on_select.call(tf)
                        >
                            {tf.label()}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}
