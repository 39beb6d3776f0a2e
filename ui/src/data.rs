use std::rc::Rc;

use data_feed::{FetchState, Fetcher, StockDataSource, Trigger};
use futures_util::future::{FutureExt, LocalBoxFuture};
use leptos::*;
use ts_core::TimeFrame;

/// Reactive view of a [`StockDataSource`] for the currently selected key.
#[derive(Clone, Copy)]
pub struct StockData {
    pub state: Signal<FetchState>,
    /// Force a request for the current key.
    pub refresh: Callback<()>,
}

type Spawn = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

fn revalidate<F: Fetcher + 'static>(
    source: &Rc<StockDataSource<F>>,
    spawn: &Spawn,
    key: TimeFrame,
    trigger: Trigger,
) {
    let source = source.clone();
    spawn(
        async move {
            source.revalidate(key, trigger).await;
        }
        .boxed_local(),
    );
}

/// Subscribe the component to `source`, fetching on mount and whenever `key`
/// changes. Focus and reconnect events are forwarded as triggers and left to
/// the source's policy.
pub fn use_stock_data<F: Fetcher + 'static>(
    source: Rc<StockDataSource<F>>,
    key: Signal<TimeFrame>,
) -> StockData {
    use_stock_data_with(source, key, spawn_local)
}

/// [`use_stock_data`] with requests driven by `spawn` instead of the
/// runtime's local executor.
pub fn use_stock_data_with<F: Fetcher + 'static>(
    source: Rc<StockDataSource<F>>,
    key: Signal<TimeFrame>,
    spawn: impl Fn(LocalBoxFuture<'static, ()>) + 'static,
) -> StockData {
    let spawn: Spawn = Rc::new(spawn);
    let version = create_rw_signal(0u64);
    source.subscribe(move |_| {
        // The view may already be gone when a request settles.
        let _ = version.try_update(|v| *v += 1);
    });

    let state = {
        let source = source.clone();
        Signal::derive(move || {
            version.get();
            source.state(key.get())
        })
    };

    {
        let source = source.clone();
        let spawn = spawn.clone();
        create_effect(move |prev: Option<TimeFrame>| {
            let current = key.get();
            match prev {
                None => revalidate(&source, &spawn, current, Trigger::Mount),
                Some(prev) if prev != current => {
                    revalidate(&source, &spawn, current, Trigger::KeyChange)
                }
                Some(_) => {}
            }
            current
        });
    }

    #[cfg(target_arch = "wasm32")]
    {
        {
            let source = source.clone();
            let spawn = spawn.clone();
            let focus = window_event_listener(ev::focus, move |_| {
                revalidate(&source, &spawn, key.get_untracked(), Trigger::Focus);
            });
            on_cleanup(move || focus.remove());
        }
        {
            let source = source.clone();
            let spawn = spawn.clone();
            let online = window_event_listener(ev::online, move |_| {
                revalidate(&source, &spawn, key.get_untracked(), Trigger::Reconnect);
            });
            on_cleanup(move || online.remove());
        }
    }

    let refresh = Callback::new(move |_: ()| {
        revalidate(&source, &spawn, key.get_untracked(), Trigger::Manual);
    });

    StockData { state, refresh }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_feed::{CandlesResponse, FeedConfig, FeedError};
    use futures::executor::LocalPool;
    use futures::task::LocalSpawnExt;
    use std::cell::{Cell, RefCell};
    use ts_core::Candle;

    /// Answers immediately and records every requested URL.
    #[derive(Default)]
    struct RecordingFetcher {
        urls: RefCell<Vec<String>>,
        fail: Cell<bool>,
    }

    impl Fetcher for RecordingFetcher {
        fn get<'a>(
            &'a self,
            url: &'a str,
        ) -> LocalBoxFuture<'a, Result<CandlesResponse, FeedError>> {
            self.urls.borrow_mut().push(url.to_string());
            let fail = self.fail.get();
            async move {
                if fail {
                    Err(FeedError::Status(503))
                } else {
                    Ok(CandlesResponse {
                        candles: vec![Candle::new("2024-01-01T00:00:00Z", 100.0)],
                    })
                }
            }
            .boxed_local()
        }
    }

    fn hook(
        pool: &LocalPool,
        key: RwSignal<TimeFrame>,
    ) -> (Rc<StockDataSource<RecordingFetcher>>, StockData) {
        let source = Rc::new(StockDataSource::new(
            FeedConfig::default(),
            RecordingFetcher::default(),
        ));
        let spawner = pool.spawner();
        let data = use_stock_data_with(source.clone(), key.into(), move |fut| {
            spawner.spawn_local(fut).unwrap();
        });
        (source, data)
    }

    #[test]
    fn mount_then_only_changed_selections_revalidate() {
        let runtime = create_runtime();
        let mut pool = LocalPool::new();
        let key = create_rw_signal(TimeFrame::Daily);
        let (source, data) = hook(&pool, key);
        pool.run_until_stalled();

        for tf in [
            TimeFrame::Weekly,
            TimeFrame::Weekly,
            TimeFrame::Daily,
            TimeFrame::Weekly,
        ] {
            key.set(tf);
            pool.run_until_stalled();
        }

        let config = source.config();
        assert_eq!(
            *source.fetcher().urls.borrow(),
            vec![
                config.url_for(TimeFrame::Daily),
                config.url_for(TimeFrame::Weekly),
            ]
        );
        let state = data.state.get_untracked();
        assert!(state.data.is_some());
        assert!(!state.is_error());
        runtime.dispose();
    }

    #[test]
    fn refresh_refetches_the_current_key_after_a_failure() {
        let runtime = create_runtime();
        let mut pool = LocalPool::new();
        let key = create_rw_signal(TimeFrame::Monthly);
        let (source, data) = hook(&pool, key);
        source.fetcher().fail.set(true);
        pool.run_until_stalled();
        assert!(data.state.get_untracked().is_error());

        source.fetcher().fail.set(false);
        data.refresh.call(());
        pool.run_until_stalled();

        assert_eq!(source.requests_issued(), 2);
        assert_eq!(
            source.fetcher().urls.borrow().last(),
            Some(&source.config().url_for(TimeFrame::Monthly))
        );
        let state = data.state.get_untracked();
        assert!(!state.is_error());
        assert!(state.data.is_some());
        runtime.dispose();
    }
}
