use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, warn};
use ts_core::{Candle, TimeFrame};

use crate::{CandlesResponse, FeedConfig, FeedError, Fetcher};

/// Why a key is being (re)validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// First observation of the key by a mounted view.
    Mount,
    /// The selected key changed.
    KeyChange,
    /// The page regained focus.
    Focus,
    /// The network came back online.
    Reconnect,
    /// Explicit refresh; never de-duplicated.
    Manual,
}

/// Observable state of one key.
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    /// Latest successful payload. Replaced wholesale, never merged.
    pub data: Option<Rc<CandlesResponse>>,
    /// Error of the latest settled request, cleared by the next success.
    pub error: Option<FeedError>,
    pub in_flight: bool,
}

impl FetchState {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn candles(&self) -> Option<&[Candle]> {
        self.data.as_ref().map(|d| d.candles.as_slice())
    }
}

#[derive(Default)]
struct Entry {
    data: Option<Rc<CandlesResponse>>,
    error: Option<FeedError>,
    in_flight: u32,
}

type Listener = Rc<dyn Fn(TimeFrame)>;

/// Keyed candle cache driven by a [`crate::RevalidatePolicy`].
///
/// Single-threaded: state lives in `RefCell`s and no borrow is held across an
/// `.await`, so several revalidations may be outstanding on one executor.
pub struct StockDataSource<F> {
    config: FeedConfig,
    fetcher: F,
    cache: RefCell<HashMap<TimeFrame, Entry>>,
    listeners: RefCell<Vec<Listener>>,
    requests: Cell<u64>,
}

impl<F> fmt::Debug for StockDataSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StockDataSource")
            .field("config", &self.config)
            .field("requests", &self.requests.get())
            .finish_non_exhaustive()
    }
}

impl<F: Fetcher> StockDataSource<F> {
    pub fn new(config: FeedConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            cache: RefCell::new(HashMap::new()),
            listeners: RefCell::new(Vec::new()),
            requests: Cell::new(0),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Total requests issued since construction.
    pub fn requests_issued(&self) -> u64 {
        self.requests.get()
    }

    pub fn state(&self, key: TimeFrame) -> FetchState {
        self.cache
            .borrow()
            .get(&key)
            .map(|e| FetchState {
                data: e.data.clone(),
                error: e.error.clone(),
                in_flight: e.in_flight > 0,
            })
            .unwrap_or_default()
    }

    /// Called with the key after every settled request.
    pub fn subscribe(&self, listener: impl Fn(TimeFrame) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Whether `trigger` on `key` would issue a request right now.
    pub fn should_fetch(&self, key: TimeFrame, trigger: Trigger) -> bool {
        let policy = self.config.revalidate;
        let cache = self.cache.borrow();
        let entry = cache.get(&key);
        let in_flight = entry.is_some_and(|e| e.in_flight > 0);
        let has_data = entry.is_some_and(|e| e.data.is_some());
        match trigger {
            Trigger::Manual => true,
            _ if in_flight => false,
            Trigger::Mount => policy.revalidate_on_mount || !has_data,
            Trigger::KeyChange => !has_data || policy.revalidate_if_stale,
            Trigger::Focus => policy.revalidate_on_focus,
            Trigger::Reconnect => policy.revalidate_on_reconnect,
        }
    }

    /// Revalidate `key` for `trigger`. Returns `true` when a request was issued.
    pub async fn revalidate(&self, key: TimeFrame, trigger: Trigger) -> bool {
        if !self.should_fetch(key, trigger) {
            debug!(%key, ?trigger, "revalidation skipped");
            return false;
        }
        self.begin(key);
        let url = self.config.url_for(key);
        info!(%url, ?trigger, "requesting candles");
        let result = self.fetcher.get(&url).await;
        self.settle(key, result);
        self.notify(key);
        true
    }

    fn begin(&self, key: TimeFrame) {
        self.requests.set(self.requests.get() + 1);
        self.cache.borrow_mut().entry(key).or_default().in_flight += 1;
    }

    // No sequence guard: the last request to settle for a key wins.
    fn settle(&self, key: TimeFrame, result: Result<CandlesResponse, FeedError>) {
        let mut cache = self.cache.borrow_mut();
        let entry = cache.entry(key).or_default();
        entry.in_flight = entry.in_flight.saturating_sub(1);
        match result {
            Ok(resp) => {
                info!(%key, candles = resp.candles.len(), "candles loaded");
                entry.data = Some(Rc::new(resp));
                entry.error = None;
            }
            Err(err) => {
                warn!(%key, error = %err, "candle request failed");
                entry.error = Some(err);
            }
        }
    }

    fn notify(&self, key: TimeFrame) {
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(key);
        }
    }
}
