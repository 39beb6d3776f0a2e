use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Seconds since Unix epoch, the unit the chart plots on its time axis.
pub type Timestamp = i64;

/// Number of milliseconds in a second.
pub const MS: i64 = 1_000;

/// Sampling granularity requested from the candle API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    Hourly,
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl TimeFrame {
    /// Every selectable time-frame, in display order.
    pub const ALL: [TimeFrame; 4] = [
        TimeFrame::Hourly,
        TimeFrame::Daily,
        TimeFrame::Weekly,
        TimeFrame::Monthly,
    ];

    /// Path segment used in the candle URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Hourly => "hourly",
            TimeFrame::Daily => "daily",
            TimeFrame::Weekly => "weekly",
            TimeFrame::Monthly => "monthly",
        }
    }

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::Hourly => "Hourly",
            TimeFrame::Daily => "Daily",
            TimeFrame::Weekly => "Weekly",
            TimeFrame::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        TimeFrame::ALL
            .into_iter()
            .find(|tf| tf.as_str() == lower)
            .ok_or_else(|| format!("invalid timeframe: {s}"))
    }
}

/// Candle date as delivered by the API: an ISO-8601 string or epoch milliseconds.
///
/// Anything else (null, an object, a missing field) is kept as `Other` so a
/// single bad sample does not reject the whole payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CandleDate {
    Millis(f64),
    Text(String),
    Other(Value),
}

impl Default for CandleDate {
    fn default() -> Self {
        CandleDate::Other(Value::Null)
    }
}

/// Closing price as delivered by the API: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClosePrice {
    Number(f64),
    Text(String),
    Other(Value),
}

impl Default for ClosePrice {
    fn default() -> Self {
        ClosePrice::Other(Value::Null)
    }
}

/// One price sample. Only `date` and `close` are read; other fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(default)]
    pub date: CandleDate,
    #[serde(default)]
    pub close: ClosePrice,
}

impl Candle {
    pub fn new(date: impl Into<String>, close: f64) -> Self {
        Self {
            date: CandleDate::Text(date.into()),
            close: ClosePrice::Number(close),
        }
    }

    /// Milliseconds since epoch.
    pub fn epoch_ms(&self) -> Result<i64, PointError> {
        match &self.date {
            CandleDate::Millis(ms) if ms.is_finite() => Ok(ms.floor() as i64),
            CandleDate::Millis(ms) => Err(PointError::InvalidDate(ms.to_string())),
            CandleDate::Text(s) => parse_date_ms(s),
            CandleDate::Other(v) => Err(PointError::InvalidDate(v.to_string())),
        }
    }

    /// Coerced closing price.
    pub fn close_value(&self) -> Result<f64, PointError> {
        match &self.close {
            ClosePrice::Number(n) => Ok(*n),
            ClosePrice::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| PointError::InvalidClose(s.clone())),
            ClosePrice::Other(v) => Err(PointError::InvalidClose(v.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    #[error("invalid candle date: {0}")]
    InvalidDate(String),
    #[error("invalid close price: {0:?}")]
    InvalidClose(String),
}

/// Chart-ready projection of a candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub time: Timestamp,
    pub value: f64,
}

impl SeriesPoint {
    pub fn from_candle(candle: &Candle) -> Result<Self, PointError> {
        let ms = candle.epoch_ms()?;
        Ok(Self {
            time: ms.div_euclid(MS),
            value: candle.close_value()?,
        })
    }
}

pub trait HasTimestamp {
    fn ts(&self) -> Timestamp;
}

impl HasTimestamp for SeriesPoint {
    fn ts(&self) -> Timestamp {
        self.time
    }
}

/// Transform candles into an ascending series. Equal timestamps keep their input order.
pub fn to_series(candles: &[Candle]) -> Result<Vec<SeriesPoint>, PointError> {
    let mut points = candles
        .iter()
        .map(SeriesPoint::from_candle)
        .collect::<Result<Vec<_>, _>>()?;
    points.sort_by_key(|p| p.time);
    Ok(points)
}

fn parse_date_ms(s: &str) -> Result<i64, PointError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    // Offset-less forms are read as UTC.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    Err(PointError::InvalidDate(s.to_string()))
}

/// Sorted samples with binary-searchable timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeries<T> {
    data: Vec<T>,
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T: HasTimestamp> TimeSeries<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Wrap samples that are already in non-decreasing timestamp order.
    pub fn from_sorted(data: Vec<T>) -> Self {
        debug_assert!(data.windows(2).all(|w| w[0].ts() <= w[1].ts()));
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// First sample stamped exactly `ts`.
    pub fn get(&self, ts: Timestamp) -> Option<&T> {
        let idx = self.lower_bound(ts);
        self.data.get(idx).filter(|s| s.ts() == ts)
    }

    fn lower_bound(&self, ts: Timestamp) -> usize {
        let mut left = 0usize;
        let mut right = self.data.len();
        while left < right {
            let mid = (left + right) / 2;
            match self.data[mid].ts().cmp(&ts) {
                Ordering::Less => left = mid + 1,
                Ordering::Equal | Ordering::Greater => right = mid,
            }
        }
        left
    }
}

impl TimeSeries<SeriesPoint> {
    pub fn value_at(&self, ts: Timestamp) -> Option<f64> {
        self.get(ts).map(|p| p.value)
    }
}

/// Text shown in the hover tooltip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipText {
    /// `YYYY-MM-DD HH:MM:SS UTC`
    pub when: String,
    /// Price with two decimals.
    pub price: String,
}

impl TooltipText {
    pub fn new(time: Timestamp, value: f64) -> Self {
        let when = DateTime::<Utc>::from_timestamp(time, 0)
            .map(|dt| format!("{} UTC", dt.format("%Y-%m-%d %H:%M:%S")))
            .unwrap_or_else(|| format!("{time} UTC"));
        Self {
            when,
            price: format!("{value:.2}"),
        }
    }

    pub fn to_html(&self) -> String {
        format!("📅 {} <br/> 💲 {}", self.when, self.price)
    }
}

impl fmt::Display for TooltipText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "📅 {}\n💲 {}", self.when, self.price)
    }
}
