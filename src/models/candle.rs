//! Tick and OHLCV candle models.

use rust_decimal::Decimal;
use serde::Serialize;

/// One validated kline entry from the feed.
///
/// The feed sends a cumulative snapshot of the forming bucket, not a
/// single trade, so a tick already carries the bucket's OHLCV so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Start of the time bucket, epoch milliseconds.
    pub bucket_start: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// State of one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candle {
    /// Start of the time bucket, epoch milliseconds.
    pub bucket_start: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl From<Tick> for Candle {
    fn from(tick: Tick) -> Self {
        Self {
            bucket_start: tick.bucket_start,
            open: tick.open,
            high: tick.high,
            low: tick.low,
            close: tick.close,
            volume: tick.volume,
        }
    }
}

/// Output of the candle aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleEvent {
    /// The open candle was created or updated by a tick of its bucket.
    Opened(Candle),
    /// A bucket received its last tick; emitted once, when the next bucket starts.
    Closed(Candle),
}

impl CandleEvent {
    /// The candle carried by this event.
    pub fn candle(&self) -> &Candle {
        match self {
            CandleEvent::Opened(candle) | CandleEvent::Closed(candle) => candle,
        }
    }
}

/// Renders an epoch-millisecond timestamp as ISO 8601 (`YYYY-MM-DDTHH:MM:SS.mmmZ`).
pub fn format_epoch_millis(ms: i64) -> String {
    let secs = ms.div_euclid(1000);
    let millis = ms.rem_euclid(1000);

    let days = secs.div_euclid(86400);
    let time_secs = secs.rem_euclid(86400);
    let hours = time_secs / 3600;
    let minutes = (time_secs % 3600) / 60;
    let seconds = time_secs % 60;

    // Civil date from days since epoch (Howard Hinnant's algorithm)
    let z = days + 719468;
    let era = z.div_euclid(146097);
    let doe = z.rem_euclid(146097);
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };

    format!("{y:04}-{m:02}-{d:02}T{hours:02}:{minutes:02}:{seconds:02}.{millis:03}Z")
}
