//! Destinations for candle events.
//!
//! A [`CandleSink`] receives `on_update` for every tick of the open bucket
//! and `on_close` once per bucket. Handlers run inline on the read loop, so
//! a slow sink stalls the feed; forward to a channel when work is heavy.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::models::candle::{Candle, CandleEvent, format_epoch_millis};

/// Receives the events of one subscription.
pub trait CandleSink {
    /// Called for every tick of the open bucket, including its first.
    fn on_update(&mut self, candle: &Candle);

    /// Called once per bucket with its final state.
    fn on_close(&mut self, candle: &Candle);

    /// Routes an event to the matching callback.
    fn dispatch(&mut self, event: &CandleEvent) {
        match event {
            CandleEvent::Opened(candle) => self.on_update(candle),
            CandleEvent::Closed(candle) => self.on_close(candle),
        }
    }
}

impl<S: CandleSink + ?Sized> CandleSink for &mut S {
    fn on_update(&mut self, candle: &Candle) {
        (**self).on_update(candle);
    }

    fn on_close(&mut self, candle: &Candle) {
        (**self).on_close(candle);
    }
}

/// Fans each event out to both sinks, first `A` then `B`.
impl<A: CandleSink, B: CandleSink> CandleSink for (A, B) {
    fn on_update(&mut self, candle: &Candle) {
        self.0.on_update(candle);
        self.1.on_update(candle);
    }

    fn on_close(&mut self, candle: &Candle) {
        self.0.on_close(candle);
        self.1.on_close(candle);
    }
}

/// Forwards events to an async consumer. Events are dropped once the
/// receiver is gone.
impl CandleSink for mpsc::UnboundedSender<CandleEvent> {
    fn on_update(&mut self, candle: &Candle) {
        if self.send(CandleEvent::Opened(*candle)).is_err() {
            debug!("Candle receiver dropped, discarding update");
        }
    }

    fn on_close(&mut self, candle: &Candle) {
        if self.send(CandleEvent::Closed(*candle)).is_err() {
            debug!("Candle receiver dropped, discarding close");
        }
    }
}

/// A pair of closures.
pub struct Handlers<U, C> {
    on_update: U,
    on_close: C,
}

impl<U, C> Handlers<U, C>
where
    U: FnMut(&Candle),
    C: FnMut(&Candle),
{
    pub fn new(on_update: U, on_close: C) -> Self {
        Self {
            on_update,
            on_close,
        }
    }
}

impl<U, C> CandleSink for Handlers<U, C>
where
    U: FnMut(&Candle),
    C: FnMut(&Candle),
{
    fn on_update(&mut self, candle: &Candle) {
        (self.on_update)(candle);
    }

    fn on_close(&mut self, candle: &Candle) {
        (self.on_close)(candle);
    }
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl CandleSink for LogSink {
    fn on_update(&mut self, candle: &Candle) {
        debug!(
            bucket_start = candle.bucket_start,
            close = %candle.close,
            volume = %candle.volume,
            "Candle updated"
        );
    }

    fn on_close(&mut self, candle: &Candle) {
        info!(
            bucket_start = %format_epoch_millis(candle.bucket_start),
            open = %candle.open,
            high = %candle.high,
            low = %candle.low,
            close = %candle.close,
            volume = %candle.volume,
            "Candle closed"
        );
    }
}

/// In-memory table of closed candles keyed by bucket-start.
///
/// A second close for the same bucket overwrites the first. With a
/// capacity, the oldest buckets are evicted once it is exceeded.
#[derive(Debug, Clone, Default)]
pub struct ClosedCandles {
    rows: BTreeMap<i64, Candle>,
    capacity: Option<usize>,
}

impl ClosedCandles {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` of the most recent buckets.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: BTreeMap::new(),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, bucket_start: i64) -> Option<&Candle> {
        self.rows.get(&bucket_start)
    }

    /// All rows, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.rows.values()
    }

    /// The last `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> Vec<Candle> {
        let skip = self.rows.len().saturating_sub(n);
        self.rows.values().skip(skip).copied().collect()
    }

    pub fn insert(&mut self, candle: Candle) {
        self.rows.insert(candle.bucket_start, candle);
        if let Some(capacity) = self.capacity {
            while self.rows.len() > capacity {
                self.rows.pop_first();
            }
        }
    }
}

impl CandleSink for ClosedCandles {
    fn on_update(&mut self, _candle: &Candle) {}

    fn on_close(&mut self, candle: &Candle) {
        self.insert(*candle);
        debug!(rows = self.rows.len(), "Stored closed candle");
    }
}
