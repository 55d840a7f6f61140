//! Candle boundary detection for a single subscription.
//!
//! The feed re-sends a cumulative snapshot of the forming bucket on every
//! tick. [`CandleAggregator`] keeps the latest snapshot as the open candle
//! and reports it as closed when the first tick of a later bucket arrives.
//! No timers are involved: a stalled feed delays the close.

use std::cmp::Ordering;

use thiserror::Error;

use crate::models::candle::{Candle, CandleEvent, Tick};

/// A tick whose bucket starts before the tracked bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tick bucket {received} precedes tracked bucket {tracked}")]
pub struct OrderingAnomaly {
    /// Bucket-start of the open candle.
    pub tracked: i64,
    /// Bucket-start of the rejected tick.
    pub received: i64,
}

/// What to do when an [`OrderingAnomaly`] is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingPolicy {
    /// Log and drop the tick, keep the session running.
    #[default]
    Drop,
    /// End the session with [`StreamerError::Ordering`](crate::StreamerError::Ordering).
    Fail,
}

/// Events produced by one accepted tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ingested {
    closed: Option<Candle>,
    opened: Candle,
}

impl Ingested {
    /// The candle closed by this tick, if it started a new bucket.
    pub fn closed(&self) -> Option<&Candle> {
        self.closed.as_ref()
    }

    /// The open candle after this tick.
    pub fn opened(&self) -> &Candle {
        &self.opened
    }

    /// The events in emission order: `Closed` (if any) then `Opened`.
    pub fn events(self) -> impl Iterator<Item = CandleEvent> {
        self.closed
            .map(CandleEvent::Closed)
            .into_iter()
            .chain(std::iter::once(CandleEvent::Opened(self.opened)))
    }
}

/// Folds ticks of one subscription into candle events.
///
/// Holds at most one open candle; its `bucket_start` is the tracked bucket.
#[derive(Debug, Clone, Default)]
pub struct CandleAggregator {
    current: Option<Candle>,
}

impl CandleAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket-start of the open candle, `None` before the first tick.
    pub fn tracked_bucket(&self) -> Option<i64> {
        self.current.map(|candle| candle.bucket_start)
    }

    /// The open candle, `None` before the first tick.
    pub fn current(&self) -> Option<&Candle> {
        self.current.as_ref()
    }

    /// Applies one tick.
    ///
    /// A tick for the tracked bucket replaces the open candle verbatim. A
    /// tick for a later bucket closes the open candle (with its state before
    /// this tick) and opens a new one.
    ///
    /// # Errors
    ///
    /// Returns an [`OrderingAnomaly`] if the tick's bucket starts before the
    /// tracked bucket. The aggregator is left unchanged.
    pub fn ingest(&mut self, tick: Tick) -> Result<Ingested, OrderingAnomaly> {
        let Some(current) = self.current.as_mut() else {
            let opened = Candle::from(tick);
            self.current = Some(opened);
            return Ok(Ingested {
                closed: None,
                opened,
            });
        };

        match tick.bucket_start.cmp(&current.bucket_start) {
            Ordering::Equal => {
                *current = Candle::from(tick);
                Ok(Ingested {
                    closed: None,
                    opened: *current,
                })
            }
            Ordering::Greater => {
                let closed = std::mem::replace(current, Candle::from(tick));
                Ok(Ingested {
                    closed: Some(closed),
                    opened: *current,
                })
            }
            Ordering::Less => Err(OrderingAnomaly {
                tracked: current.bucket_start,
                received: tick.bucket_start,
            }),
        }
    }
}
