//! Per-subscription pipeline: frame decoding, tick parsing, candle
//! aggregation and event delivery.
//!
//! [`KlineStream`] is synchronous and transport-agnostic. The read loop in
//! [`websocket`](crate::websocket) feeds it one frame at a time, in arrival
//! order, and sends the keepalive reply when asked to.

use tracing::{debug, error, info, warn};

use crate::Result;
use crate::aggregator::{CandleAggregator, OrderingPolicy};
use crate::frame::{self, Frame};
use crate::models::candle::format_epoch_millis;
use crate::parser::{self, Parsed};
use crate::sink::CandleSink;
use crate::subscription::Subscription;

/// What a frame turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Keepalive probe; the caller must send [`PONG`](crate::models::PONG)
    /// before handling the next frame.
    KeepAlive,
    /// A data document; the count is the number of ticks accepted by the
    /// aggregator.
    Ticks(usize),
    /// The subscription acknowledgment.
    Acknowledged,
    /// A well-formed document for someone else.
    Unrecognized,
    /// The frame could not be decoded or parsed and was dropped.
    Discarded,
}

/// One subscription's decode → parse → aggregate → sink pipeline.
pub struct KlineStream<S> {
    subscription: Subscription,
    aggregator: CandleAggregator,
    policy: OrderingPolicy,
    sink: S,
}

impl<S: CandleSink> KlineStream<S> {
    /// Creates a pipeline with the default (dropping) ordering policy.
    pub fn new(subscription: Subscription, sink: S) -> Self {
        Self {
            subscription,
            aggregator: CandleAggregator::new(),
            policy: OrderingPolicy::default(),
            sink,
        }
    }

    /// Sets how out-of-order buckets are handled.
    #[must_use]
    pub fn with_ordering_policy(mut self, policy: OrderingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn aggregator(&self) -> &CandleAggregator {
        &self.aggregator
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Handles one compressed frame.
    ///
    /// Decode and parse failures are logged and reported as
    /// [`FrameOutcome::Discarded`].
    ///
    /// # Errors
    ///
    /// Returns [`StreamerError::Ordering`](crate::StreamerError::Ordering)
    /// only under [`OrderingPolicy::Fail`].
    pub fn handle_frame(&mut self, raw: &[u8]) -> Result<FrameOutcome> {
        match frame::decode(raw) {
            Ok(Frame::KeepAlive) => {
                debug!("Received keepalive probe");
                Ok(FrameOutcome::KeepAlive)
            }
            Ok(Frame::Text(text)) => self.handle_document(&text),
            Err(e) => {
                error!(error = %e, len = raw.len(), "Failed to decode frame");
                Ok(FrameOutcome::Discarded)
            }
        }
    }

    /// Handles a payload that arrived uncompressed.
    ///
    /// # Errors
    ///
    /// Same as [`handle_frame`](Self::handle_frame).
    pub fn handle_text(&mut self, text: &str) -> Result<FrameOutcome> {
        match frame::classify(text.to_string()) {
            Frame::KeepAlive => {
                debug!("Received keepalive probe");
                Ok(FrameOutcome::KeepAlive)
            }
            Frame::Text(text) => self.handle_document(&text),
        }
    }

    fn handle_document(&mut self, text: &str) -> Result<FrameOutcome> {
        match parser::parse(text, &self.subscription) {
            Ok(Parsed::Ticks(ticks)) => {
                let mut accepted = 0;
                for tick in ticks {
                    match self.aggregator.ingest(tick) {
                        Ok(ingested) => {
                            accepted += 1;
                            if let Some(closed) = ingested.closed() {
                                info!(
                                    data_type = self.subscription.data_type(),
                                    bucket_start = %format_epoch_millis(closed.bucket_start),
                                    "Bucket closed"
                                );
                            }
                            for event in ingested.events() {
                                self.sink.dispatch(&event);
                            }
                        }
                        Err(anomaly) => {
                            warn!(
                                data_type = self.subscription.data_type(),
                                tracked = anomaly.tracked,
                                received = anomaly.received,
                                "Dropping out-of-order tick"
                            );
                            if self.policy == OrderingPolicy::Fail {
                                return Err(anomaly.into());
                            }
                        }
                    }
                }
                Ok(FrameOutcome::Ticks(accepted))
            }
            Ok(Parsed::SubscriptionAck) => {
                info!(
                    data_type = self.subscription.data_type(),
                    response = text,
                    "Received subscription confirmation"
                );
                Ok(FrameOutcome::Acknowledged)
            }
            Ok(Parsed::Unrecognized) => {
                debug!(message = text, "Received non-kline message");
                Ok(FrameOutcome::Unrecognized)
            }
            Err(e) => {
                error!(error = %e, message = text, "Failed to process message");
                Ok(FrameOutcome::Discarded)
            }
        }
    }
}
