//! Subscription identity and handshake payloads.
//!
//! A [`Subscription`] names one `(symbol, timeframe)` kline stream. It
//! builds the outbound `sub`/`unsub` requests and decides which inbound
//! documents belong to it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::SubscribeRequest;

/// Last request-id suffix issued in this process.
static LAST_REQUEST_SUFFIX: AtomicU64 = AtomicU64::new(0);

/// One symbol/timeframe kline stream. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    symbol: String,
    timeframe: String,
    id: String,
    data_type: String,
}

impl Subscription {
    /// Builds a subscription with a fresh request id.
    ///
    /// The id is `"<symbol>-<timeframe>-<n>"` where `n` is a millisecond
    /// timestamp bumped as needed so no two calls share it.
    pub fn new(symbol: impl Into<String>, timeframe: impl Into<String>) -> Self {
        let symbol = symbol.into();
        let timeframe = timeframe.into();
        let id = format!("{symbol}-{timeframe}-{}", next_request_suffix());
        Self::with_id(symbol, timeframe, id)
    }

    /// Builds a subscription with a caller-chosen request id.
    pub fn with_id(
        symbol: impl Into<String>,
        timeframe: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        let symbol = symbol.into();
        let timeframe = timeframe.into();
        let data_type = format!("{symbol}@kline_{timeframe}");
        Self {
            symbol,
            timeframe,
            id: id.into(),
            data_type,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The `dataType` key, `"<symbol>@kline_<timeframe>"`.
    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    /// Returns `true` if an inbound `dataType` belongs to this subscription.
    pub fn matches(&self, data_type: &str) -> bool {
        self.data_type == data_type
    }

    /// The handshake payload sent once after connecting.
    pub fn request(&self) -> SubscribeRequest {
        SubscribeRequest::new(self)
    }

    /// The payload that cancels this subscription.
    pub fn unsubscribe_request(&self) -> SubscribeRequest {
        SubscribeRequest::unsubscribe(self)
    }
}

/// Returns `true` if `document` is the feed's subscription acknowledgment
/// (`{"code": 0, ...}`).
pub fn is_ack(document: &serde_json::Value) -> bool {
    document.get("code").and_then(serde_json::Value::as_i64) == Some(0)
}

/// Returns a strictly increasing millisecond-based suffix.
fn next_request_suffix() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    let mut prev = LAST_REQUEST_SUFFIX.load(Ordering::Relaxed);
    loop {
        let suffix = now.max(prev + 1);
        match LAST_REQUEST_SUFFIX.compare_exchange_weak(
            prev,
            suffix,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return suffix,
            Err(actual) => prev = actual,
        }
    }
}
