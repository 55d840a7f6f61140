//! Wire models for the BingX swap-market kline stream.
//!
//! Contains the outbound subscribe/unsubscribe request, the kline
//! interval enumeration and the literal keepalive strings.

pub mod candle;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::subscription::Subscription;

/// Keepalive probe sent by the feed after decompression.
pub const PING: &str = "Ping";

/// Literal reply the feed expects to a [`PING`].
pub const PONG: &str = "Pong";

/// Kline intervals accepted by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    OneMinute,
    ThreeMinutes,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    SixHours,
    EightHours,
    TwelveHours,
    OneDay,
    ThreeDays,
    OneWeek,
    /// Calendar month (wire name: `"1M"`).
    OneMonth,
}

impl Timeframe {
    /// Every supported interval, shortest first.
    pub const ALL: [Timeframe; 15] = [
        Timeframe::OneMinute,
        Timeframe::ThreeMinutes,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::TwoHours,
        Timeframe::FourHours,
        Timeframe::SixHours,
        Timeframe::EightHours,
        Timeframe::TwelveHours,
        Timeframe::OneDay,
        Timeframe::ThreeDays,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
    ];

    /// Returns the wire-format interval name used in `dataType`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::ThreeMinutes => "3m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::TwoHours => "2h",
            Timeframe::FourHours => "4h",
            Timeframe::SixHours => "6h",
            Timeframe::EightHours => "8h",
            Timeframe::TwelveHours => "12h",
            Timeframe::OneDay => "1d",
            Timeframe::ThreeDays => "3d",
            Timeframe::OneWeek => "1w",
            Timeframe::OneMonth => "1M",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    /// Parses a wire name. Matching is case-sensitive because `1m` and `1M`
    /// are different intervals.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| format!("unsupported timeframe `{s}`"))
    }
}

/// Request type of a [`SubscribeRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Sub,
    Unsub,
}

/// A `sub`/`unsub` request sent to the feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub id: String,
    pub req_type: RequestType,
    pub data_type: String,
}

impl SubscribeRequest {
    /// Builds the handshake payload for `subscription`.
    pub fn new(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id().to_string(),
            req_type: RequestType::Sub,
            data_type: subscription.data_type().to_string(),
        }
    }

    /// Builds the request that cancels `subscription`.
    pub fn unsubscribe(subscription: &Subscription) -> Self {
        Self {
            req_type: RequestType::Unsub,
            ..Self::new(subscription)
        }
    }
}
