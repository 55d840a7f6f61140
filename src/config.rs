//! Driver configuration loaded from environment variables.
//!
//! - `BINGX_WEBSOCKET_URL`: feed endpoint (default: the swap-market URL)
//! - `BINGX_SYMBOL`: contract symbol (default `BTC-USDT`)
//! - `BINGX_TIMEFRAME`: kline interval (default `1m`)
//! - `BINGX_STRICT_ORDERING`: `true`/`1` ends the session on an
//!   out-of-order bucket instead of dropping the tick
//!
//! Empty values are treated as absent.

use crate::aggregator::OrderingPolicy;
use crate::models::Timeframe;

/// Default public WebSocket endpoint.
const DEFAULT_WEBSOCKET_URL: &str = "wss://open-api-swap.bingx.com/swap-market";

const DEFAULT_SYMBOL: &str = "BTC-USDT";

const DEFAULT_TIMEFRAME: Timeframe = Timeframe::OneMinute;

/// Top-level application configuration.
#[derive(Debug)]
pub struct AppConfig {
    pub bingx: BingxConfig,
}

/// Feed-specific configuration values.
#[derive(Debug)]
pub struct BingxConfig {
    pub websocket_url: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub ordering: OrderingPolicy,
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`StreamerError::Config`](crate::StreamerError::Config) if
/// `BINGX_TIMEFRAME` is not a supported interval or
/// `BINGX_STRICT_ORDERING` is not a boolean.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let websocket_url = non_empty_var("BINGX_WEBSOCKET_URL")
        .unwrap_or_else(|| DEFAULT_WEBSOCKET_URL.to_string());

    let symbol = non_empty_var("BINGX_SYMBOL").unwrap_or_else(|| DEFAULT_SYMBOL.to_string());

    let timeframe = match non_empty_var("BINGX_TIMEFRAME") {
        Some(raw) => raw
            .parse()
            .map_err(|e| crate::StreamerError::Config(format!("BINGX_TIMEFRAME: {e}")))?,
        None => DEFAULT_TIMEFRAME,
    };

    let ordering = match non_empty_var("BINGX_STRICT_ORDERING").as_deref() {
        None | Some("false" | "0") => OrderingPolicy::Drop,
        Some("true" | "1") => OrderingPolicy::Fail,
        Some(other) => {
            return Err(crate::StreamerError::Config(format!(
                "BINGX_STRICT_ORDERING must be true/false/1/0, got `{other}`"
            )));
        }
    };

    Ok(AppConfig {
        bingx: BingxConfig {
            websocket_url,
            symbol,
            timeframe,
            ordering,
        },
    })
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
