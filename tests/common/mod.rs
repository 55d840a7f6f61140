//! Shared test utilities and constants.
#![allow(dead_code)]

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// BingX swap-market public endpoint URL.
pub const BINGX_WS_URL: &str = "wss://open-api-swap.bingx.com/swap-market";

/// `dataType` of the subscription used throughout the tests.
pub const DATA_TYPE: &str = "BTC-USDT@kline_1m";

/// Compresses `payload` the way the feed does.
pub fn gzip(payload: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload.as_bytes())
        .expect("failed to write gzip payload");
    encoder.finish().expect("failed to finish gzip stream")
}

/// A single-element kline document for [`DATA_TYPE`].
pub fn kline_json(ts: i64, close: &str) -> String {
    format!(
        r#"{{"dataType":"{DATA_TYPE}","data":[{{"T":{ts},"o":"100","h":"110","l":"90","c":"{close}","v":"5"}}]}}"#
    )
}
