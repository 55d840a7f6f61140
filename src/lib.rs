//! BingX swap-market kline streaming library.
//!
//! Decodes gzip-compressed feed frames, parses kline ticks and folds them
//! into OHLCV candles, reporting every update of the forming candle and
//! each candle's close to a caller-supplied [`sink::CandleSink`].

pub mod aggregator;
pub mod config;
pub mod error;
pub mod frame;
pub mod models;
pub mod parser;
pub mod sink;
pub mod stream;
pub mod subscription;
pub mod websocket;

pub use error::{Result, StreamerError};
