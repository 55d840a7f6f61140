use kline_streamer::StreamerError;
use kline_streamer::config::fetch_config;
use kline_streamer::sink::{ClosedCandles, LogSink};
use kline_streamer::stream::KlineStream;
use kline_streamer::subscription::Subscription;
use kline_streamer::websocket::{connect, process_messages, subscribe, unsubscribe};
use tracing::info;

/// Number of closed candles kept in memory.
const HISTORY_LEN: usize = 500;

#[tokio::main]
async fn main() -> Result<(), StreamerError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    let app_config = fetch_config()?.bingx;

    let subscription = Subscription::new(&app_config.symbol, app_config.timeframe.as_str());
    let mut stream = KlineStream::new(
        subscription.clone(),
        (LogSink, ClosedCandles::with_capacity(HISTORY_LEN)),
    )
    .with_ordering_policy(app_config.ordering);

    let (mut write, mut read) = connect(&app_config.websocket_url).await?;
    subscribe(&mut write, &subscription).await?;

    tokio::select! {
        result = process_messages(&mut read, &mut write, &mut stream) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, unsubscribing");
            unsubscribe(&mut write, &subscription).await?;
        }
    }

    let (_, history) = stream.into_sink();
    for candle in history.tail(5) {
        info!(
            bucket_start = candle.bucket_start,
            open = %candle.open,
            high = %candle.high,
            low = %candle.low,
            close = %candle.close,
            volume = %candle.volume,
            "Recent candle"
        );
    }
    info!(closed = history.len(), "Streamer stopped");

    Ok(())
}
