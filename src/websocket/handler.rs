//! Incoming WebSocket message processing.

use futures_util::StreamExt;
use tracing::{debug, info};
use tungstenite::Message;

use super::{WsReader, WsWriter, pong};
use crate::Result;
use crate::sink::CandleSink;
use crate::stream::{FrameOutcome, KlineStream};

/// Reads frames in arrival order and feeds them to `stream`.
///
/// Binary frames are gzip-decoded; text frames are taken as already
/// decoded. A keepalive probe is answered before the next frame is read.
/// Returns when the peer closes the connection or the stream ends.
///
/// # Errors
///
/// Returns a [`StreamerError`](crate::StreamerError) if reading from or
/// writing to the WebSocket fails, or if the stream's ordering policy
/// rejects a tick.
pub async fn process_messages<S: CandleSink>(
    read: &mut WsReader,
    write: &mut WsWriter,
    stream: &mut KlineStream<S>,
) -> Result<()> {
    while let Some(msg) = read.next().await {
        let outcome = match msg? {
            Message::Binary(bytes) => stream.handle_frame(&bytes)?,
            Message::Text(text) => stream.handle_text(text.as_str())?,
            Message::Close(frame) => {
                info!(?frame, "WebSocket closed by peer");
                break;
            }
            // Transport-level ping/pong is answered by tungstenite.
            _ => continue,
        };

        if outcome == FrameOutcome::KeepAlive {
            pong(write).await?;
        }
    }

    debug!(
        data_type = stream.subscription().data_type(),
        "Message stream ended"
    );

    Ok(())
}
