//! Async WebSocket helpers for the BingX swap-market feed.
//!
//! - [`handler`] - the in-order read loop driving a [`KlineStream`](crate::stream::KlineStream)
//!
//! Connection lifecycle (reconnects, backoff) belongs to the caller.

mod handler;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};
use tungstenite::Message;

use crate::Result;
use crate::models::PONG;
use crate::subscription::Subscription;

pub use handler::process_messages;

/// Write half of a feed connection.
pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Read half of a feed connection.
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Establishes a WebSocket connection to the given URL.
///
/// # Errors
///
/// Returns a [`StreamerError`](crate::StreamerError) if the connection or TLS handshake fails.
pub async fn connect(url: &str) -> Result<(WsWriter, WsReader)> {
    let (ws_stream, _) = connect_async(url).await?;
    info!(url, "WebSocket handshake completed");

    Ok(ws_stream.split())
}

/// Sends the subscription handshake. Call once, right after connecting.
///
/// # Errors
///
/// Returns a [`StreamerError`](crate::StreamerError) if sending the subscription message fails.
pub async fn subscribe(write: &mut WsWriter, subscription: &Subscription) -> Result<()> {
    let json = serde_json::to_string(&subscription.request())?;
    debug!("Sending subscribe request: {}", json);
    write.send(Message::Text(json.into())).await?;
    info!(
        data_type = subscription.data_type(),
        id = subscription.id(),
        "Subscribed to kline stream"
    );

    Ok(())
}

/// Cancels a subscription.
///
/// # Errors
///
/// Returns a [`StreamerError`](crate::StreamerError) if sending the unsubscribe message fails.
pub async fn unsubscribe(write: &mut WsWriter, subscription: &Subscription) -> Result<()> {
    let json = serde_json::to_string(&subscription.unsubscribe_request())?;
    write.send(Message::Text(json.into())).await?;
    info!(
        data_type = subscription.data_type(),
        "Unsubscribed from kline stream"
    );

    Ok(())
}

/// Answers a keepalive probe.
///
/// # Errors
///
/// Returns a [`StreamerError`](crate::StreamerError) if sending the reply fails.
pub async fn pong(write: &mut WsWriter) -> Result<()> {
    write.send(Message::Text(PONG.into())).await?;
    debug!("Sent pong");

    Ok(())
}
