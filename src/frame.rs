//! Inbound frame decoding.
//!
//! Every frame from the feed is a single-member gzip stream wrapping
//! UTF-8 text: either the keepalive probe `"Ping"` or a JSON document.

use std::io::{self, Read};
use std::string::FromUtf8Error;

use flate2::read::GzDecoder;
use thiserror::Error;

use crate::models::PING;

/// Errors that can occur while decoding a single frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame is not a valid (or complete) gzip stream.
    #[error("gzip decompression failed: {0}")]
    Decompress(#[source] io::Error),

    /// The decompressed payload is not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    Encoding(#[source] FromUtf8Error),
}

/// A successfully decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// The feed's liveness probe. The caller must reply with
    /// [`PONG`](crate::models::PONG) before reading the next frame.
    KeepAlive,
    /// Any other payload, passed on to the parser.
    Text(String),
}

/// Decompresses and decodes one frame.
///
/// # Errors
///
/// Returns [`FrameError::Decompress`] for empty, corrupt or truncated
/// input and [`FrameError::Encoding`] if the payload is not UTF-8.
pub fn decode(raw: &[u8]) -> Result<Frame, FrameError> {
    if raw.is_empty() {
        return Err(FrameError::Decompress(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "empty frame",
        )));
    }

    let mut decompressed = Vec::new();
    GzDecoder::new(raw)
        .read_to_end(&mut decompressed)
        .map_err(FrameError::Decompress)?;

    let text = String::from_utf8(decompressed).map_err(FrameError::Encoding)?;

    Ok(classify(text))
}

/// Separates the keepalive probe from data payloads.
pub fn classify(text: String) -> Frame {
    if text == PING {
        Frame::KeepAlive
    } else {
        Frame::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use super::*;

    fn gzip(payload: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn decodes_json_text() {
        let frame = gzip(br#"{"code":0}"#);
        assert_eq!(decode(&frame).unwrap(), Frame::Text(r#"{"code":0}"#.into()));
    }

    #[test]
    fn recognizes_keepalive() {
        assert_eq!(decode(&gzip(b"Ping")).unwrap(), Frame::KeepAlive);
    }

    #[test]
    fn keepalive_match_is_exact() {
        assert_eq!(decode(&gzip(b"ping")).unwrap(), Frame::Text("ping".into()));
        assert_eq!(decode(&gzip(b"Ping ")).unwrap(), Frame::Text("Ping ".into()));
    }

    #[test]
    fn rejects_empty_frame() {
        assert!(matches!(decode(&[]), Err(FrameError::Decompress(_))));
    }

    #[test]
    fn rejects_uncompressed_bytes() {
        assert!(matches!(
            decode(b"{\"code\":0}"),
            Err(FrameError::Decompress(_))
        ));
    }

    #[test]
    fn rejects_truncated_stream() {
        let frame = gzip(b"{\"dataType\":\"BTC-USDT@kline_1m\"}");
        let truncated = &frame[..frame.len() - 4];
        assert!(matches!(decode(truncated), Err(FrameError::Decompress(_))));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let frame = gzip(&[0x66, 0x6f, 0xff, 0xfe]);
        assert!(matches!(decode(&frame), Err(FrameError::Encoding(_))));
    }

    #[test]
    fn decoding_is_repeatable() {
        let frame = gzip(br#"{"dataType":"x","data":[]}"#);
        assert_eq!(decode(&frame).unwrap(), decode(&frame).unwrap());
    }
}
