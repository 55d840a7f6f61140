//! End-to-end pipeline tests from compressed frames to candle events.

mod common;

use std::cell::RefCell;

use rust_decimal_macros::dec;

use kline_streamer::models::candle::Candle;
use kline_streamer::sink::{ClosedCandles, Handlers};
use kline_streamer::stream::{FrameOutcome, KlineStream};
use kline_streamer::subscription::Subscription;

use common::{gzip, kline_json};

fn subscription() -> Subscription {
    Subscription::with_id("BTC-USDT", "1m", "stream-test")
}

#[test]
fn test_ping_frame_is_keepalive_without_events() {
    let mut stream = KlineStream::new(subscription(), ClosedCandles::new());

    let outcome = stream.handle_frame(&gzip("Ping")).expect("Failed to handle frame");

    assert_eq!(outcome, FrameOutcome::KeepAlive);
    assert!(stream.sink().is_empty());
    assert!(stream.aggregator().current().is_none());
}

#[test]
fn test_frames_drive_update_and_close_handlers() {
    let updates = RefCell::new(Vec::new());
    let closes = RefCell::new(Vec::new());
    let sink = Handlers::new(
        |c: &Candle| updates.borrow_mut().push((c.bucket_start, c.close)),
        |c: &Candle| closes.borrow_mut().push((c.bucket_start, c.close)),
    );
    let mut stream = KlineStream::new(subscription(), sink);

    let frames = [
        gzip(r#"{"id":"stream-test","code":0,"msg":""}"#),
        gzip(&kline_json(60_000, "101")),
        gzip("Ping"),
        gzip(&kline_json(60_000, "102")),
        gzip(&kline_json(120_000, "99")),
    ];
    let outcomes: Vec<_> = frames
        .iter()
        .map(|f| stream.handle_frame(f).expect("Failed to handle frame"))
        .collect();

    assert_eq!(
        outcomes,
        vec![
            FrameOutcome::Acknowledged,
            FrameOutcome::Ticks(1),
            FrameOutcome::KeepAlive,
            FrameOutcome::Ticks(1),
            FrameOutcome::Ticks(1),
        ]
    );
    drop(stream);

    assert_eq!(
        updates.into_inner(),
        vec![(60_000, dec!(101)), (60_000, dec!(102)), (120_000, dec!(99))]
    );
    assert_eq!(closes.into_inner(), vec![(60_000, dec!(102))]);
}

#[test]
fn test_batch_closes_inside_one_frame() {
    let text = r#"{"dataType":"BTC-USDT@kline_1m","data":[
        {"T":0,"o":"1","h":"1","l":"1","c":"1","v":"1"},
        {"T":60000,"o":"2","h":"2","l":"2","c":"2","v":"2"},
        {"T":60000,"o":"2","h":"3","l":"2","c":"3","v":"4"}
    ]}"#;
    let mut stream = KlineStream::new(subscription(), ClosedCandles::new());

    let outcome = stream.handle_frame(&gzip(text)).expect("Failed to handle frame");

    assert_eq!(outcome, FrameOutcome::Ticks(3));
    assert_eq!(stream.sink().len(), 1);
    assert_eq!(stream.sink().get(0).map(|c| c.close), Some(dec!(1)));
    assert_eq!(stream.aggregator().current().map(|c| c.close), Some(dec!(3)));
}

#[test]
fn test_corrupt_and_foreign_frames_do_not_disturb_state() {
    let mut stream = KlineStream::new(subscription(), ClosedCandles::new());
    stream
        .handle_frame(&gzip(&kline_json(60_000, "101")))
        .expect("Failed to handle frame");

    let mut corrupt = gzip(&kline_json(120_000, "1"));
    corrupt.truncate(corrupt.len() / 2);
    let foreign = r#"{"dataType":"ETH-USDT@kline_1m","data":[{"T":120000,"o":"1","h":"1","l":"1","c":"1","v":"1"}]}"#;

    assert_eq!(
        stream.handle_frame(&corrupt).expect("Failed to handle frame"),
        FrameOutcome::Discarded
    );
    assert_eq!(
        stream.handle_frame(&gzip("{oops")).expect("Failed to handle frame"),
        FrameOutcome::Discarded
    );
    assert_eq!(
        stream.handle_frame(&gzip(foreign)).expect("Failed to handle frame"),
        FrameOutcome::Unrecognized
    );

    assert!(stream.sink().is_empty());
    assert_eq!(stream.aggregator().tracked_bucket(), Some(60_000));
}
