//! Candle boundary behaviour of the aggregator.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use kline_streamer::aggregator::{CandleAggregator, OrderingAnomaly};
use kline_streamer::models::candle::{Candle, CandleEvent, Tick};

fn tick(bucket_start: i64, close: Decimal) -> Tick {
    Tick {
        bucket_start,
        open: dec!(10),
        high: dec!(25),
        low: dec!(5),
        close,
        volume: dec!(1),
    }
}

fn candle(bucket_start: i64, close: Decimal) -> Candle {
    Candle::from(tick(bucket_start, close))
}

/// Ingests every tick, collecting events and ignoring anomalies.
fn run(agg: &mut CandleAggregator, ticks: &[Tick]) -> Vec<CandleEvent> {
    ticks
        .iter()
        .filter_map(|t| agg.ingest(*t).ok())
        .flat_map(|ingested| ingested.events())
        .collect()
}

#[test]
fn test_same_bucket_updates_then_next_bucket_closes() {
    let mut agg = CandleAggregator::new();
    let events = run(
        &mut agg,
        &[
            tick(1000, dec!(10)),
            tick(1000, dec!(11)),
            tick(2000, dec!(20)),
        ],
    );

    assert_eq!(
        events,
        vec![
            CandleEvent::Opened(candle(1000, dec!(10))),
            CandleEvent::Opened(candle(1000, dec!(11))),
            CandleEvent::Closed(candle(1000, dec!(11))),
            CandleEvent::Opened(candle(2000, dec!(20))),
        ]
    );
}

#[test]
fn test_first_tick_never_closes() {
    let mut agg = CandleAggregator::new();
    let events = run(&mut agg, &[tick(5000, dec!(1))]);

    assert_eq!(events, vec![CandleEvent::Opened(candle(5000, dec!(1)))]);
}

#[test]
fn test_earlier_bucket_emits_nothing() {
    let mut agg = CandleAggregator::new();
    run(&mut agg, &[tick(2000, dec!(20)), tick(2000, dec!(21))]);

    let result = agg.ingest(tick(1000, dec!(9)));

    assert_eq!(
        result,
        Err(OrderingAnomaly {
            tracked: 2000,
            received: 1000
        })
    );
    assert_eq!(agg.tracked_bucket(), Some(2000));
    assert_eq!(agg.current(), Some(&candle(2000, dec!(21))));

    // The next in-order tick still closes the untouched candle.
    let events = run(&mut agg, &[tick(3000, dec!(30))]);
    assert_eq!(events[0], CandleEvent::Closed(candle(2000, dec!(21))));
}

#[test]
fn test_single_open_candle_tracks_greatest_bucket() {
    let buckets = [0, 0, 60_000, 60_000, 60_000, 120_000, 300_000, 300_000];
    let mut agg = CandleAggregator::new();

    for (i, bucket) in buckets.iter().enumerate() {
        agg.ingest(tick(*bucket, Decimal::from(i))).unwrap();
        assert_eq!(agg.tracked_bucket(), Some(*bucket));
        assert_eq!(agg.current().map(|c| c.bucket_start), Some(*bucket));
    }
}

#[test]
fn test_each_bucket_closes_once_with_last_tick() {
    let ticks: Vec<Tick> = [(0, 1), (0, 2), (60, 3), (120, 4), (120, 5), (120, 6), (180, 7)]
        .iter()
        .map(|(b, c)| tick(*b, Decimal::from(*c)))
        .collect();
    let mut agg = CandleAggregator::new();
    let events = run(&mut agg, &ticks);

    let closed: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            CandleEvent::Closed(c) => Some((c.bucket_start, c.close)),
            CandleEvent::Opened(_) => None,
        })
        .collect();

    assert_eq!(
        closed,
        vec![(0, dec!(2)), (60, dec!(3)), (120, dec!(6))]
    );
}

#[test]
fn test_updates_preserve_tick_order() {
    let ticks: Vec<Tick> = (1..=5).map(|c| tick(0, Decimal::from(c))).collect();
    let mut agg = CandleAggregator::new();
    let events = run(&mut agg, &ticks);

    let closes: Vec<_> = events.iter().map(|e| e.candle().close).collect();
    assert_eq!(
        closes,
        vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)]
    );
}
