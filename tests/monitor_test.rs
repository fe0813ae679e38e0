//! Tests for the call monitor: bounded log, recent ordering and windowed
//! aggregation.

use std::sync::Arc;

use chrono::{TimeDelta, TimeZone, Utc};

use shotterms::{CallMonitor, Clock, ManualClock, MemoryStore, MonitorConfig};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 8, 10, 12, 0, 0).unwrap(),
    ))
}

fn monitor(clock: Arc<ManualClock>, config: MonitorConfig) -> CallMonitor {
    CallMonitor::new(Arc::new(MemoryStore::new()), clock, config)
}

#[tokio::test]
async fn recent_is_newest_first_and_limited() {
    let clock = clock();
    let monitor = monitor(clock.clone(), MonitorConfig::default());

    for i in 0..5 {
        monitor.record(&format!("call {i}"), true, 10, false, None).await;
        clock.advance(TimeDelta::seconds(1));
    }

    let recent = monitor.recent(3).await;
    let inputs: Vec<_> = recent.iter().map(|r| r.input.as_str()).collect();
    assert_eq!(inputs, vec!["call 4", "call 3", "call 2"]);
    assert!(recent[0].timestamp > recent[1].timestamp);
}

#[tokio::test]
async fn recent_returns_an_independent_snapshot() {
    let monitor = monitor(clock(), MonitorConfig::default());
    monitor.record("a", true, 1, false, None).await;

    let mut first = monitor.recent(10).await;
    first.clear();
    assert_eq!(monitor.recent(10).await.len(), 1);
}

#[tokio::test]
async fn log_keeps_only_most_recent_records() {
    let monitor = monitor(clock(), MonitorConfig::new().max_records(5));

    for i in 0..8 {
        monitor.record(&i.to_string(), true, 1, false, None).await;
    }

    let recent = monitor.recent(100).await;
    let inputs: Vec<_> = recent.iter().map(|r| r.input.as_str()).collect();
    assert_eq!(inputs, vec!["7", "6", "5", "4", "3"]);
}

#[tokio::test]
async fn input_is_truncated() {
    let monitor = monitor(clock(), MonitorConfig::default());
    let long = "镜".repeat(250);

    monitor.record(&long, true, 1, false, None).await;

    let record = &monitor.recent(1).await[0];
    assert_eq!(record.input.chars().count(), 100);
}

#[tokio::test]
async fn failure_keeps_error_message() {
    let monitor = monitor(clock(), MonitorConfig::default());
    monitor
        .record("x", false, 30, false, Some("HTTP 500".into()))
        .await;

    let record = &monitor.recent(1).await[0];
    assert!(!record.success);
    assert_eq!(record.error.as_deref(), Some("HTTP 500"));
}

#[tokio::test]
async fn window_stats_only_count_recent_days() {
    let clock = clock();
    let monitor = monitor(clock.clone(), MonitorConfig::new().cost_per_call(0.01));

    monitor.record("old", true, 100, false, None).await;
    clock.advance(TimeDelta::days(10));
    monitor.record("hit", true, 0, true, None).await;
    monitor.record("api", true, 200, false, None).await;
    monitor
        .record("fail", false, 400, false, Some("boom".into()))
        .await;

    let week = monitor.stats_window(7).await;
    assert_eq!(week.total, 3);
    assert_eq!(week.success_count, 2);
    assert_eq!(week.failure_count, 1);
    assert_eq!(week.cached_count, 1);
    assert_eq!(week.api_call_count, 1);
    assert!((week.success_rate - 200.0 / 3.0).abs() < 1e-9);
    assert!((week.cache_hit_rate - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(week.avg_duration_ms, 200.0);
    assert!((week.total_cost - 0.01).abs() < 1e-12);

    let month = monitor.stats_window(30).await;
    assert_eq!(month.total, 4);
    assert_eq!(month.api_call_count, 2);
}

#[tokio::test]
async fn unbounded_window_counts_every_record() {
    let clock = clock();
    let monitor = monitor(clock.clone(), MonitorConfig::default());

    monitor.record("old", true, 100, false, None).await;
    clock.advance(TimeDelta::days(400));
    monitor.record("new", true, 100, false, None).await;

    let all = monitor.stats_window(u32::MAX).await;
    assert_eq!(all.total, 2);
}

#[tokio::test]
async fn today_stats_follow_the_calendar_day() {
    let clock = clock();
    let monitor = monitor(clock.clone(), MonitorConfig::default());

    monitor.record("yesterday", true, 10, false, None).await;
    clock.advance(TimeDelta::days(1));
    monitor.record("today", true, 10, false, None).await;

    let today = monitor.stats_today().await;
    assert_eq!(today.total, 1);
    assert_eq!(
        shotterms::clock::local_date(monitor.recent(1).await[0].timestamp),
        clock.today()
    );
}

#[tokio::test]
async fn empty_log_aggregates_to_zero() {
    let monitor = monitor(clock(), MonitorConfig::default());
    let stats = monitor.stats_window(7).await;
    assert_eq!(stats.total, 0);
    assert_eq!(stats.success_rate, 0.0);
    assert_eq!(stats.cache_hit_rate, 0.0);
    assert_eq!(stats.avg_duration_ms, 0.0);
    assert_eq!(stats.total_cost, 0.0);
}

#[tokio::test]
async fn clear_drops_all_records() {
    let monitor = monitor(clock(), MonitorConfig::default());
    monitor.record("a", true, 1, false, None).await;
    monitor.clear().await;
    assert!(monitor.recent(10).await.is_empty());
    assert_eq!(monitor.stats_today().await.total, 0);
}
