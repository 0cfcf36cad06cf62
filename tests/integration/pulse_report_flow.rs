mod support;

use std::sync::Arc;

use chrono::NaiveDate;
use rescuetime_pulse_lib::commands::pulse::{
    dashboard_keys, pulse_report_for_day, pulse_series, start_refresh, test_connection,
    today_dashboard_for_day, today_pulse,
};
use rescuetime_pulse_lib::commands::AppState;
use rescuetime_pulse_lib::error::FetchError;
use rescuetime_pulse_lib::models::analytic_data::{ApiStatus, Period};
use rescuetime_pulse_lib::models::productivity::{IntervalGrouping, ProductivityLevel};
use support::{activity_payload, config, productivity_payload, ScriptedFetcher};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).expect("today")
}

fn state_with(fetcher: &Arc<ScriptedFetcher>) -> AppState {
    let fetcher: Arc<ScriptedFetcher> = Arc::clone(fetcher);
    AppState::with_fetcher(config(), fetcher).expect("state")
}

#[tokio::test]
async fn report_combines_pulse_daily_breakdown_and_distribution() {
    let fetcher = Arc::new(ScriptedFetcher::new(Ok(productivity_payload(&[
        ("2024-03-01T00:00:00", 3600, 2),
        ("2024-03-02T00:00:00", 3600, -2),
    ]))));
    let state = state_with(&fetcher);

    let report = pulse_report_for_day(&state, "FROM 2024-03-01 TO 2024-03-02", today())
        .await
        .expect("report");

    assert!((report.pulse - 50.0).abs() < 1e-9);
    assert_eq!(report.total_seconds, 7200);
    assert_eq!(report.period, Period::new("2024-03-01", "2024-03-02"));

    assert_eq!(report.daily.grouping, IntervalGrouping::Daily);
    let pulses: Vec<f64> = report.daily.buckets.iter().map(|b| b.pulse).collect();
    assert_eq!(pulses, vec![100.0, 0.0]);
    assert_eq!(report.daily.buckets[0].label, "Fri 03/01");

    let very_productive = ProductivityLevel::new(2).expect("level");
    assert_eq!(report.distribution.get(very_productive), 3600);
    assert!((report.distribution.percentage(very_productive) - 50.0).abs() < 1e-9);

    let url = &fetcher.urls()[0];
    assert!(url.contains("interval=day"));
    assert!(url.contains("restrict_kind=productivity"));
    assert!(url.contains("restrict_end=2024-03-02"));
}

#[tokio::test]
async fn report_is_served_from_cache_on_second_call() {
    let fetcher = Arc::new(ScriptedFetcher::new(Ok(productivity_payload(&[(
        "2024-03-05T00:00:00",
        1800,
        1,
    )]))));
    let state = state_with(&fetcher);

    for _ in 0..2 {
        let report = pulse_report_for_day(&state, "FROM 2024-03-05 TO 2024-03-05", today())
            .await
            .expect("report");
        assert!((report.pulse - 75.0).abs() < 1e-9);
    }
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(state.store().len(), 1);
}

#[tokio::test]
async fn invalid_block_never_reaches_the_api() {
    let fetcher = Arc::new(ScriptedFetcher::new(Err(FetchError::other("unused"))));
    let state = state_with(&fetcher);

    let error = pulse_report_for_day(&state, "FROM 2024-03-05", today())
        .await
        .expect_err("invalid block");

    assert_eq!(error.code, "VALIDATION_ERROR");
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn unavailable_data_surfaces_status_message() {
    let fetcher = Arc::new(ScriptedFetcher::new(Err(FetchError::query(
        "HTTP error. Status: 403",
    ))));
    let state = state_with(&fetcher);

    let error = pulse_report_for_day(&state, "FROM 2024-03-05 TO 2024-03-06", today())
        .await
        .expect_err("unavailable");

    assert_eq!(error.code, "DATA_UNAVAILABLE");
    assert_eq!(
        error.message,
        "API request failed. Check your API key in the plugin setting."
    );
    assert_eq!(
        error.details.as_ref().and_then(|d| d.get("status")).and_then(|s| s.as_str()),
        Some("INVALID_PARAM")
    );
}

#[tokio::test]
async fn today_pulse_is_rounded_status_text() {
    let fetcher = Arc::new(ScriptedFetcher::new(Ok(activity_payload(&[
        ("2024-03-10T09:00:00", 200, "vscode", "Software Development", 1),
        ("2024-03-10T10:00:00", 100, "slack", "Communication & Scheduling", 0),
    ]))));
    let state = state_with(&fetcher);

    // (3 * 200 + 2 * 100) / (300 * 4) = 66.67
    let text = today_pulse(&state).await.expect("text");
    assert_eq!(text, "Today's productivity pulse: 67");
    assert!(fetcher.urls()[0].contains("interval=hour"));
    assert!(fetcher.urls()[0].contains("restrict_kind=activity"));
}

#[tokio::test]
async fn dashboard_combines_activity_aggregates_and_minute_series() {
    let fetcher = Arc::new(
        ScriptedFetcher::new(Ok(productivity_payload(&[
            ("2024-03-10T09:00:00", 300, 2),
            ("2024-03-10T09:05:00", 300, 0),
        ])))
        .then(Ok(activity_payload(&[
            ("2024-03-10T09:00:00", 1800, "vscode", "Software Development", 2),
            ("2024-03-10T09:00:00", 600, "slack", "Communication & Scheduling", 0),
            ("2024-03-10T10:00:00", 600, "youtube.com", "Video", -2),
        ]))),
    );
    let state = state_with(&fetcher);

    let dashboard = today_dashboard_for_day(&state, today()).await.expect("dashboard");

    // (4 * 1800 + 2 * 600) / (3000 * 4) = 70
    assert!((dashboard.pulse - 70.0).abs() < 1e-9);
    assert_eq!(dashboard.status_text, "Today's productivity pulse: 70");
    assert_eq!(dashboard.total_seconds, 3000);
    assert_eq!(dashboard.period, Period::new("2024-03-10", "2024-03-10"));

    assert_eq!(dashboard.hourly.grouping, IntervalGrouping::Hourly);
    let keys: Vec<&str> = dashboard.hourly.buckets.iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["09:00", "10:00"]);
    assert!((dashboard.hourly.buckets[0].pulse - 87.5).abs() < 1e-9);
    assert_eq!(dashboard.hourly.buckets[0].values[4], 30.0);
    assert_eq!(dashboard.hourly.buckets[0].duration_label, "40:00");

    let distracting = ProductivityLevel::new(-2).expect("level");
    assert_eq!(dashboard.distribution.get(distracting), 600);

    assert_eq!(dashboard.categories.len(), 3);
    assert_eq!(dashboard.categories[0].category, "Software Development");
    assert_eq!(dashboard.categories[0].minutes, 30.0);

    let pulses: Vec<Option<f64>> = dashboard.series.iter().map(|point| point.pulse).collect();
    assert_eq!(pulses, vec![Some(100.0), Some(75.0)]);
    assert_eq!(dashboard.series_status, None);

    let urls = fetcher.urls();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].contains("restrict_kind=activity"));
    assert!(urls[0].contains("interval=hour"));
    assert!(urls[1].contains("restrict_kind=productivity"));
    assert!(urls[1].contains("interval=minute"));
}

#[tokio::test]
async fn dashboard_keeps_aggregates_when_series_is_unavailable() {
    let fetcher = Arc::new(
        ScriptedFetcher::new(Err(FetchError::internet("connection reset"))).then(Ok(
            activity_payload(&[("2024-03-10T09:00:00", 600, "vscode", "Software Development", 2)]),
        )),
    );
    let state = state_with(&fetcher);

    let dashboard = today_dashboard_for_day(&state, today()).await.expect("dashboard");

    assert_eq!(dashboard.pulse, 100.0);
    assert!(dashboard.series.is_empty());
    assert_eq!(dashboard.series_status, Some(ApiStatus::Unreachable));
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn dashboard_fails_without_activity_data() {
    let fetcher = Arc::new(ScriptedFetcher::new(Ok(productivity_payload(&[]))));
    let state = state_with(&fetcher);

    let error = today_dashboard_for_day(&state, today())
        .await
        .expect_err("no activity rows");

    assert_eq!(error.code, "DATA_UNAVAILABLE");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn series_uses_minute_resolution_and_five_minute_buckets() {
    let fetcher = Arc::new(ScriptedFetcher::new(Ok(productivity_payload(&[
        ("2024-03-01T09:00:00", 300, 2),
        ("2024-03-01T09:15:00", 300, -2),
    ]))));
    let state = state_with(&fetcher);

    let series = pulse_series(&state, Period::new("2024-03-01", "2024-03-01"))
        .await
        .expect("series");

    assert_eq!(series.len(), 4);
    assert_eq!(series[0].pulse, Some(100.0));
    assert_eq!(series[1].pulse, None);
    assert_eq!(series[2].pulse, None);
    assert_eq!(series[3].pulse, Some(50.0));
    assert!(fetcher.urls()[0].contains("interval=minute"));
}

#[tokio::test]
async fn connection_test_reports_user_facing_error() {
    let fetcher = Arc::new(ScriptedFetcher::new(Err(FetchError::internet("dns failure"))));
    let state = state_with(&fetcher);

    let error = test_connection(&state, "some-key").await.expect_err("offline");
    assert_eq!(error.code, "FETCH_FAILED");
    assert_eq!(error.message, "Internet connection error.");
    assert!(fetcher.urls()[0].contains("restrict_begin=2023-08-23"));

    let blank = test_connection(&state, "   ").await.expect_err("blank key");
    assert_eq!(blank.code, "VALIDATION_ERROR");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn refresh_starts_once_over_both_dashboard_queries() {
    let fetcher = Arc::new(ScriptedFetcher::new(Err(FetchError::internet("offline"))));
    let state = state_with(&fetcher);

    let [activity, minute] = dashboard_keys(today());
    assert_eq!(activity.period, minute.period);
    assert_ne!(activity.kind, minute.kind);

    assert!(start_refresh(&state).expect("start"));
    assert!(!start_refresh(&state).expect("already running"));
}
