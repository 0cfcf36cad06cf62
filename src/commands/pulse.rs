use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::analytic_data::{Period, QueryKey, Resolution, RestrictKind};
use crate::models::productivity::{DashboardReport, IntervalGrouping, PulsePoint, PulseReport};
use crate::services::chart_data::{category_totals, interval_breakdown, score_distribution};
use crate::services::productivity_pulse::{
    calculate_pulse, calculate_pulse_series, default_bucket_width,
};
use crate::services::query_block::parse_query_block;

use super::{AppState, CommandError, CommandResult};

const TOP_CATEGORIES: usize = 7;

fn status_text(pulse: f64) -> String {
    format!("Today's productivity pulse: {}", pulse.round())
}

/// Queries behind the dashboard for `day`: hourly activity rows, then minute productivity rows.
pub fn dashboard_keys(day: NaiveDate) -> [QueryKey; 2] {
    let period = Period::single_day(day);
    [
        QueryKey::new(period.clone(), Resolution::Hour, RestrictKind::Activity),
        QueryKey::new(period, Resolution::Minute, RestrictKind::Productivity),
    ]
}

/// Report for a `FROM ... TO ...` block, validated against the local date.
pub async fn pulse_report(state: &AppState, source: &str) -> CommandResult<PulseReport> {
    pulse_report_for_day(state, source, Local::now().date_naive()).await
}

pub async fn pulse_report_for_day(
    state: &AppState,
    source: &str,
    today: NaiveDate,
) -> CommandResult<PulseReport> {
    let period = parse_query_block(source, today)?;
    let key = QueryKey::new(period.clone(), Resolution::Day, RestrictKind::Productivity);
    let outcome = state.data().fetch_and_process(&key).await?;
    let rows = outcome.rows().unwrap_or_default();

    let summary = calculate_pulse(rows)?;
    let daily = interval_breakdown(rows, IntervalGrouping::Daily)?;
    let distribution = score_distribution(rows)?;

    info!(
        target: "app::command",
        period = %period,
        pulse = summary.pulse,
        "pulse report built"
    );

    Ok(PulseReport {
        period,
        pulse: summary.pulse,
        total_seconds: summary.total_seconds,
        daily,
        distribution,
    })
}

/// Status bar text for today's pulse.
pub async fn today_pulse(state: &AppState) -> CommandResult<String> {
    let [activity, _] = dashboard_keys(Local::now().date_naive());
    let outcome = state.data().fetch_and_process(&activity).await?;
    let summary = calculate_pulse(outcome.rows().unwrap_or_default())?;
    Ok(status_text(summary.pulse))
}

pub async fn today_dashboard(state: &AppState) -> CommandResult<DashboardReport> {
    today_dashboard_for_day(state, Local::now().date_naive()).await
}

/// Dashboard for `day`. The activity rows are required; a missing minute series
/// leaves `series` empty and records its status.
pub async fn today_dashboard_for_day(
    state: &AppState,
    day: NaiveDate,
) -> CommandResult<DashboardReport> {
    let [activity_key, minute_key] = dashboard_keys(day);

    let outcome = state.data().fetch_and_process(&activity_key).await?;
    let rows = outcome.rows().unwrap_or_default();
    let summary = calculate_pulse(rows)?;
    let hourly = interval_breakdown(rows, IntervalGrouping::Hourly)?;
    let distribution = score_distribution(rows)?;
    let categories = category_totals(rows, TOP_CATEGORIES)?;

    let (series, series_status) = match state.data().fetch_and_process(&minute_key).await {
        Ok(minute) => (
            calculate_pulse_series(minute.rows().unwrap_or_default(), default_bucket_width())?,
            None,
        ),
        Err(AppError::DataUnavailable { status }) => {
            warn!(
                target: "app::command",
                key = %minute_key,
                status = status.as_str(),
                "pulse series unavailable"
            );
            (Vec::new(), Some(status))
        }
        Err(err) => return Err(err.into()),
    };

    info!(
        target: "app::command",
        period = %activity_key.period,
        pulse = summary.pulse,
        categories = categories.len(),
        points = series.len(),
        "dashboard built"
    );

    Ok(DashboardReport {
        period: activity_key.period,
        pulse: summary.pulse,
        total_seconds: summary.total_seconds,
        status_text: status_text(summary.pulse),
        hourly,
        distribution,
        categories,
        series,
        series_status,
    })
}

/// Pulse sampled every 5 minutes over `period`.
pub async fn pulse_series(state: &AppState, period: Period) -> CommandResult<Vec<PulsePoint>> {
    let key = QueryKey::new(period, Resolution::Minute, RestrictKind::Productivity);
    let outcome = state.data().fetch_and_process(&key).await?;
    Ok(calculate_pulse_series(
        outcome.rows().unwrap_or_default(),
        default_bucket_width(),
    )?)
}

pub async fn test_connection(state: &AppState, api_token: &str) -> CommandResult<()> {
    let token = api_token.trim();
    if token.is_empty() {
        return Err(AppError::validation("API key must not be empty").into());
    }
    state.api().test_connection(token).await.map_err(CommandError::from)
}

/// Start re-polling the dashboard queries on the configured interval. Returns `false` if already running.
pub fn start_refresh(state: &AppState) -> CommandResult<bool> {
    let keys = dashboard_keys(Local::now().date_naive()).to_vec();
    let every = state.config().refresh_interval;
    let handle = state.data().spawn_refresh_job(keys, every)?;
    Ok(handle.is_some())
}
