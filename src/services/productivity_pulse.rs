//! Productivity pulse: a duration-weighted mapping of scores in [-2, 2] onto 0..=100.

use chrono::Duration;

use crate::error::{AppError, AppResult};
use crate::models::analytic_data::Row;
use crate::models::productivity::{PulsePoint, PulseSummary};

pub const DEFAULT_BUCKET_MINUTES: i64 = 5;

/// Score offset that maps [-2, 2] onto [0, 4].
const SCORE_OFFSET: f64 = 2.0;
const SCORE_SPAN: f64 = 4.0;

pub fn default_bucket_width() -> Duration {
    Duration::minutes(DEFAULT_BUCKET_MINUTES)
}

/// Pulse and total recorded seconds over `rows`.
///
/// Every row must carry a productivity score. A set with no recorded time has pulse 0.
pub fn calculate_pulse(rows: &[Row]) -> AppResult<PulseSummary> {
    summarize(rows)
}

fn summarize<'a>(rows: impl IntoIterator<Item = &'a Row>) -> AppResult<PulseSummary> {
    let mut weighted_sum = 0.0_f64;
    let mut total_seconds = 0_u64;

    for row in rows {
        let level = row
            .productivity
            .ok_or_else(|| AppError::missing_field("productivity"))?;
        weighted_sum += (f64::from(level.value()) + SCORE_OFFSET) * row.duration_seconds as f64;
        total_seconds += row.duration_seconds;
    }

    let pulse = if total_seconds == 0 {
        0.0
    } else {
        100.0 * weighted_sum / (total_seconds as f64 * SCORE_SPAN)
    };

    Ok(PulseSummary {
        pulse,
        total_seconds,
    })
}

/// Cumulative pulse sampled in fixed-width buckets from the first to the last row.
///
/// The first bucket also takes every row before its end. A bucket without
/// recorded time yields `None` and does not move the running average.
pub fn calculate_pulse_series(rows: &[Row], bucket_width: Duration) -> AppResult<Vec<PulsePoint>> {
    if bucket_width <= Duration::zero() {
        return Err(AppError::validation("bucket width must be positive"));
    }

    let mut ordered: Vec<&Row> = rows.iter().collect();
    ordered.sort_by_key(|row| row.timestamp);

    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return Ok(Vec::new());
    };
    let last = last.timestamp;

    let mut series = Vec::new();
    let mut cumulative_pulse = 0.0_f64;
    let mut cumulative_seconds = 0_u64;
    let mut bucket_start = first.timestamp;
    let mut next = 0;

    while bucket_start <= last {
        let bucket_end = bucket_start
            .checked_add_signed(bucket_width)
            .ok_or_else(|| AppError::validation("bucket width exceeds the supported time range"))?;

        let begin = next;
        while next < ordered.len() && ordered[next].timestamp < bucket_end {
            next += 1;
        }

        let PulseSummary {
            pulse,
            total_seconds,
        } = summarize(ordered[begin..next].iter().copied())?;

        if total_seconds == 0 {
            series.push(PulsePoint {
                bucket_start,
                pulse: None,
            });
        } else {
            let combined = cumulative_seconds + total_seconds;
            cumulative_pulse = (cumulative_pulse * cumulative_seconds as f64
                + pulse * total_seconds as f64)
                / combined as f64;
            cumulative_seconds = combined;
            series.push(PulsePoint {
                bucket_start,
                pulse: Some(cumulative_pulse),
            });
        }

        bucket_start = bucket_end;
    }

    Ok(series)
}
