//! Chart-ready aggregates over fetched rows. Presentation stays with the host.

use std::collections::BTreeMap;

use crate::error::{AppError, AppResult};
use crate::models::analytic_data::Row;
use crate::models::productivity::{
    CategoryTotal, IntervalBreakdown, IntervalBucket, IntervalGrouping, ProductivityLevel,
    ScoreTotals,
};
use crate::services::productivity_pulse::calculate_pulse;
use crate::utils::time::{format_date_label, format_duration, seconds_to_hours, seconds_to_minutes};

const CATEGORY_LABEL_LIMIT: usize = 15;

fn level_of(row: &Row) -> AppResult<ProductivityLevel> {
    row.productivity
        .ok_or_else(|| AppError::missing_field("productivity"))
}

fn interval_key(row: &Row, grouping: IntervalGrouping) -> String {
    match grouping {
        IntervalGrouping::Hourly => row.timestamp.format("%H:%M").to_string(),
        IntervalGrouping::Daily => row.timestamp.format("%Y-%m-%d").to_string(),
    }
}

/// Seconds per score level and pulse for each hour-of-day or day key with recorded time.
pub fn interval_breakdown(rows: &[Row], grouping: IntervalGrouping) -> AppResult<IntervalBreakdown> {
    let mut grouped: BTreeMap<String, (ScoreTotals, Vec<Row>)> = BTreeMap::new();

    for row in rows {
        let level = level_of(row)?;
        let entry = grouped.entry(interval_key(row, grouping)).or_default();
        entry.0.add(level, row.duration_seconds);
        entry.1.push(row.clone());
    }

    let mut buckets = Vec::with_capacity(grouped.len());
    for (key, (totals, bucket_rows)) in grouped {
        if totals.total() == 0 {
            continue;
        }
        let pulse = calculate_pulse(&bucket_rows)?.pulse;
        let (label, scale): (String, fn(u64) -> f64) = match grouping {
            IntervalGrouping::Hourly => (key.clone(), seconds_to_minutes),
            IntervalGrouping::Daily => (format_date_label(&key), seconds_to_hours),
        };
        buckets.push(IntervalBucket {
            key,
            label,
            values: totals.seconds.map(scale),
            duration_label: format_duration(totals.total()),
            totals,
            pulse,
        });
    }

    Ok(IntervalBreakdown { grouping, buckets })
}

/// Seconds per score level over all rows.
pub fn score_distribution(rows: &[Row]) -> AppResult<ScoreTotals> {
    rows.iter().try_fold(ScoreTotals::default(), |mut totals, row| {
        totals.add(level_of(row)?, row.duration_seconds);
        Ok(totals)
    })
}

/// The `top_n` categories by recorded time, largest first.
///
/// Requires category, activity and productivity on every row (activity-kind data).
pub fn category_totals(rows: &[Row], top_n: usize) -> AppResult<Vec<CategoryTotal>> {
    let mut grouped: BTreeMap<&str, CategoryTotal> = BTreeMap::new();

    for row in rows {
        let level = level_of(row)?;
        let category = row
            .category
            .as_deref()
            .ok_or_else(|| AppError::missing_field("category"))?;
        let activity = row
            .activity
            .as_deref()
            .ok_or_else(|| AppError::missing_field("activity"))?;

        let entry = grouped.entry(category).or_insert_with(|| CategoryTotal {
            category: category.to_string(),
            label: shorten_category_label(category),
            seconds: 0,
            minutes: 0.0,
            duration_label: String::new(),
            productivity: level,
            activities: Vec::new(),
        });
        entry.seconds += row.duration_seconds;
        entry.productivity = level;
        if !entry.activities.iter().any(|known| known == activity) {
            entry.activities.push(activity.to_string());
        }
    }

    let mut totals: Vec<CategoryTotal> = grouped
        .into_values()
        .map(|mut total| {
            total.minutes = seconds_to_minutes(total.seconds);
            total.duration_label = format_duration(total.seconds);
            total
        })
        .collect();
    totals.sort_by(|a, b| b.seconds.cmp(&a.seconds));
    totals.truncate(top_n);
    Ok(totals)
}

/// `General X` becomes `...X`; anything longer than 15 characters is cut and suffixed with `...`.
pub fn shorten_category_label(category: &str) -> String {
    let label = match category.strip_prefix("General ") {
        Some(rest) => format!("...{rest}"),
        None => category.to_string(),
    };

    if label.chars().count() > CATEGORY_LABEL_LIMIT {
        let truncated: String = label.chars().take(CATEGORY_LABEL_LIMIT).collect();
        format!("{truncated}...")
    } else {
        label
    }
}
