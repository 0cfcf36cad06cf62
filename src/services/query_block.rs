use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, AppResult};
use crate::models::analytic_data::Period;

/// The API keeps 92 days of history and serves at most 31 days per query.
const HISTORY_LIMIT_DAYS: i64 = 93;
const MAX_SPAN_DAYS: i64 = 32;

static QUERY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^FROM (\d{4}-\d{2}-\d{2}) TO (\d{4}-\d{2}-\d{2})$").expect("static query pattern")
});

/// Parse a `FROM YYYY-MM-DD TO YYYY-MM-DD` block into a period, checked against `today`.
pub fn parse_query_block(source: &str, today: NaiveDate) -> AppResult<Period> {
    let captures = QUERY_PATTERN.captures(source.trim()).ok_or_else(|| {
        AppError::validation("Invalid format. Expected 'FROM YYYY-MM-DD TO YYYY-MM-DD'.")
    })?;

    let start_text = &captures[1];
    let end_text = &captures[2];
    let (Ok(start), Ok(end)) = (
        NaiveDate::parse_from_str(start_text, "%Y-%m-%d"),
        NaiveDate::parse_from_str(end_text, "%Y-%m-%d"),
    ) else {
        return Err(AppError::validation("Invalid date format."));
    };

    if start > end {
        return Err(AppError::validation(
            "Start date must come before the end date.",
        ));
    }

    if start <= today - Duration::days(HISTORY_LIMIT_DAYS) {
        return Err(AppError::validation(
            "Start date must be 92 or less days before today.",
        ));
    }

    if (end - start).num_days() >= MAX_SPAN_DAYS {
        return Err(AppError::validation(
            "The period specified between start date and end date must span 31 days or less.",
        ));
    }

    Ok(Period::new(start_text, end_text))
}
