use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;

use crate::error::{AppError, AppResult};
use crate::models::analytic_data::{RestrictKind, Row};
use crate::models::productivity::ProductivityLevel;

const HEADER_DATE: &str = "Date";
const HEADER_TIME_SPENT: &str = "Time Spent (seconds)";
const HEADER_PEOPLE: &str = "Number of People";
const HEADER_ACTIVITY: &str = "Activity";
const HEADER_CATEGORY: &str = "Category";
const HEADER_PRODUCTIVITY: &str = "Productivity";

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Column headers the API is expected to return for each kind, in order.
pub fn expected_headers(kind: RestrictKind) -> &'static [&'static str] {
    match kind {
        RestrictKind::Activity => &[
            HEADER_DATE,
            HEADER_TIME_SPENT,
            HEADER_PEOPLE,
            HEADER_ACTIVITY,
            HEADER_CATEGORY,
            HEADER_PRODUCTIVITY,
        ],
        RestrictKind::Overview => &[HEADER_DATE, HEADER_TIME_SPENT, HEADER_PEOPLE, HEADER_CATEGORY],
        RestrictKind::Productivity => &[
            HEADER_DATE,
            HEADER_TIME_SPENT,
            HEADER_PEOPLE,
            HEADER_PRODUCTIVITY,
        ],
    }
}

pub fn validate_headers(actual: &[String], kind: RestrictKind) -> bool {
    let expected = expected_headers(kind);
    actual.len() == expected.len()
        && actual
            .iter()
            .zip(expected.iter())
            .all(|(actual, expected)| actual == expected)
}

pub fn convert_rows(rows: &[Vec<JsonValue>], kind: RestrictKind) -> AppResult<Vec<Row>> {
    rows.iter()
        .enumerate()
        .map(|(index, values)| {
            array_to_row(values, kind)
                .map_err(|reason| AppError::unexpected_data(format!("row {index}: {reason}")))
        })
        .collect()
}

fn array_to_row(values: &[JsonValue], kind: RestrictKind) -> Result<Row, String> {
    let width = expected_headers(kind).len();
    if values.len() != width {
        return Err(format!("expected {width} fields, got {}", values.len()));
    }

    let timestamp = parse_timestamp(&values[0])?;
    let duration_seconds = parse_seconds(&values[1])?;
    let people_count = parse_people(&values[2])?;

    let (activity, category, productivity) = match kind {
        RestrictKind::Activity => (
            Some(parse_text(&values[3], HEADER_ACTIVITY)?),
            Some(parse_text(&values[4], HEADER_CATEGORY)?),
            Some(parse_productivity(&values[5])?),
        ),
        RestrictKind::Overview => (None, Some(parse_text(&values[3], HEADER_CATEGORY)?), None),
        RestrictKind::Productivity => (None, None, Some(parse_productivity(&values[3])?)),
    };

    Ok(Row {
        timestamp,
        duration_seconds,
        people_count,
        activity,
        category,
        productivity,
    })
}

fn parse_timestamp(value: &JsonValue) -> Result<NaiveDateTime, String> {
    let text = value
        .as_str()
        .ok_or_else(|| format!("{HEADER_DATE} is not a string: {value}"))?;

    NaiveDateTime::parse_from_str(text, DATE_TIME_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|err| format!("invalid {HEADER_DATE} {text:?}: {err}"))
}

fn parse_seconds(value: &JsonValue) -> Result<u64, String> {
    if let Some(seconds) = value.as_u64() {
        return Ok(seconds);
    }
    match value.as_f64() {
        Some(seconds) if seconds >= 0.0 && seconds.is_finite() => Ok(seconds.round() as u64),
        _ => Err(format!("invalid {HEADER_TIME_SPENT}: {value}")),
    }
}

fn parse_people(value: &JsonValue) -> Result<u32, String> {
    value
        .as_u64()
        .and_then(|count| u32::try_from(count).ok())
        .ok_or_else(|| format!("invalid {HEADER_PEOPLE}: {value}"))
}

fn parse_text(value: &JsonValue, header: &str) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("{header} is not a string: {value}"))
}

fn parse_productivity(value: &JsonValue) -> Result<ProductivityLevel, String> {
    value
        .as_i64()
        .and_then(|score| i8::try_from(score).ok())
        .and_then(ProductivityLevel::new)
        .ok_or_else(|| format!("invalid {HEADER_PRODUCTIVITY}: {value}"))
}
