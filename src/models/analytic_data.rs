use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::productivity::ProductivityLevel;

/// Inclusive date range requested from the API. Dates are `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: String,
    pub end: String,
}

impl Period {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn single_day(date: NaiveDate) -> Self {
        let day = date.format("%Y-%m-%d").to_string();
        Self::new(day.clone(), day)
    }

    pub fn today() -> Self {
        Self::single_day(Local::now().date_naive())
    }
}

impl Default for Period {
    fn default() -> Self {
        Self::today()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Month,
    Week,
    Day,
    #[default]
    Hour,
    /// The API reports minute resolution as 5-minute intervals.
    Minute,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Month => "month",
            Resolution::Week => "week",
            Resolution::Day => "day",
            Resolution::Hour => "hour",
            Resolution::Minute => "minute",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RestrictKind {
    Activity,
    Overview,
    #[default]
    Productivity,
}

impl RestrictKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RestrictKind::Activity => "activity",
            RestrictKind::Overview => "overview",
            RestrictKind::Productivity => "productivity",
        }
    }
}

/// Cache identity of one API query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryKey {
    pub period: Period,
    pub resolution: Resolution,
    pub kind: RestrictKind,
}

impl QueryKey {
    pub fn new(period: Period, resolution: Resolution, kind: RestrictKind) -> Self {
        Self {
            period,
            resolution,
            kind,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}/{}/{}",
            self.period.start,
            self.period.end,
            self.resolution.as_str(),
            self.kind.as_str()
        )
    }
}

/// Retrieval status, declared best to worst. The declaration order is the quality rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiStatus {
    Available,
    EmptyData,
    UnexpectedDatatype,
    InvalidParam,
    Unreachable,
    Untested,
    Unknown,
}

impl ApiStatus {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApiStatus::Available => "AVAILABLE",
            ApiStatus::EmptyData => "EMPTY_DATA",
            ApiStatus::UnexpectedDatatype => "UNEXPECTED_DATATYPE",
            ApiStatus::InvalidParam => "INVALID_PARAM",
            ApiStatus::Unreachable => "UNREACHABLE",
            ApiStatus::Untested => "UNTESTED",
            ApiStatus::Unknown => "UNKNOWN",
        }
    }

    /// Human-readable text shown to the user for this status.
    pub fn message(self) -> &'static str {
        match self {
            ApiStatus::Available => "Data is successfully retrieved from API.",
            ApiStatus::EmptyData => {
                "Data is retrieved but empty. Wait until data is logged and sent from your RescueTime client."
            }
            ApiStatus::UnexpectedDatatype => {
                "Unexpected type of data is returned. Kindly notify the developer if you see this."
            }
            ApiStatus::InvalidParam => {
                "API request failed. Check your API key in the plugin setting."
            }
            ApiStatus::Unreachable => "Internet connection error.",
            ApiStatus::Untested => "API is still untested",
            ApiStatus::Unknown => "Unknown error. Kindly notify the developer if you see this.",
        }
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// One normalized interval record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub timestamp: NaiveDateTime,
    pub duration_seconds: u64,
    pub people_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub productivity: Option<ProductivityLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FetchStatus {
    Available { rows: Vec<Row> },
    EmptyData,
    UnexpectedDatatype,
    InvalidParam,
    Unreachable,
    Unknown,
}

impl FetchStatus {
    pub fn api_status(&self) -> ApiStatus {
        match self {
            FetchStatus::Available { .. } => ApiStatus::Available,
            FetchStatus::EmptyData => ApiStatus::EmptyData,
            FetchStatus::UnexpectedDatatype => ApiStatus::UnexpectedDatatype,
            FetchStatus::InvalidParam => ApiStatus::InvalidParam,
            FetchStatus::Unreachable => ApiStatus::Unreachable,
            FetchStatus::Unknown => ApiStatus::Unknown,
        }
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            FetchStatus::Available { rows } => Some(rows),
            _ => None,
        }
    }
}

/// Result of one fetch, tagged with the query that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub key: QueryKey,
    #[serde(flatten)]
    pub status: FetchStatus,
}

impl FetchOutcome {
    pub fn new(key: QueryKey, status: FetchStatus) -> Self {
        Self { key, status }
    }

    pub fn available(key: QueryKey, rows: Vec<Row>) -> Self {
        Self::new(key, FetchStatus::Available { rows })
    }

    pub fn api_status(&self) -> ApiStatus {
        self.status.api_status()
    }

    pub fn rows(&self) -> Option<&[Row]> {
        self.status.rows()
    }

    pub fn row_count(&self) -> usize {
        self.rows().map_or(0, <[Row]>::len)
    }

    /// Available with at least one row.
    pub fn is_usable(&self) -> bool {
        self.row_count() > 0
    }
}

/// Payload returned by the analytic data endpoint before conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnalyticData {
    #[serde(default)]
    pub notes: String,
    pub row_headers: Vec<String>,
    pub rows: Vec<Vec<JsonValue>>,
}
