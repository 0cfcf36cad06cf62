use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::analytic_data::{ApiStatus, Period};

/// RescueTime productivity score, always within [-2, 2].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct ProductivityLevel(i8);

impl ProductivityLevel {
    pub const MIN: i8 = -2;
    pub const MAX: i8 = 2;

    pub const ALL: [ProductivityLevel; 5] = [
        ProductivityLevel(-2),
        ProductivityLevel(-1),
        ProductivityLevel(0),
        ProductivityLevel(1),
        ProductivityLevel(2),
    ];

    pub fn new(value: i8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> i8 {
        self.0
    }

    /// Position of this level in `ALL` (0 for -2, 4 for 2).
    pub fn index(self) -> usize {
        (self.0 - Self::MIN) as usize
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            -2 => "Very distracting",
            -1 => "Distracting",
            0 => "Neutral",
            1 => "Productive",
            _ => "Very productive",
        }
    }

    pub fn color(self) -> &'static str {
        match self.0 {
            -2 => "#d61800",
            -1 => "#dc685a",
            0 => "#cedcdf",
            1 => "#3d80e0",
            _ => "#0055c4",
        }
    }
}

impl TryFrom<i8> for ProductivityLevel {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("productivity score {value} is outside [-2, 2]"))
    }
}

impl From<ProductivityLevel> for i8 {
    fn from(level: ProductivityLevel) -> Self {
        level.0
    }
}

impl fmt::Display for ProductivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseSummary {
    pub pulse: f64,
    pub total_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PulsePoint {
    pub bucket_start: NaiveDateTime,
    /// `None` marks a bucket with no recorded time.
    pub pulse: Option<f64>,
}

/// Seconds spent per productivity level, indexed by `ProductivityLevel::index`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTotals {
    pub seconds: [u64; 5],
}

impl ScoreTotals {
    pub fn add(&mut self, level: ProductivityLevel, seconds: u64) {
        self.seconds[level.index()] += seconds;
    }

    pub fn get(&self, level: ProductivityLevel) -> u64 {
        self.seconds[level.index()]
    }

    pub fn total(&self) -> u64 {
        self.seconds.iter().sum()
    }

    /// Share of `level` in percent, 0 when nothing was recorded.
    pub fn percentage(&self, level: ProductivityLevel) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            100.0 * self.get(level) as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalGrouping {
    Hourly,
    Daily,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalBucket {
    pub key: String,
    pub label: String,
    pub totals: ScoreTotals,
    /// Per-level chart values: minutes for hourly buckets, hours for daily ones.
    pub values: [f64; 5],
    pub duration_label: String,
    pub pulse: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalBreakdown {
    pub grouping: IntervalGrouping,
    pub buckets: Vec<IntervalBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub label: String,
    pub seconds: u64,
    pub minutes: f64,
    pub duration_label: String,
    pub productivity: ProductivityLevel,
    pub activities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PulseReport {
    pub period: Period,
    pub pulse: f64,
    pub total_seconds: u64,
    pub daily: IntervalBreakdown,
    pub distribution: ScoreTotals,
}

/// Today's figures: activity-kind aggregates plus the 5-minute pulse series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub period: Period,
    pub pulse: f64,
    pub total_seconds: u64,
    pub status_text: String,
    pub hourly: IntervalBreakdown,
    pub distribution: ScoreTotals,
    pub categories: Vec<CategoryTotal>,
    pub series: Vec<PulsePoint>,
    /// Set when the minute-resolution series could not be obtained.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_status: Option<ApiStatus>,
}
