use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, FetchError, FetchErrorKind};
use crate::models::analytic_data::{
    FetchOutcome, FetchStatus, Period, QueryKey, RawAnalyticData, Resolution, RestrictKind,
};
use crate::models::settings::PluginConfig;
use crate::services::fetcher::AnalyticsFetcher;
use crate::services::row_conversion::{convert_rows, validate_headers};

const DATA_PATH: &str = "anapi/data";
const CONNECTION_TEST_DAY: (i32, u32, u32) = (2023, 8, 23);

/// One analytic data query. Defaults: today, hourly, productivity columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub api_token: String,
    pub period: Period,
    pub resolution: Resolution,
    pub kind: RestrictKind,
}

impl FetchRequest {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            period: Period::today(),
            resolution: Resolution::default(),
            kind: RestrictKind::default(),
        }
    }

    pub fn for_key(api_token: impl Into<String>, key: &QueryKey) -> Self {
        Self {
            api_token: api_token.into(),
            period: key.period.clone(),
            resolution: key.resolution,
            kind: key.kind,
        }
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::new(self.period.clone(), self.resolution, self.kind)
    }
}

pub struct AnalyticDataApi {
    fetcher: Arc<dyn AnalyticsFetcher>,
    endpoint: Url,
}

impl AnalyticDataApi {
    pub fn new(config: &PluginConfig, fetcher: Arc<dyn AnalyticsFetcher>) -> AppResult<Self> {
        let base = format!("{}/", config.api_base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join(DATA_PATH))
            .map_err(|err| {
                AppError::validation_with_details(
                    "API base URL is invalid",
                    serde_json::json!({ "baseUrl": config.api_base_url, "reason": err.to_string() }),
                )
            })?;

        Ok(Self { fetcher, endpoint })
    }

    pub fn request_url(&self, request: &FetchRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("key", &request.api_token)
            .append_pair("perspective", "interval")
            .append_pair("interval", request.resolution.as_str())
            .append_pair("restrict_begin", &request.period.start)
            .append_pair("restrict_end", &request.period.end)
            .append_pair("restrict_kind", request.kind.as_str())
            .append_pair("format", "json");
        url
    }

    /// Fetch one query. Transport and data-shape failures come back as outcome statuses.
    pub async fn fetch_data(&self, request: &FetchRequest) -> FetchOutcome {
        let key = request.key();
        let result = self.fetcher.fetch(&self.request_url(request)).await;
        let outcome = classify(key, result);

        debug!(
            target: "app::api",
            key = %outcome.key,
            status = outcome.api_status().as_str(),
            rows = outcome.row_count(),
            "classified fetch result"
        );

        outcome
    }

    /// Issue one request for a fixed past day to check the token and connectivity.
    pub async fn test_connection(&self, api_token: &str) -> AppResult<()> {
        let (year, month, day) = CONNECTION_TEST_DAY;
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| AppError::other("invalid connection test date"))?;
        let request = FetchRequest {
            period: Period::single_day(date),
            ..FetchRequest::new(api_token)
        };

        match self.fetcher.fetch(&self.request_url(&request)).await {
            Ok(_) => {
                info!(target: "app::api", "connection test succeeded");
                Ok(())
            }
            Err(error) => {
                warn!(target: "app::api", kind = %error.kind, "connection test failed");
                Err(AppError::Fetch(error))
            }
        }
    }
}

/// User-facing text for a failed connection test.
pub fn connection_error_message(error: &FetchError) -> String {
    match error.kind {
        FetchErrorKind::Query => format!("API request failed. Check your API key. {}", error.message),
        FetchErrorKind::Internet => "Internet connection error.".to_string(),
        FetchErrorKind::Other => format!(
            "Unknown error type. Kindly notify the developer if you see this. Message from RescueTime API: {}",
            error.message
        ),
    }
}

pub(crate) fn classify(key: QueryKey, result: Result<RawAnalyticData, FetchError>) -> FetchOutcome {
    let status = match result {
        Ok(raw) => classify_payload(&key, raw),
        Err(error) => match error.kind {
            FetchErrorKind::Query => FetchStatus::InvalidParam,
            FetchErrorKind::Internet => FetchStatus::Unreachable,
            FetchErrorKind::Other => FetchStatus::Unknown,
        },
    };
    FetchOutcome::new(key, status)
}

fn classify_payload(key: &QueryKey, raw: RawAnalyticData) -> FetchStatus {
    if !validate_headers(&raw.row_headers, key.kind) {
        warn!(
            target: "app::api",
            key = %key,
            headers = ?raw.row_headers,
            "unexpected row headers"
        );
        return FetchStatus::UnexpectedDatatype;
    }

    if raw.rows.is_empty() {
        return FetchStatus::EmptyData;
    }

    match convert_rows(&raw.rows, key.kind) {
        Ok(rows) => FetchStatus::Available { rows },
        Err(_) => FetchStatus::UnexpectedDatatype,
    }
}
