use std::time::{Duration as StdDuration, Instant};

use reqwest::{StatusCode, Url};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult, FetchError};
use crate::models::analytic_data::RawAnalyticData;
use crate::models::settings::PluginConfig;

/// Transport used to reach the analytic data endpoint.
#[async_trait::async_trait]
pub trait AnalyticsFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RawAnalyticData, FetchError>;
}

/// Default fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn try_new(config: &PluginConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| AppError::other(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { client })
    }

    pub(crate) fn map_http_error(status: StatusCode) -> FetchError {
        if status.is_client_error() {
            FetchError::query(format!("HTTP error. Status: {}", status.as_u16()))
        } else {
            FetchError::other(format!("HTTP error. Status: {}", status.as_u16()))
        }
    }

    fn error_from_reqwest(err: reqwest::Error) -> FetchError {
        if err.is_connect() || err.is_timeout() {
            FetchError::internet(err.to_string())
        } else if let Some(status) = err.status() {
            Self::map_http_error(status)
        } else {
            FetchError::other(err.to_string())
        }
    }
}

#[async_trait::async_trait]
impl AnalyticsFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<RawAnalyticData, FetchError> {
        let correlation_id = Uuid::new_v4().to_string();
        let start = Instant::now();

        debug!(
            target: "app::api::http",
            correlation_id = %correlation_id,
            path = url.path(),
            "requesting analytic data"
        );

        let response = self
            .client
            .get(url.clone())
            .header("content-type", "application/json")
            .send()
            .await
            .map_err(|err| {
                let error = Self::error_from_reqwest(err);
                warn!(
                    target: "app::api::http",
                    correlation_id = %correlation_id,
                    kind = %error.kind,
                    "analytic data request failed"
                );
                error
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                target: "app::api::http",
                correlation_id = %correlation_id,
                status = status.as_u16(),
                "analytic data endpoint returned non-success status"
            );
            return Err(Self::map_http_error(status));
        }

        let body: RawAnalyticData = response.json().await.map_err(|err| {
            warn!(
                target: "app::api::http",
                correlation_id = %correlation_id,
                error = %err,
                "analytic data response is not the expected shape"
            );
            FetchError::other(format!("failed to decode response: {err}"))
        })?;

        debug!(
            target: "app::api::http",
            correlation_id = %correlation_id,
            latency_ms = start.elapsed().as_millis() as u64,
            rows = body.rows.len(),
            "analytic data received"
        );

        Ok(body)
    }
}

pub mod testing {
    use super::*;

    /// Expose status mapping for integration tests.
    pub fn map_http_error(status: StatusCode) -> FetchError {
        HttpFetcher::map_http_error(status)
    }
}
