use std::time::Duration as StdDuration;

use serde::Serialize;

pub const DEFAULT_API_BASE_URL: &str = "https://www.rescuetime.com";
pub const DEFAULT_USER_AGENT: &str = "RescueTime Integration (rescuetime-pulse)";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REFRESH_MINUTES: u64 = 3;

const ENV_API_KEY: &str = "RESCUETIME_API_KEY";
const ENV_BASE_URL: &str = "RESCUETIME_BASE_URL";
const ENV_HTTP_TIMEOUT: &str = "RESCUETIME_HTTP_TIMEOUT_SECS";
const ENV_REFRESH_MINUTES: &str = "RESCUETIME_REFRESH_MINUTES";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub api_base_url: String,
    pub user_agent: String,
    pub http_timeout: StdDuration,
    pub refresh_interval: StdDuration,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: StdDuration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            refresh_interval: StdDuration::from_secs(DEFAULT_REFRESH_MINUTES * 60),
        }
    }
}

impl PluginConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base_url = std::env::var(ENV_BASE_URL)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_base_url);
        let http_timeout = std::env::var(ENV_HTTP_TIMEOUT)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(StdDuration::from_secs)
            .unwrap_or(defaults.http_timeout);
        let refresh_interval = std::env::var(ENV_REFRESH_MINUTES)
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|minutes| *minutes > 0)
            .map(|minutes| StdDuration::from_secs(minutes * 60))
            .unwrap_or(defaults.refresh_interval);

        Self {
            api_base_url,
            http_timeout,
            refresh_interval,
            ..defaults
        }
        .with_api_token(std::env::var(ENV_API_KEY).ok())
    }

    /// Blank tokens count as absent.
    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http_timeout(mut self, timeout: StdDuration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn has_api_token(&self) -> bool {
        self.api_token.is_some()
    }
}
