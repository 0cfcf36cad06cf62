pub mod pulse;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{error, warn};

use crate::error::{AppError, AppResult};
use crate::models::settings::PluginConfig;
use crate::services::analytic_data_api::{connection_error_message, AnalyticDataApi};
use crate::services::data_service::DataService;
use crate::services::data_store::DataStore;
use crate::services::fetcher::{AnalyticsFetcher, HttpFetcher};

/// Composition root shared with the host. Cloning shares the same cache and services.
#[derive(Clone)]
pub struct AppState {
    config: Arc<PluginConfig>,
    data_store: Arc<DataStore>,
    api: Arc<AnalyticDataApi>,
    data_service: Arc<DataService>,
}

impl AppState {
    pub fn new(config: PluginConfig) -> AppResult<Self> {
        let fetcher = Arc::new(HttpFetcher::try_new(&config)?);
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: PluginConfig, fetcher: Arc<dyn AnalyticsFetcher>) -> AppResult<Self> {
        let data_store = Arc::new(DataStore::new());
        let api = Arc::new(AnalyticDataApi::new(&config, fetcher)?);
        let data_service = Arc::new(DataService::new(
            Arc::clone(&api),
            Arc::clone(&data_store),
            config.api_token.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            data_store,
            api,
            data_service,
        })
    }

    pub fn config(&self) -> Arc<PluginConfig> {
        Arc::clone(&self.config)
    }

    pub fn store(&self) -> Arc<DataStore> {
        Arc::clone(&self.data_store)
    }

    pub fn api(&self) -> Arc<AnalyticDataApi> {
        Arc::clone(&self.api)
    }

    pub fn data(&self) -> Arc<DataService> {
        Arc::clone(&self.data_service)
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        let text = error.to_string();
        match error {
            AppError::Validation { details, .. } => {
                CommandError::new("VALIDATION_ERROR", text, details)
            }
            AppError::MissingField { field } => {
                error!(target: "app::command", field, "missing field in command");
                CommandError::new(
                    "MISSING_FIELD",
                    text,
                    Some(serde_json::json!({ "field": field })),
                )
            }
            AppError::UnexpectedData { message } => {
                warn!(target: "app::command", %message, "unexpected data in command");
                CommandError::new("UNEXPECTED_DATA", text, None)
            }
            AppError::DataUnavailable { status } => CommandError::new(
                "DATA_UNAVAILABLE",
                status.message(),
                Some(serde_json::json!({ "status": status.as_str() })),
            ),
            AppError::Fetch(fetch_error) => {
                warn!(target: "app::command", error = %fetch_error, "fetch failed in command");
                CommandError::new(
                    "FETCH_FAILED",
                    connection_error_message(&fetch_error),
                    Some(serde_json::json!({ "kind": fetch_error.kind.as_str() })),
                )
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "file system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}
