use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::analytic_data::{ApiStatus, FetchOutcome, QueryKey};
use crate::services::analytic_data_api::{AnalyticDataApi, FetchRequest};
use crate::services::data_store::DataStore;

/// Cache lookups `fetch_and_process` makes per call. A single live fetch runs between them.
pub const MAX_ATTEMPTS: u32 = 2;

/// Cache-first retrieval over the analytic data API.
pub struct DataService {
    api: Arc<AnalyticDataApi>,
    store: Arc<DataStore>,
    api_token: Option<String>,
    in_flight: Mutex<HashMap<QueryKey, Arc<AsyncMutex<()>>>>,
    refresh_job_started: AtomicBool,
}

impl DataService {
    pub fn new(api: Arc<AnalyticDataApi>, store: Arc<DataStore>, api_token: Option<String>) -> Self {
        Self {
            api,
            store,
            api_token,
            in_flight: Mutex::new(HashMap::new()),
            refresh_job_started: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> Arc<DataStore> {
        Arc::clone(&self.store)
    }

    /// One live fetch for `key`; the outcome is offered to the cache and returned as fetched.
    pub async fn fetch_and_set(&self, key: &QueryKey) -> AppResult<FetchOutcome> {
        let token = self.api_token()?;
        let outcome = self
            .api
            .fetch_data(&FetchRequest::for_key(token, key))
            .await;
        self.store.put(outcome.clone());
        Ok(outcome)
    }

    /// Return a usable outcome for `key`. On a miss, fetch once and look again.
    ///
    /// Concurrent calls for the same key wait for each other, so a second caller sees
    /// the first caller's result instead of issuing its own fetch.
    pub async fn fetch_and_process(&self, key: &QueryKey) -> AppResult<FetchOutcome> {
        let gate = self.gate_for(key);
        let _guard = gate.lock().await;

        let mut last_status = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.store.get(key) {
                Some(outcome) if outcome.is_usable() => {
                    debug!(
                        target: "app::data_service",
                        key = %key,
                        attempt,
                        rows = outcome.row_count(),
                        "serving cached outcome"
                    );
                    return Ok(outcome);
                }
                Some(outcome) => last_status = Some(outcome.api_status()),
                None => {}
            }

            if attempt == MAX_ATTEMPTS {
                break;
            }

            let fetched = self.fetch_and_set(key).await?;
            debug!(
                target: "app::data_service",
                key = %key,
                attempt,
                status = fetched.api_status().as_str(),
                "live fetch finished"
            );
        }

        let status = last_status.unwrap_or(ApiStatus::Unknown);
        error!(
            target: "app::data_service",
            key = %key,
            status = status.as_str(),
            "data could not be obtained"
        );
        Err(AppError::data_unavailable(status))
    }

    /// Re-fetch `keys` in the background every `every`. Only the first call starts a job.
    pub fn spawn_refresh_job(
        self: &Arc<Self>,
        keys: Vec<QueryKey>,
        every: StdDuration,
    ) -> AppResult<Option<JoinHandle<()>>> {
        if keys.is_empty() {
            return Err(AppError::validation("refresh job needs at least one query"));
        }
        if every.is_zero() {
            return Err(AppError::validation("refresh interval must be positive"));
        }

        if self
            .refresh_job_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(None);
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                self.refresh_job_started.store(false, Ordering::SeqCst);
                return Err(AppError::other(format!("cannot start refresh job: {err}")));
            }
        };

        info!(
            target: "app::data_service",
            keys = keys.len(),
            every_secs = every.as_secs(),
            "starting refresh job"
        );

        let service = Arc::clone(self);
        Ok(Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                for key in &keys {
                    service.refresh(key).await;
                }
            }
        })))
    }

    async fn refresh(&self, key: &QueryKey) {
        let gate = self.gate_for(key);
        let _guard = gate.lock().await;

        match self.fetch_and_set(key).await {
            Ok(outcome) => debug!(
                target: "app::data_service",
                key = %key,
                status = outcome.api_status().as_str(),
                "refreshed"
            ),
            Err(err) => warn!(
                target: "app::data_service",
                key = %key,
                error = %err,
                "refresh skipped"
            ),
        }
    }

    fn api_token(&self) -> AppResult<&str> {
        self.api_token
            .as_deref()
            .ok_or_else(|| AppError::validation("RescueTime API key is not configured"))
    }

    fn gate_for(&self, key: &QueryKey) -> Arc<AsyncMutex<()>> {
        let mut gates = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(gates.entry(key.clone()).or_default())
    }
}
