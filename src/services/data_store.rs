use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::models::analytic_data::{ApiStatus, FetchOutcome, QueryKey};

/// What `DataStore::put` did with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutResult {
    Inserted,
    Replaced,
    Kept,
}

/// Best-known fetch outcome per query key, kept for the life of the process.
#[derive(Debug, Default)]
pub struct DataStore {
    entries: RwLock<HashMap<QueryKey, FetchOutcome>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, outcome: FetchOutcome) -> PutResult {
        let mut entries = self.write();
        let new_status = outcome.api_status();

        let result = match entries.get(&outcome.key) {
            None => PutResult::Inserted,
            Some(existing) if supersedes(&outcome, existing) => PutResult::Replaced,
            Some(_) => PutResult::Kept,
        };

        let key = outcome.key.clone();
        let rows = outcome.row_count();
        if result != PutResult::Kept {
            entries.insert(key.clone(), outcome);
        }

        debug!(
            target: "app::data_store",
            key = %key,
            status = new_status.as_str(),
            rows,
            result = ?result,
            entries = entries.len(),
            "cache put"
        );
        result
    }

    pub fn get(&self, key: &QueryKey) -> Option<FetchOutcome> {
        let entry = self.read().get(key).cloned();
        match &entry {
            Some(outcome) if outcome.api_status() != ApiStatus::Available => {
                debug!(
                    target: "app::data_store",
                    key = %key,
                    status = outcome.api_status().as_str(),
                    "cached outcome is not available"
                );
            }
            None => debug!(target: "app::data_store", key = %key, "no cached outcome"),
            _ => {}
        }
        entry
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<QueryKey, FetchOutcome>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<QueryKey, FetchOutcome>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Replacement rule for an occupied key.
///
/// A worse status never replaces a better one. Between two available outcomes the one
/// with strictly more rows wins. Any other same-or-better status replaces the entry,
/// so a repeated failure records the most recent observation.
fn supersedes(new: &FetchOutcome, existing: &FetchOutcome) -> bool {
    let new_status = new.api_status();
    let existing_status = existing.api_status();

    if new_status.rank() > existing_status.rank() {
        return false;
    }

    match (new_status, existing_status) {
        (ApiStatus::Available, ApiStatus::Available) => new.row_count() > existing.row_count(),
        _ => true,
    }
}
