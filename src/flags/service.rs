//! Flag orchestration: the composition root of the core.
//!
//! # Responsibilities
//! - Gate every write behind the validator
//! - Diff writes against the previous record to pick the audit event
//! - Emit one change-log line per mutation
//! - Count mutations for the metrics endpoint
//!
//! # Design Decisions
//! - The validate → read previous → write → log sequence is not atomic
//!   end-to-end; two concurrent upserts of one key can interleave so the
//!   logged "previous" does not match what was overwritten. Stored data
//!   stays consistent, the log line may not — an accepted window
//! - Change-log lines go through `tracing` at info level; they are not
//!   queryable and not guaranteed durable

use axum::http::HeaderMap;

use crate::changelog::ChangeLogFormatter;
use crate::flags::model::FeatureFlag;
use crate::flags::store::{FlagStore, StoreError};
use crate::flags::validator::{FlagCandidate, FlagValidator, ValidationErrors};

const RESOURCE_TYPE: &str = "Flag";

/// Why an upsert was refused.
#[derive(Debug)]
pub enum UpsertError {
    Invalid(ValidationErrors),
    Store(StoreError),
}

impl From<StoreError> for UpsertError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

/// Orchestrates validation, storage, and audit logging.
pub struct FlagService {
    store: FlagStore,
    validator: FlagValidator,
    changelog: ChangeLogFormatter,
}

impl FlagService {
    pub fn new(store: FlagStore, validator: FlagValidator, changelog: ChangeLogFormatter) -> Self {
        Self {
            store,
            validator,
            changelog,
        }
    }

    pub async fn list(
        &self,
        pattern: Option<&str>,
        after: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<FeatureFlag>, StoreError> {
        self.store.list(pattern, after, limit).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<FeatureFlag>, StoreError> {
        self.store.get(key).await
    }

    /// Validates and writes the candidate, then logs a created or updated
    /// line depending on whether a record already existed.
    pub async fn upsert(
        &self,
        headers: &HeaderMap,
        candidate: FlagCandidate,
    ) -> Result<FeatureFlag, UpsertError> {
        let configuration = self
            .validator
            .validate(&candidate)
            .map_err(UpsertError::Invalid)?;

        let flag = FeatureFlag::new(candidate.key, configuration);
        let previous = self.store.get(&flag.key).await?;
        self.store.upsert(&flag).await?;

        match previous {
            Some(previous) => {
                metrics::counter!("flags_updated_total").increment(1);
                tracing::info!(
                    "{}",
                    self.changelog
                        .updated(headers, RESOURCE_TYPE, &previous, &flag)
                );
            }
            None => {
                metrics::counter!("flags_created_total").increment(1);
                tracing::info!("{}", self.changelog.created(headers, RESOURCE_TYPE, &flag));
            }
        }

        Ok(flag)
    }

    /// Deletes the record and logs a deleted line; returns false (and logs
    /// nothing) when the key was absent.
    pub async fn delete(&self, headers: &HeaderMap, key: &str) -> Result<bool, StoreError> {
        let deleted = self.store.delete(key).await?;
        if deleted {
            metrics::counter!("flags_deleted_total").increment(1);
            tracing::info!("{}", self.changelog.deleted(headers, RESOURCE_TYPE, key));
        }
        Ok(deleted)
    }
}
