//! Flag persistence over the backing hash.
//!
//! # Responsibilities
//! - List flags with glob filtering, cursor pagination, and ordering
//! - Get / upsert / delete individual flag records
//! - (De)serialize configurations to hash field values
//!
//! # Design Decisions
//! - The backing store is a seam: one hash with atomic field get/set/delete
//!   behind the `FlagHash` trait; `RedisFlagHash` is the production
//!   implementation, `MemoryFlagHash` serves tests and redis-less runs
//! - Listing re-reads the whole hash on every call and sorts byte-wise by
//!   key, so pagination is restartable
//! - No validation and no retries here; validation is the caller's job and
//!   retry policy belongs to the store client

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;

use crate::flags::glob;
use crate::flags::model::FeatureFlag;

/// Hash key under which all flag fields live.
pub const DEFAULT_FLAGS_KEY: &str = "flagd:flags";

/// Page size applied by the HTTP layer when no limit is chosen.
pub const DEFAULT_LIMIT: usize = 50;

/// Failure reaching or decoding the backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("stored configuration is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One hash with atomic field operations. The unit of consistency.
#[async_trait]
pub trait FlagHash: Send + Sync {
    /// All `(field, value)` pairs, in no particular order.
    async fn entries(&self) -> Result<Vec<(String, String)>, StoreError>;

    async fn get(&self, field: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, field: &str, value: &str) -> Result<(), StoreError>;

    /// True iff the field existed and was removed.
    async fn delete(&self, field: &str) -> Result<bool, StoreError>;
}

/// Production backend: fields of one Redis hash.
pub struct RedisFlagHash {
    connection: ConnectionManager,
    key: String,
}

impl RedisFlagHash {
    pub fn new(connection: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            connection,
            key: key.into(),
        }
    }
}

#[async_trait]
impl FlagHash for RedisFlagHash {
    async fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        let mut connection = self.connection.clone();
        let entries: std::collections::HashMap<String, String> =
            connection.hgetall(&self.key).await?;
        Ok(entries.into_iter().collect())
    }

    async fn get(&self, field: &str) -> Result<Option<String>, StoreError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.hget(&self.key, field).await?;
        Ok(value)
    }

    async fn set(&self, field: &str, value: &str) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection.hset(&self.key, field, value).await?;
        Ok(())
    }

    async fn delete(&self, field: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let removed: u32 = connection.hdel(&self.key, field).await?;
        Ok(removed == 1)
    }
}

/// In-process backend used by tests and local development without Redis.
#[derive(Default)]
pub struct MemoryFlagHash {
    fields: Mutex<BTreeMap<String, String>>,
}

impl MemoryFlagHash {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FlagHash for MemoryFlagHash {
    async fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        let fields = self.fields.lock().expect("flag hash lock poisoned");
        Ok(fields
            .iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect())
    }

    async fn get(&self, field: &str) -> Result<Option<String>, StoreError> {
        let fields = self.fields.lock().expect("flag hash lock poisoned");
        Ok(fields.get(field).cloned())
    }

    async fn set(&self, field: &str, value: &str) -> Result<(), StoreError> {
        let mut fields = self.fields.lock().expect("flag hash lock poisoned");
        fields.insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, field: &str) -> Result<bool, StoreError> {
        let mut fields = self.fields.lock().expect("flag hash lock poisoned");
        Ok(fields.remove(field).is_some())
    }
}

/// Owns all persisted flag records.
pub struct FlagStore {
    hash: Arc<dyn FlagHash>,
}

impl FlagStore {
    pub fn new(hash: Arc<dyn FlagHash>) -> Self {
        Self { hash }
    }

    /// Lists flags ordered byte-wise by key.
    ///
    /// A non-empty `pattern` keeps only keys it glob-matches. `after` is an
    /// exclusive cursor: only keys strictly greater (byte-wise) than it are
    /// returned. `limit` caps the page; `None` applies no cap.
    pub async fn list(
        &self,
        pattern: Option<&str>,
        after: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<FeatureFlag>, StoreError> {
        let mut entries = self.hash.entries().await?;
        entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

        let mut flags = Vec::new();
        for (key, raw) in entries {
            if limit.is_some_and(|limit| flags.len() >= limit) {
                break;
            }
            if let Some(pattern) = pattern.filter(|pattern| !pattern.is_empty()) {
                if !glob::matches(pattern, &key) {
                    continue;
                }
            }
            if let Some(after) = after {
                if key.as_bytes() <= after.as_bytes() {
                    continue;
                }
            }
            let configuration = serde_json::from_str(&raw)?;
            flags.push(FeatureFlag::new(key, configuration));
        }
        Ok(flags)
    }

    pub async fn get(&self, key: &str) -> Result<Option<FeatureFlag>, StoreError> {
        match self.hash.get(key).await? {
            Some(raw) => {
                let configuration = serde_json::from_str(&raw)?;
                Ok(Some(FeatureFlag::new(key, configuration)))
            }
            None => Ok(None),
        }
    }

    /// Creates or fully replaces the record for `flag.key`.
    pub async fn upsert(&self, flag: &FeatureFlag) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&flag.configuration)?;
        self.hash.set(&flag.key, &raw).await
    }

    /// True iff a record existed and was removed. A single store operation,
    /// not a read-then-delete.
    pub async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        self.hash.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::model::{FlagConfiguration, FlagState};
    use serde_json::json;

    fn store() -> FlagStore {
        FlagStore::new(Arc::new(MemoryFlagHash::new()))
    }

    fn boolean_flag() -> FeatureFlag {
        FeatureFlag::new(
            "bool-flag",
            FlagConfiguration {
                state: FlagState::Enabled,
                variants: json!({"on": true, "off": false})
                    .as_object()
                    .cloned()
                    .unwrap(),
                default_variant: Some("on".to_string()),
                targeting: None,
                metadata: None,
            },
        )
    }

    fn string_flag() -> FeatureFlag {
        FeatureFlag::new(
            "str-flag",
            FlagConfiguration {
                state: FlagState::Enabled,
                variants: json!({"foo": "foo", "bar": "bar"})
                    .as_object()
                    .cloned()
                    .unwrap(),
                default_variant: Some("foo".to_string()),
                targeting: None,
                metadata: None,
            },
        )
    }

    async fn seeded_store() -> FlagStore {
        let store = store();
        store.upsert(&boolean_flag()).await.unwrap();
        store.upsert(&string_flag()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn list_returns_flags_sorted_by_key() {
        let store = seeded_store().await;
        let flags = store.list(None, None, None).await.unwrap();
        assert_eq!(flags, vec![boolean_flag(), string_flag()]);
    }

    #[tokio::test]
    async fn list_filters_by_glob_pattern() {
        let store = seeded_store().await;
        let flags = store.list(Some("bool*"), None, None).await.unwrap();
        assert_eq!(flags, vec![boolean_flag()]);
    }

    #[tokio::test]
    async fn empty_pattern_matches_everything() {
        let store = seeded_store().await;
        let flags = store.list(Some(""), None, None).await.unwrap();
        assert_eq!(flags.len(), 2);
    }

    #[tokio::test]
    async fn list_resumes_strictly_after_the_cursor() {
        let store = store();
        for i in 0..5 {
            let flag = FeatureFlag::new(format!("test-{i}"), boolean_flag().configuration);
            store.upsert(&flag).await.unwrap();
        }
        let keys: Vec<String> = store
            .list(None, Some("test-2"), None)
            .await
            .unwrap()
            .into_iter()
            .map(|flag| flag.key)
            .collect();
        assert_eq!(keys, ["test-3", "test-4"]);
    }

    #[tokio::test]
    async fn cursor_past_the_last_key_yields_empty() {
        let store = seeded_store().await;
        let flags = store.list(None, Some("zzz"), None).await.unwrap();
        assert!(flags.is_empty());
    }

    #[tokio::test]
    async fn list_truncates_to_the_limit() {
        let store = seeded_store().await;
        let flags = store.list(None, None, Some(1)).await.unwrap();
        assert_eq!(flags, vec![boolean_flag()]);
    }

    #[tokio::test]
    async fn pattern_cursor_and_limit_compose() {
        let store = store();
        for i in 0..5 {
            let flag = FeatureFlag::new(format!("test-{i}"), boolean_flag().configuration);
            store.upsert(&flag).await.unwrap();
        }
        store.upsert(&string_flag()).await.unwrap();

        let keys: Vec<String> = store
            .list(Some("test-*"), Some("test-0"), Some(2))
            .await
            .unwrap()
            .into_iter()
            .map(|flag| flag.key)
            .collect();
        assert_eq!(keys, ["test-1", "test-2"]);
    }

    #[tokio::test]
    async fn get_returns_none_for_an_absent_key() {
        let store = store();
        assert_eq!(store.get("none").await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_round_trips_through_the_hash() {
        let store = store();
        let flag = boolean_flag();
        store.upsert(&flag).await.unwrap();
        assert_eq!(store.get(&flag.key).await.unwrap(), Some(flag));
    }

    #[tokio::test]
    async fn upsert_replaces_an_existing_record() {
        let store = store();
        store.upsert(&boolean_flag()).await.unwrap();

        let updated = FeatureFlag::new(
            "bool-flag",
            FlagConfiguration {
                default_variant: Some("off".to_string()),
                ..boolean_flag().configuration
            },
        );
        store.upsert(&updated).await.unwrap();
        assert_eq!(store.get("bool-flag").await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = store();
        assert!(!store.delete("none").await.unwrap());

        store.upsert(&boolean_flag()).await.unwrap();
        assert!(store.delete("bool-flag").await.unwrap());
        assert!(!store.delete("bool-flag").await.unwrap());
        assert_eq!(store.get("bool-flag").await.unwrap(), None);
    }
}
