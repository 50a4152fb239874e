use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_USAGE_RECORDS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub count: u32,
    #[serde(alias = "date")]
    pub last_used_epoch_secs: f64,
}

pub type UsageMap = HashMap<String, UsageRecord>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of the usage map. The store calls `save` after every mutation.
pub trait UsagePersistence {
    fn load(&self) -> Result<UsageMap, StoreError>;
    fn save(&self, records: &UsageMap) -> Result<(), StoreError>;
}

/// Most used first; equal counts put the most recent first.
pub fn compare_usage(a: &UsageRecord, b: &UsageRecord) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| b.last_used_epoch_secs.total_cmp(&a.last_used_epoch_secs))
}

#[derive(Default)]
pub struct UsageStore {
    records: UsageMap,
    version: u64,
    persistence: Option<Box<dyn UsagePersistence>>,
}

impl std::fmt::Debug for UsageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageStore")
            .field("records", &self.records)
            .field("version", &self.version)
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

impl UsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an in-memory store, dropping zero counts and trimming to the cap.
    pub fn from_records(records: UsageMap) -> Self {
        let mut store = Self {
            records,
            version: 0,
            persistence: None,
        };
        store.sanitize();
        store
    }

    /// Loads persisted usage. A failed load starts empty; later saves still go
    /// to the same persistence.
    pub fn load(persistence: Box<dyn UsagePersistence>) -> Self {
        let records = match persistence.load() {
            Ok(records) => records,
            Err(error) => {
                log::warn!("usage load failed, starting empty: {error}");
                UsageMap::new()
            }
        };
        let mut store = Self::from_records(records);
        store.persistence = Some(persistence);
        log::debug!("usage store loaded records={}", store.len());
        store
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&UsageRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn records(&self) -> &UsageMap {
        &self.records
    }

    /// Bumped by every mutation that changed the contents.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn record_use(&mut self, id: &str) -> Vec<String> {
        self.record_use_at(id, now_epoch_secs())
    }

    /// Records one use of `id` at `now` and returns the ids evicted to make room.
    pub fn record_use_at(&mut self, id: &str, now: f64) -> Vec<String> {
        let mut evicted = Vec::new();
        if let Some(record) = self.records.get_mut(id) {
            record.count = record.count.saturating_add(1);
            record.last_used_epoch_secs = now;
        } else {
            evicted = self.evict_down_to(MAX_USAGE_RECORDS - 1);
            self.records.insert(
                id.to_string(),
                UsageRecord {
                    count: 1,
                    last_used_epoch_secs: now,
                },
            );
        }

        if !evicted.is_empty() {
            log::debug!("usage eviction evicted={evicted:?} inserted={id}");
        }
        self.version += 1;
        self.persist();
        evicted
    }

    /// Removes the record for `id`. Absent ids are ignored.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.records.remove(id).is_none() {
            return false;
        }
        self.version += 1;
        self.persist();
        true
    }

    pub fn ordered(&self) -> Vec<&str> {
        let mut entries: Vec<(&String, &UsageRecord)> = self.records.iter().collect();
        entries.sort_by(|a, b| compare_usage(a.1, b.1).then_with(|| a.0.cmp(b.0)));
        entries.into_iter().map(|(id, _)| id.as_str()).collect()
    }

    fn sanitize(&mut self) {
        self.records.retain(|_, record| record.count > 0);
        let evicted = self.evict_down_to(MAX_USAGE_RECORDS);
        if !evicted.is_empty() {
            log::info!("usage store trimmed {} persisted records", evicted.len());
        }
    }

    fn evict_down_to(&mut self, limit: usize) -> Vec<String> {
        let mut evicted = Vec::new();
        while self.records.len() > limit {
            let Some(id) = self.least_deserving() else {
                break;
            };
            self.records.remove(&id);
            evicted.push(id);
        }
        evicted
    }

    fn least_deserving(&self) -> Option<String> {
        self.records
            .iter()
            .max_by(|a, b| compare_usage(a.1, b.1).then_with(|| a.0.cmp(b.0)))
            .map(|(id, _)| id.clone())
    }

    fn persist(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        if let Err(error) = persistence.save(&self.records) {
            log::warn!("usage save failed, keeping in-memory state: {error}");
        }
    }
}

pub fn now_epoch_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Shared in-memory persistence. Clones observe the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryUsagePersistence {
    records: Arc<Mutex<UsageMap>>,
    saves: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl MemoryUsagePersistence {
    pub fn with_records(records: UsageMap) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> UsageMap {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(AtomicOrdering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }
}

impl UsagePersistence for MemoryUsagePersistence {
    fn load(&self) -> Result<UsageMap, StoreError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("memory persistence failing".into()));
        }
        self.records
            .lock()
            .map(|records| records.clone())
            .map_err(|_| StoreError::Unavailable("memory persistence poisoned".into()))
    }

    fn save(&self, records: &UsageMap) -> Result<(), StoreError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("memory persistence failing".into()));
        }
        let mut stored = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory persistence poisoned".into()))?;
        *stored = records.clone();
        self.saves.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }
}
