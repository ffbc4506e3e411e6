use crate::error::PersistenceError;
use crate::locale::Locale;
use crate::models::{seed_groups, Group};
use crate::scoring;
use async_trait::async_trait;
use log::{debug, error, warn};
use std::collections::HashMap;
use std::sync::Mutex;

/// A durable key-value slot. Last write wins, no transactions.
#[async_trait]
pub trait SlotStore: Send + Sync {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    async fn write_slot(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// Process-local slots, used in tests and when no database is configured.
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(key: &str, value: &str) -> Self {
        let slots = Self::new();
        if let Ok(mut map) = slots.slots.lock() {
            map.insert(key.to_string(), value.to_string());
        }
        slots
    }
}

#[async_trait]
impl SlotStore for MemorySlots {
    async fn read_slot(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self
            .slots
            .lock()
            .map(|map| map.get(key).cloned())
            .unwrap_or_default())
    }

    async fn write_slot(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        if let Ok(mut map) = self.slots.lock() {
            map.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }
}

/// Loads a collection, falling back to the seed dataset when the slot is
/// absent, unreadable, or not a JSON array of groups.
pub async fn load_groups(store: &dyn SlotStore, key: &str, locale: Locale) -> Vec<Group> {
    let raw = match store.read_slot(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("Slot '{}' is empty, starting from seed data", key);
            return seed_groups(locale);
        }
        Err(e) => {
            error!("Failed to read slot '{}': {}", key, e);
            return seed_groups(locale);
        }
    };

    match serde_json::from_str::<Vec<Group>>(&raw) {
        Ok(groups) => groups,
        Err(e) => {
            warn!("Slot '{}' holds malformed data ({}), using seed data", key, e);
            seed_groups(locale)
        }
    }
}

/// Writes the recomputed collection, derived fields included.
pub async fn save_groups(store: &dyn SlotStore, key: &str, groups: &[Group]) -> Result<(), PersistenceError> {
    let value = serde_json::to_string(&scoring::recompute(groups))?;
    store.write_slot(key, &value).await
}
