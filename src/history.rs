//! Recent searches, most recent first, mirrored to browser storage.
//!
//! The stored form is a JSON array of query keys in one named slot. A slot
//! that cannot be read or parsed is treated as empty history; a failed write
//! is logged and the in-memory list stays authoritative for the session.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::SearchConfig;
use crate::error::{HistoryError, QueryKeyError};
use crate::query::{FilterSet, QueryKey};

/// What `record` does with a key that is already in the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Leave the list untouched.
    #[default]
    KeepPosition,
    /// Move the existing entry to the front.
    MoveToFront,
}

/// Durable string slots (browser `localStorage` in the page).
pub trait HistoryStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, HistoryError>;
    fn write(&self, slot: &str, value: &str) -> Result<(), HistoryError>;
}

/// `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, HistoryError> {
        gloo_utils::window()
            .local_storage()
            .map_err(|e| HistoryError::Storage(format!("{:?}", e)))?
            .ok_or(HistoryError::Unavailable)
    }
}

impl HistoryStorage for LocalStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, HistoryError> {
        Self::storage()?
            .get_item(slot)
            .map_err(|e| HistoryError::Storage(format!("{:?}", e)))
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), HistoryError> {
        Self::storage()?
            .set_item(slot, value)
            .map_err(|e| HistoryError::Storage(format!("{:?}", e)))
    }
}

/// In-memory slots. Clones share contents, so a test can keep a handle and
/// inspect what was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(self, slot: &str, value: &str) -> Self {
        self.slots
            .borrow_mut()
            .insert(slot.to_string(), value.to_string());
        self
    }

    pub fn get(&self, slot: &str) -> Option<String> {
        self.slots.borrow().get(slot).cloned()
    }
}

impl HistoryStorage for MemoryStorage {
    fn read(&self, slot: &str) -> Result<Option<String>, HistoryError> {
        Ok(self.get(slot))
    }

    fn write(&self, slot: &str, value: &str) -> Result<(), HistoryError> {
        self.slots
            .borrow_mut()
            .insert(slot.to_string(), value.to_string());
        Ok(())
    }
}

pub struct SearchHistory {
    entries: Vec<QueryKey>,
    limit: usize,
    policy: HistoryPolicy,
    slot: String,
    storage: Box<dyn HistoryStorage>,
}

impl SearchHistory {
    /// Load the list from `storage`. Malformed content yields an empty history.
    pub fn load(storage: Box<dyn HistoryStorage>, config: &SearchConfig) -> Self {
        let mut entries = match read_entries(storage.as_ref(), &config.history_slot) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error parsing search history: {}", e);
                Vec::new()
            }
        };
        entries.truncate(config.history_limit);

        Self {
            entries,
            limit: config.history_limit,
            policy: config.history_policy,
            slot: config.history_slot.clone(),
            storage,
        }
    }

    pub fn entries(&self) -> &[QueryKey] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains(key)
    }

    /// Record a successful search. Returns whether the list changed.
    pub fn record(&mut self, key: QueryKey) -> bool {
        match self.entries.iter().position(|k| *k == key) {
            Some(_) if self.policy == HistoryPolicy::KeepPosition => return false,
            Some(0) => return false,
            Some(idx) => {
                let existing = self.entries.remove(idx);
                self.entries.insert(0, existing);
            }
            None => {
                info!("Recording search `{}`", key);
                self.entries.insert(0, key);
                self.entries.truncate(self.limit);
            }
        }
        self.persist();
        true
    }

    /// Filters for a clicked history entry.
    pub fn selection(&self, key: &QueryKey) -> Result<FilterSet, QueryKeyError> {
        key.decode()
    }

    pub fn remove(&mut self, key: &QueryKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|k| k != key);
        let changed = self.entries.len() != before;
        if changed {
            self.persist();
        }
        changed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(HistoryError::from)
            .and_then(|json| self.storage.write(&self.slot, &json));
        if let Err(e) = result {
            warn!("Could not persist search history: {}", e);
        }
    }
}

fn read_entries(
    storage: &dyn HistoryStorage,
    slot: &str,
) -> Result<Vec<QueryKey>, HistoryError> {
    match storage.read(slot)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}
