//! Session cache for worker search results.
//!
//! Results are stored per [`QueryKey`] with the wall-clock time of the fetch.
//! An entry is valid while `now - timestamp < ttl`; stale entries are only
//! dropped when the same key is looked up again. Nothing survives a reload.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use log::debug;

use crate::clock::Clock;
use crate::query::QueryKey;
use crate::ResultList;

/// A cached result list and when it was fetched (ms since epoch).
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: ResultList,
    pub timestamp: u64,
}

pub struct ResultCache {
    entries: HashMap<QueryKey, CacheEntry>,
    ttl: Duration,
    clock: Rc<dyn Clock>,
}

impl ResultCache {
    pub fn new(ttl: Duration, clock: Rc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            clock,
        }
    }

    /// Return the entry for `key` if it is still fresh.
    /// A stale entry is removed as a side effect.
    pub fn lookup(&mut self, key: &QueryKey) -> Option<CacheEntry> {
        let now = self.clock.now_ms();
        let ttl_ms = self.ttl.as_millis() as u64;
        let entry = self.entries.get(key)?;
        if now.saturating_sub(entry.timestamp) < ttl_ms {
            debug!("cache hit for `{}`", key);
            return Some(entry.clone());
        }
        debug!("cache entry for `{}` expired, evicting", key);
        self.entries.remove(key);
        None
    }

    pub fn store(&mut self, key: QueryKey, data: ResultList) {
        let timestamp = self.clock.now_ms();
        self.entries.insert(key, CacheEntry { data, timestamp });
    }

    pub fn invalidate(&mut self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of stored entries, expired ones included until looked up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}
