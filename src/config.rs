//! Application-level configuration constants.

use serde::Deserialize;
use std::time::Duration;

use crate::history::HistoryPolicy;
use crate::presenter::SortStrategy;

// Backend
pub const DEFAULT_API_BASE: &str = "/api";
pub const SEARCH_ENDPOINT: &str = "/workers/search/";
pub const FILTER_OPTIONS_ENDPOINT: &str = "/workers/filters/";

// Browser storage slots
pub const HISTORY_STORAGE_KEY: &str = "searchHistory";
pub const AUTH_TOKEN_KEY: &str = "token";

// Cache & history
pub const CACHE_TTL_MS: u64 = 15 * 60 * 1000;
pub const HISTORY_LIMIT: usize = 10;
pub const ALL_WORKERS_LABEL: &str = "all workers";

// UI Behavior
pub const DEBOUNCE_MS: u32 = 300;
/// Suggestions stay open this long after the input loses focus.
pub const SUGGESTION_BLUR_MS: u32 = 200;
pub const PAGE_SIZE: usize = 10;
pub const SUGGESTION_LIMIT: usize = 5;
pub const SUGGESTION_MIN_CHARS: usize = 2;
pub const BADGE_LIMIT: usize = 3;

// Messages
pub const FETCH_ERROR_FALLBACK: &str = "An error occurred while fetching workers";
pub const FILTER_OPTIONS_ERROR: &str = "Failed to load filter options";

/// Tunables for one search page session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub api_base: String,
    pub cache_ttl_ms: u64,
    pub history_limit: usize,
    pub history_slot: String,
    pub page_size: usize,
    pub history_policy: HistoryPolicy,
    pub sort_strategy: SortStrategy,
}

impl SearchConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            cache_ttl_ms: CACHE_TTL_MS,
            history_limit: HISTORY_LIMIT,
            history_slot: HISTORY_STORAGE_KEY.to_string(),
            page_size: PAGE_SIZE,
            history_policy: HistoryPolicy::default(),
            sort_strategy: SortStrategy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_constants() {
        let config = SearchConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(15 * 60));
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.history_slot, "searchHistory");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.history_policy, HistoryPolicy::KeepPosition);
        assert_eq!(config.sort_strategy, SortStrategy::PassThrough);
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"api_base":"https://api.example.et","page_size":20}"#)
                .unwrap();
        assert_eq!(config.api_base, "https://api.example.et");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.cache_ttl_ms, CACHE_TTL_MS);
    }

    #[test]
    fn policies_deserialize_from_snake_case() {
        let config: SearchConfig = serde_json::from_str(
            r#"{"history_policy":"move_to_front","sort_strategy":"local_stable"}"#,
        )
        .unwrap();
        assert_eq!(config.history_policy, HistoryPolicy::MoveToFront);
        assert_eq!(config.sort_strategy, SortStrategy::LocalStable);
    }
}
