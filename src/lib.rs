//! Worker search for the domestic-worker marketplace.
//!
//! Employers filter registered workers (region, skills, languages, ranges)
//! and browse the results page by page. The pieces, leaf to root:
//!
//! - [`query`]: filter sets and their canonical [`QueryKey`]
//! - [`cache`]: per-session result cache with a fixed TTL
//! - [`history`]: the ten most recent searches, kept in browser storage
//! - [`filters`]: the filter panel's state and input validation
//! - [`orchestrator`]: cache-or-fetch search with stale-response discarding
//! - [`presenter`]: pagination, sort selection and card formatting
//!
//! The Yew page in `main.rs` wires these to the DOM.

use serde::{Deserialize, Serialize};
use std::rc::Rc;

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod filters;
pub mod history;
pub mod logging;
pub mod orchestrator;
pub mod presenter;
pub mod query;
pub mod suggestions;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use api::{FilterOptions, HttpSearchBackend, SearchBackend, SearchResponse};
pub use cache::{CacheEntry, ResultCache};
pub use config::SearchConfig;
pub use error::{ApiError, FilterError, HistoryError, QueryKeyError};
pub use filters::FilterController;
pub use history::{HistoryPolicy, HistoryStorage, LocalStorage, MemoryStorage, SearchHistory};
pub use orchestrator::{SearchOrchestrator, SearchOutcome, SearchPhase};
pub use presenter::{ResultsView, SortOption, SortStrategy};
pub use query::{FilterSet, FilterValue, QueryKey};

/// Workers returned by one search, shared between cache and view.
pub type ResultList = Rc<Vec<Worker>>;

/// A language a worker speaks. The backend sends either a bare name or an
/// object with a proficiency level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Language {
    Name(String),
    Detailed {
        language: String,
        #[serde(default)]
        proficiency: Option<String>,
    },
}

impl Language {
    pub fn name(&self) -> &str {
        match self {
            Language::Name(name) => name,
            Language::Detailed { language, .. } => language,
        }
    }
}

/// One worker profile as listed by the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Worker {
    pub id: u64,
    pub full_name: String,
    pub rating: f64,
    pub years_experience: u32,
    pub age: u32,
    pub current_location: String,
    pub region_of_origin: String,
    pub education_level: String,
    pub religion: String,
    pub working_time: String,
    pub skills: Vec<String>,
    pub languages: Vec<Language>,
    pub profile_photo_url: Option<String>,
    /// ISO-8601 registration timestamp.
    pub date_registered: Option<String>,
    /// The search endpoint reports the owning account's flag as `user_verified`.
    #[serde(alias = "user_verified")]
    pub is_verified: bool,
}
