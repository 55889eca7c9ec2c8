//! Cache-or-fetch worker search.
//!
//! One orchestrator lives for one page session and owns that session's result
//! cache and search history. It is shared as `Rc<SearchOrchestrator<_>>` on
//! the browser's single-threaded event loop; no `RefCell` borrow is held
//! across an `.await`.
//!
//! Every call to [`SearchOrchestrator::search`] takes a new generation. A
//! fetch that resolves after a newer search has started is discarded: it is
//! not cached, not recorded and does not touch the phase.

use log::{debug, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::api::{FilterOptions, SearchBackend};
use crate::cache::ResultCache;
use crate::clock::Clock;
use crate::config::SearchConfig;
use crate::error::ApiError;
use crate::history::{HistoryStorage, SearchHistory};
use crate::query::{FilterSet, QueryKey};
use crate::ResultList;

/// Lifecycle of the latest search: `Idle -> Loading -> Success | Error`.
/// A cache hit goes straight to `Success`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchPhase {
    #[default]
    Idle,
    Loading,
    Success {
        results: ResultList,
        from_cache: bool,
        /// The search that produced this list. Repeating a search shows the
        /// same shared list under a new generation.
        generation: u64,
    },
    Error(String),
}

impl SearchPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, SearchPhase::Loading)
    }

    pub fn results(&self) -> Option<&ResultList> {
        match self {
            SearchPhase::Success { results, .. } => Some(results),
            _ => None,
        }
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            SearchPhase::Success { generation, .. } => Some(*generation),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SearchPhase::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Cached(ResultList),
    Fetched(ResultList),
    Failed(ApiError),
    /// A newer search started before this one's response arrived.
    Superseded,
}

impl SearchOutcome {
    pub fn results(&self) -> Option<&ResultList> {
        match self {
            SearchOutcome::Cached(results) | SearchOutcome::Fetched(results) => Some(results),
            _ => None,
        }
    }
}

pub type PhaseListener = Rc<dyn Fn(&SearchPhase)>;

pub struct SearchOrchestrator<B> {
    backend: B,
    cache: RefCell<ResultCache>,
    history: RefCell<SearchHistory>,
    generation: Cell<u64>,
    phase: RefCell<SearchPhase>,
    listener: RefCell<Option<PhaseListener>>,
}

impl<B: SearchBackend> SearchOrchestrator<B> {
    pub fn new(backend: B, cache: ResultCache, history: SearchHistory) -> Self {
        Self {
            backend,
            cache: RefCell::new(cache),
            history: RefCell::new(history),
            generation: Cell::new(0),
            phase: RefCell::new(SearchPhase::Idle),
            listener: RefCell::new(None),
        }
    }

    /// Build a session: empty cache, history loaded from `storage`.
    pub fn from_config(
        backend: B,
        config: &SearchConfig,
        clock: Rc<dyn Clock>,
        storage: Box<dyn HistoryStorage>,
    ) -> Self {
        let cache = ResultCache::new(config.cache_ttl(), clock);
        let history = SearchHistory::load(storage, config);
        Self::new(backend, cache, history)
    }

    /// Called on every phase transition.
    pub fn set_listener(&self, listener: impl Fn(&SearchPhase) + 'static) {
        *self.listener.borrow_mut() = Some(Rc::new(listener));
    }

    pub async fn search(&self, filters: &FilterSet) -> SearchOutcome {
        let key = filters.encode();
        let generation = self.generation.get() + 1;
        self.generation.set(generation);

        let cached = self.cache.borrow_mut().lookup(&key);
        if let Some(entry) = cached {
            self.transition(SearchPhase::Success {
                results: Rc::clone(&entry.data),
                from_cache: true,
                generation,
            });
            return SearchOutcome::Cached(entry.data);
        }

        self.transition(SearchPhase::Loading);
        info!("Fetching workers for `{}`", key);
        let result = self.backend.search(filters).await;

        if self.generation.get() != generation {
            debug!("Discarding superseded response for `{}`", key);
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                let results: ResultList = Rc::new(response.workers);
                self.cache.borrow_mut().store(key.clone(), Rc::clone(&results));
                self.history.borrow_mut().record(key);
                self.transition(SearchPhase::Success {
                    results: Rc::clone(&results),
                    from_cache: false,
                    generation,
                });
                SearchOutcome::Fetched(results)
            }
            Err(e) => {
                warn!("Search for `{}` failed: {}", key, e);
                self.transition(SearchPhase::Error(e.user_message()));
                SearchOutcome::Failed(e)
            }
        }
    }

    pub async fn filter_options(&self) -> Result<FilterOptions, ApiError> {
        self.backend.filter_options().await
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase.borrow().clone()
    }

    pub fn history(&self) -> Vec<QueryKey> {
        self.history.borrow().entries().to_vec()
    }

    /// Run `f` against the search history.
    pub fn with_history<R>(&self, f: impl FnOnce(&SearchHistory) -> R) -> R {
        f(&self.history.borrow())
    }

    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }

    pub fn invalidate(&self, key: &QueryKey) -> bool {
        self.cache.borrow_mut().invalidate(key)
    }

    pub fn clear_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn transition(&self, phase: SearchPhase) {
        *self.phase.borrow_mut() = phase.clone();
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(&phase);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::CACHE_TTL_MS;
    use crate::history::MemoryStorage;
    use crate::test_utils::{response, workers, MockBackend};
    use futures::executor::block_on;

    fn orchestrator(backend: MockBackend) -> (SearchOrchestrator<MockBackend>, ManualClock) {
        let clock = ManualClock::starting_at(1_700_000_000_000);
        let orchestrator = SearchOrchestrator::from_config(
            backend,
            &SearchConfig::default(),
            Rc::new(clock.clone()),
            Box::new(MemoryStorage::new()),
        );
        (orchestrator, clock)
    }

    fn skills(skill: &str) -> FilterSet {
        let mut filters = FilterSet::new();
        filters.set("skills", vec![skill]);
        filters
    }

    #[test]
    fn miss_fetches_caches_and_records() {
        let (orch, _clock) = orchestrator(MockBackend::returning(workers(3)));
        let outcome = block_on(orch.search(&skills("Cooking")));

        assert!(matches!(outcome, SearchOutcome::Fetched(ref r) if r.len() == 3));
        assert_eq!(orch.backend().calls(), 1);
        assert_eq!(orch.cached_entries(), 1);
        assert_eq!(orch.history(), vec![QueryKey::from("skills=Cooking")]);
        assert!(matches!(
            orch.phase(),
            SearchPhase::Success { from_cache: false, .. }
        ));
    }

    #[test]
    fn hit_skips_network_and_history() {
        let (orch, _clock) = orchestrator(MockBackend::returning(workers(2)));
        block_on(orch.search(&skills("Cooking")));
        orch.clear_history();

        let outcome = block_on(orch.search(&skills("Cooking")));
        assert!(matches!(outcome, SearchOutcome::Cached(_)));
        assert_eq!(orch.backend().calls(), 1);
        assert!(orch.history().is_empty());
        assert!(matches!(
            orch.phase(),
            SearchPhase::Success { from_cache: true, .. }
        ));
    }

    #[test]
    fn expired_entry_is_refetched() {
        let (orch, clock) = orchestrator(MockBackend::returning(workers(1)));
        block_on(orch.search(&FilterSet::new()));
        clock.advance(CACHE_TTL_MS);
        let outcome = block_on(orch.search(&FilterSet::new()));

        assert!(matches!(outcome, SearchOutcome::Fetched(_)));
        assert_eq!(orch.backend().calls(), 2);
        assert_eq!(orch.history(), vec![QueryKey::all_workers()]);
    }

    #[test]
    fn failure_surfaces_message_without_side_effects() {
        let backend = MockBackend::default();
        backend.push_reply(Err(ApiError::Status { status: 500 }));
        let (orch, _clock) = orchestrator(backend);

        let outcome = block_on(orch.search(&skills("Driving")));
        assert_eq!(outcome, SearchOutcome::Failed(ApiError::Status { status: 500 }));
        assert_eq!(
            orch.phase().error(),
            Some("Search request failed with status 500")
        );
        assert_eq!(orch.cached_entries(), 0);
        assert!(orch.history().is_empty());

        // the next attempt goes to the network again
        block_on(orch.search(&skills("Driving")));
        assert_eq!(orch.backend().calls(), 2);
    }

    #[test]
    fn listener_sees_loading_then_success() {
        let (orch, _clock) = orchestrator(MockBackend::returning(workers(1)));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        orch.set_listener(move |phase| {
            let label = match phase {
                SearchPhase::Idle => "idle",
                SearchPhase::Loading => "loading",
                SearchPhase::Success { from_cache: true, .. } => "cached",
                SearchPhase::Success { .. } => "success",
                SearchPhase::Error(_) => "error",
            };
            sink.borrow_mut().push(label);
        });

        block_on(orch.search(&FilterSet::new()));
        block_on(orch.search(&FilterSet::new()));
        assert_eq!(*seen.borrow(), vec!["loading", "success", "cached"]);
    }

    #[test]
    fn repeated_search_gets_a_new_generation() {
        let (orch, _clock) = orchestrator(MockBackend::returning(workers(12)));
        block_on(orch.search(&skills("Cooking")));
        let first = orch.phase();
        block_on(orch.search(&skills("Cooking")));
        let second = orch.phase();

        // same shared list, but a distinct search
        assert!(Rc::ptr_eq(
            first.results().unwrap(),
            second.results().unwrap()
        ));
        assert_eq!(first.generation(), Some(1));
        assert_eq!(second.generation(), Some(2));
        assert_eq!(SearchPhase::Loading.generation(), None);
    }

    #[test]
    fn late_response_of_older_search_is_discarded() {
        let backend = MockBackend::default();
        let first = backend.push_deferred();
        let second = backend.push_deferred();
        let (orch, _clock) = orchestrator(backend);

        let older = skills("Cooking");
        let newer = skills("Laundry");
        let (old_outcome, new_outcome, _) = block_on(async {
            futures::join!(orch.search(&older), orch.search(&newer), async {
                let _ = second.send(Ok(response(workers(2))));
                let _ = first.send(Ok(response(workers(5))));
            })
        });

        assert_eq!(old_outcome, SearchOutcome::Superseded);
        assert!(matches!(new_outcome, SearchOutcome::Fetched(ref r) if r.len() == 2));
        assert_eq!(orch.phase().results().map(|r| r.len()), Some(2));
        assert_eq!(orch.history(), vec![QueryKey::from("skills=Laundry")]);
        assert_eq!(orch.cached_entries(), 1);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let (orch, _clock) = orchestrator(MockBackend::returning(workers(1)));
        block_on(orch.search(&skills("Cooking")));
        assert!(orch.invalidate(&QueryKey::from("skills=Cooking")));
        block_on(orch.search(&skills("Cooking")));
        assert_eq!(orch.backend().calls(), 2);

        orch.clear_cache();
        assert_eq!(orch.cached_entries(), 0);
    }
}
