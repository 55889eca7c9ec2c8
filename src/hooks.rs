use log::{error, info};
use std::rc::Rc;
use worker_search::clock::SystemClock;
use worker_search::config::FILTER_OPTIONS_ERROR;
use worker_search::{
    FilterOptions, FilterSet, HttpSearchBackend, LocalStorage, QueryKey, ResultList,
    SearchConfig, SearchOrchestrator, SearchOutcome, SearchPhase,
};
use yew::prelude::*;

use crate::utils::{resolve_api_base, stored_auth_token};

pub type Orchestrator = SearchOrchestrator<HttpSearchBackend>;

/// State of one page session's searches, re-rendered on every phase change.
#[derive(Clone)]
pub struct SearchSession {
    pub orchestrator: Rc<Orchestrator>,
    pub phase: SearchPhase,
    /// Latest successful list; kept while a newer search is loading.
    pub results: Option<ResultList>,
    /// Generation of the search that produced `results`, `0` before any.
    pub results_generation: u64,
    pub history: Vec<QueryKey>,
    /// Start a search for the given filters.
    pub run: Callback<FilterSet>,
    pub clear_history: Callback<()>,
}

pub fn build_orchestrator(config: &SearchConfig) -> Orchestrator {
    let backend = HttpSearchBackend::new(resolve_api_base(&config.api_base))
        .with_token(stored_auth_token());
    SearchOrchestrator::from_config(
        backend,
        config,
        Rc::new(SystemClock),
        Box::new(LocalStorage),
    )
}

#[hook]
pub fn use_search_session(config: SearchConfig) -> SearchSession {
    let orchestrator = use_memo((), move |_| build_orchestrator(&config));
    let phase = use_state(SearchPhase::default);
    let results = use_state(|| None::<(ResultList, u64)>);
    let history = {
        let orchestrator = orchestrator.clone();
        use_state(move || orchestrator.history())
    };

    // The orchestrator outlives every render; hook its phase changes up once.
    {
        let orchestrator = orchestrator.clone();
        let phase_setter = phase.setter();
        let results_setter = results.setter();
        use_effect_with((), move |_| {
            orchestrator.set_listener(move |next: &SearchPhase| {
                if let (Some(list), Some(generation)) = (next.results(), next.generation()) {
                    results_setter.set(Some((Rc::clone(list), generation)));
                }
                phase_setter.set(next.clone());
            });
            || ()
        });
    }

    let run = {
        let orchestrator = orchestrator.clone();
        let history_setter = history.setter();
        Callback::from(move |filters: FilterSet| {
            let orchestrator = orchestrator.clone();
            let history_setter = history_setter.clone();
            wasm_bindgen_futures::spawn_local(async move {
                // only a fresh fetch adds to the history
                if let SearchOutcome::Fetched(list) = orchestrator.search(&filters).await {
                    info!("Loaded {} workers", list.len());
                    history_setter.set(orchestrator.history());
                }
            });
        })
    };

    let clear_history = {
        let orchestrator = orchestrator.clone();
        let history_setter = history.setter();
        Callback::from(move |_| {
            orchestrator.clear_history();
            history_setter.set(Vec::new());
        })
    };

    SearchSession {
        orchestrator,
        phase: (*phase).clone(),
        results: (*results).as_ref().map(|(list, _)| Rc::clone(list)),
        results_generation: (*results).as_ref().map(|(_, generation)| *generation).unwrap_or(0),
        history: (*history).clone(),
        run,
        clear_history,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterOptionsState {
    Loading,
    Ready(Rc<FilterOptions>),
    Failed(String),
}

impl FilterOptionsState {
    pub fn options(&self) -> Option<&Rc<FilterOptions>> {
        match self {
            FilterOptionsState::Ready(options) => Some(options),
            _ => None,
        }
    }
}

/// Fetch the filter panel's choices once on mount.
#[hook]
pub fn use_filter_options(orchestrator: Rc<Orchestrator>) -> FilterOptionsState {
    let state = use_state(|| FilterOptionsState::Loading);
    {
        let setter = state.setter();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                match orchestrator.filter_options().await {
                    Ok(options) => setter.set(FilterOptionsState::Ready(Rc::new(options))),
                    Err(e) => {
                        error!("Error fetching filter options: {}", e);
                        setter.set(FilterOptionsState::Failed(FILTER_OPTIONS_ERROR.to_string()));
                    }
                }
            });
            || ()
        });
    }
    (*state).clone()
}

/// Holds the state and callbacks for a validated input field.
#[derive(Clone)]
pub struct ValidatedInput {
    /// The current text content of the input field.
    pub text: String,
    /// An optional error message if validation failed.
    pub error: Option<String>,
    pub on_text_input: Callback<InputEvent>,
    /// Validate the current text; on success the canonical value is
    /// written back and handed to `on_valid`.
    pub on_commit: Callback<()>,
    /// Overwrite the text from outside (reset, history), clearing errors.
    pub set_value: Callback<String>,
}

#[hook]
pub fn use_validated_input(
    initial_value: String,
    parse_and_validate: Rc<dyn Fn(&str) -> Result<String, String>>,
    on_valid: Callback<String>,
) -> ValidatedInput {
    let text_state_handle = use_state(|| initial_value);
    let error_state_handle = use_state(|| None::<String>);

    let on_text_input = {
        let text_setter = text_state_handle.clone();
        Callback::from(move |e: InputEvent| {
            text_setter.set(crate::utils::input_value(&e));
        })
    };

    let on_commit = {
        let current_text_handle = text_state_handle.clone();
        let error_setter = error_state_handle.clone();
        Callback::from(move |_| match parse_and_validate(&current_text_handle) {
            Ok(canonical) => {
                current_text_handle.set(canonical.clone());
                error_setter.set(None);
                on_valid.emit(canonical);
            }
            Err(err_msg) => error_setter.set(Some(err_msg)),
        })
    };

    let set_value = {
        let text_setter = text_state_handle.clone();
        let error_setter = error_state_handle.clone();
        Callback::from(move |new_val: String| {
            text_setter.set(new_val);
            error_setter.set(None);
        })
    };

    ValidatedInput {
        text: (*text_state_handle).clone(),
        error: (*error_state_handle).clone(),
        on_text_input,
        on_commit,
        set_value,
    }
}
