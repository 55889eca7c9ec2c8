//! Worker search page.
//! Wires the filter panel and results panel to one search session.

use log::{warn, LevelFilter};
use worker_search::{FilterController, FilterSet, QueryKey, SearchConfig};
use yew::prelude::*;

mod components;
mod hooks;
mod utils;

use components::{FilterEdit, FilterPanel, ResultsPanel};
use hooks::{use_filter_options, use_search_session};

/// The search page: filters on the left, results on the right.
#[function_component(SearchPage)]
fn search_page() -> Html {
    let config = use_memo((), |_| SearchConfig::default());
    let session = use_search_session((*config).clone());
    let options = use_filter_options(session.orchestrator.clone());
    // The controller is edited in place; `filters` is its rendered snapshot
    let controller = use_mut_ref(FilterController::new);
    let filters = use_state(FilterSet::new);

    // Unfiltered listing on first load
    {
        let run = session.run.clone();
        use_effect_with((), move |_| {
            run.emit(FilterSet::new());
            || ()
        });
    }

    let on_edit = {
        let controller = controller.clone();
        let filters = filters.clone();
        let options = options.clone();
        let run = session.run.clone();
        Callback::from(move |edit: FilterEdit| {
            let mut controller = controller.borrow_mut();
            let next = match edit {
                FilterEdit::Text { field, value } => controller.set_text(field, &value),
                FilterEdit::Toggle {
                    field,
                    value,
                    checked,
                } => controller.toggle(field, &value, checked),
                FilterEdit::Numeric { field, value } => {
                    let bounds = options.options().cloned().unwrap_or_default();
                    match controller.set_numeric(field, &value, &bounds) {
                        Ok(next) => next,
                        Err(e) => {
                            warn!("Ignoring {} input `{}`: {}", field, value, e);
                            return;
                        }
                    }
                }
                FilterEdit::Verified(on) => controller.set_verified_only(on),
                FilterEdit::Reset => controller.reset(),
            };
            filters.set(next.clone());
            run.emit(next);
        })
    };

    let on_history = {
        let controller = controller.clone();
        let filters = filters.clone();
        let orchestrator = session.orchestrator.clone();
        let run = session.run.clone();
        Callback::from(move |key: QueryKey| {
            let applied = orchestrator
                .with_history(|history| controller.borrow_mut().apply_history(history, &key));
            if let Some(next) = applied {
                filters.set(next.clone());
                run.emit(next);
            }
        })
    };

    html! {
        <div class="container">
            <header class="page-header">
                <h1>{ "Find Workers" }</h1>
            </header>
            <div class="search-layout">
                <FilterPanel
                    filters={(*filters).clone()}
                    options={options.clone()}
                    {on_edit}
                />
                <ResultsPanel
                    phase={session.phase.clone()}
                    results={session.results.clone()}
                    results_generation={session.results_generation}
                    history={session.history.clone()}
                    page_size={config.page_size}
                    strategy={config.sort_strategy}
                    {on_history}
                    on_clear_history={session.clear_history.clone()}
                />
            </div>
        </div>
    }
}

#[function_component]
pub fn App() -> Html {
    html! { <SearchPage /> }
}

/// Entry point: installs the panic hook and console logger, then renders.
fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = worker_search::logging::init(LevelFilter::Debug) {
        web_sys::console::warn_1(&format!("Logger not installed: {}", e).into());
    }
    yew::Renderer::<App>::new().render();
}
