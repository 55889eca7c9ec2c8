//! Yew view components for the worker search page.
//!
//! Components own only transient UI state (typed text, focus, current page).
//! Filter changes leave through a single `Callback<FilterEdit>`.

use gloo_timers::callback::Timeout;
use std::rc::Rc;
use worker_search::config::{DEBOUNCE_MS, SUGGESTION_BLUR_MS};
use worker_search::filters::{fields, normalize_numeric, range_for};
use worker_search::presenter::{badges, format_rating, history_label, title_case};
use worker_search::suggestions::suggest;
use worker_search::{
    FilterOptions, FilterSet, QueryKey, ResultList, ResultsView, SearchPhase, SortOption,
    SortStrategy, Worker,
};
use yew::prelude::*;

use crate::hooks::{use_validated_input, FilterOptionsState};
use crate::utils::{checkbox_checked, debounce_callback, input_value, select_value};

/// One user edit in the filter panel.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterEdit {
    Text { field: &'static str, value: String },
    Toggle { field: &'static str, value: String, checked: bool },
    /// Already validated against the field's range.
    Numeric { field: &'static str, value: String },
    Verified(bool),
    Reset,
}

#[derive(Properties, PartialEq)]
pub struct FilterPanelProps {
    pub filters: FilterSet,
    pub options: FilterOptionsState,
    pub on_edit: Callback<FilterEdit>,
}

#[function_component(FilterPanel)]
pub fn filter_panel(props: &FilterPanelProps) -> Html {
    let options: Rc<FilterOptions> = props.options.options().cloned().unwrap_or_default();
    let filters = &props.filters;
    let on_edit = &props.on_edit;

    let numeric = |label: &'static str, field: &'static str| {
        html! {
            <NumericFilter
                {label}
                {field}
                value={filters.text(field).to_string()}
                options={options.clone()}
                on_edit={on_edit.clone()}
            />
        }
    };

    let on_verified = {
        let on_edit = on_edit.clone();
        Callback::from(move |e: Event| on_edit.emit(FilterEdit::Verified(checkbox_checked(&e))))
    };

    html! {
        <aside class="filter-panel">
            <div class="filter-header">
                <h2>{ "Filters" }</h2>
                <button class="btn-secondary small" onclick={on_edit.reform(|_| FilterEdit::Reset)}>
                    { "Reset" }
                </button>
            </div>

            if let FilterOptionsState::Failed(ref message) = props.options {
                <div class="input-error">{ message.clone() }</div>
            }
            if matches!(props.options, FilterOptionsState::Loading) {
                <div class="filter-loading">{ "Loading filters..." }</div>
            }

            <SelectFilter
                label="Region of origin"
                field={fields::REGION_OF_ORIGIN}
                choices={options.regions.clone()}
                value={filters.text(fields::REGION_OF_ORIGIN).to_string()}
                on_edit={on_edit.clone()}
            />
            <TextFilter
                label="Current location"
                field={fields::CURRENT_LOCATION}
                value={filters.text(fields::CURRENT_LOCATION).to_string()}
                on_edit={on_edit.clone()}
            />
            <CheckboxGroup
                label="Skills"
                field={fields::SKILLS}
                choices={options.skills.clone()}
                filters={filters.clone()}
                on_edit={on_edit.clone()}
            />
            <CheckboxGroup
                label="Languages"
                field={fields::LANGUAGES}
                choices={options.languages.clone()}
                filters={filters.clone()}
                on_edit={on_edit.clone()}
            />
            <SelectFilter
                label="Education level"
                field={fields::EDUCATION_LEVEL}
                choices={options.education_levels.clone()}
                value={filters.text(fields::EDUCATION_LEVEL).to_string()}
                on_edit={on_edit.clone()}
            />
            <SelectFilter
                label="Religion"
                field={fields::RELIGION}
                choices={options.religions.clone()}
                value={filters.text(fields::RELIGION).to_string()}
                on_edit={on_edit.clone()}
            />
            <SelectFilter
                label="Working time"
                field={fields::WORKING_TIME}
                choices={options.working_times.clone()}
                value={filters.text(fields::WORKING_TIME).to_string()}
                on_edit={on_edit.clone()}
            />

            <div class="form-row">
                { numeric("Min experience", fields::EXPERIENCE_MIN) }
                { numeric("Max experience", fields::EXPERIENCE_MAX) }
            </div>
            <div class="form-row">
                { numeric("Min age", fields::AGE_MIN) }
                { numeric("Max age", fields::AGE_MAX) }
            </div>
            { numeric("Minimum rating", fields::MIN_RATING) }

            <label class="checkbox-option">
                <input type="checkbox" checked={filters.text(fields::IS_VERIFIED) == "true"} onchange={on_verified} />
                { "Verified workers only" }
            </label>
        </aside>
    }
}

#[derive(Properties, PartialEq)]
pub struct SelectFilterProps {
    pub label: &'static str,
    pub field: &'static str,
    pub choices: Vec<String>,
    pub value: String,
    pub on_edit: Callback<FilterEdit>,
}

#[function_component(SelectFilter)]
pub fn select_filter(props: &SelectFilterProps) -> Html {
    let onchange = {
        let on_edit = props.on_edit.clone();
        let field = props.field;
        Callback::from(move |e: Event| {
            on_edit.emit(FilterEdit::Text {
                field,
                value: select_value(&e),
            })
        })
    };

    html! {
        <div class="form-group">
            <label for={props.field}>{ props.label }</label>
            <select id={props.field} {onchange}>
                <option value="" selected={props.value.is_empty()}>{ "Any" }</option>
                { for props.choices.iter().map(|choice| html! {
                    <option value={choice.clone()} selected={*choice == props.value}>
                        { title_case(choice) }
                    </option>
                }) }
            </select>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TextFilterProps {
    pub label: &'static str,
    pub field: &'static str,
    pub value: String,
    pub on_edit: Callback<FilterEdit>,
}

/// Free-text filter with debounced edits and catalog suggestions.
#[function_component(TextFilter)]
pub fn text_filter(props: &TextFilterProps) -> Html {
    let text = use_state(|| props.value.clone());
    let focused = use_state(|| false);
    let debounce_timer = use_state(|| None::<Timeout>);
    let blur_timer = use_state(|| None::<Timeout>);

    // Reset and history clicks rewrite the box from outside
    {
        let text = text.clone();
        use_effect_with(props.value.clone(), move |value| {
            text.set(value.clone());
            || ()
        });
    }

    let emit = {
        let on_edit = props.on_edit.clone();
        let field = props.field;
        Callback::from(move |value: String| on_edit.emit(FilterEdit::Text { field, value }))
    };

    let oninput = {
        let text = text.clone();
        let debounce_timer = debounce_timer.clone();
        let emit = emit.clone();
        Callback::from(move |e: InputEvent| {
            let value = input_value(&e);
            text.set(value.clone());
            debounce_callback(&debounce_timer, emit.clone(), value, DEBOUNCE_MS);
        })
    };

    let onfocus = {
        let focused = focused.clone();
        let blur_timer = blur_timer.clone();
        Callback::from(move |_: FocusEvent| {
            blur_timer.set(None);
            focused.set(true);
        })
    };

    let onblur = {
        let focused = focused.clone();
        let blur_timer = blur_timer.clone();
        Callback::from(move |_: FocusEvent| {
            let focused = focused.clone();
            blur_timer.set(Some(Timeout::new(SUGGESTION_BLUR_MS, move || focused.set(false))));
        })
    };

    let suggestions = if *focused { suggest(&text) } else { Vec::new() };

    html! {
        <div class="form-group suggestion-host">
            <label for={props.field}>{ props.label }</label>
            <input
                type="text"
                id={props.field}
                autocomplete="off"
                value={(*text).clone()}
                {oninput}
                {onfocus}
                {onblur}
            />
            if !suggestions.is_empty() {
                <ul class="suggestions">
                    { for suggestions.into_iter().map(|suggestion| {
                        let onclick = {
                            let text = text.clone();
                            let focused = focused.clone();
                            let debounce_timer = debounce_timer.clone();
                            let emit = emit.clone();
                            let value = suggestion.text.to_string();
                            Callback::from(move |_: MouseEvent| {
                                debounce_timer.set(None);
                                text.set(value.clone());
                                focused.set(false);
                                emit.emit(value.clone());
                            })
                        };
                        html! {
                            <li class={classes!("suggestion", suggestion.kind.css_class())} {onclick}>
                                { suggestion.text }
                            </li>
                        }
                    }) }
                </ul>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CheckboxGroupProps {
    pub label: &'static str,
    pub field: &'static str,
    pub choices: Vec<String>,
    pub filters: FilterSet,
    pub on_edit: Callback<FilterEdit>,
}

#[function_component(CheckboxGroup)]
pub fn checkbox_group(props: &CheckboxGroupProps) -> Html {
    html! {
        <fieldset class="checkbox-group">
            <legend>{ props.label }</legend>
            { for props.choices.iter().map(|choice| {
                let checked = props
                    .filters
                    .get(props.field)
                    .map(|v| v.contains(choice))
                    .unwrap_or(false);
                let onchange = {
                    let on_edit = props.on_edit.clone();
                    let field = props.field;
                    let value = choice.clone();
                    Callback::from(move |e: Event| {
                        on_edit.emit(FilterEdit::Toggle {
                            field,
                            value: value.clone(),
                            checked: checkbox_checked(&e),
                        })
                    })
                };
                html! {
                    <label class="checkbox-option">
                        <input type="checkbox" {checked} {onchange} />
                        { choice.clone() }
                    </label>
                }
            }) }
        </fieldset>
    }
}

#[derive(Properties, PartialEq)]
pub struct NumericFilterProps {
    pub label: &'static str,
    pub field: &'static str,
    pub value: String,
    pub options: Rc<FilterOptions>,
    pub on_edit: Callback<FilterEdit>,
}

/// Range input committed on change or Enter; invalid text stays in the box
/// with an error under it.
#[function_component(NumericFilter)]
pub fn numeric_filter(props: &NumericFilterProps) -> Html {
    let field = props.field;
    let validate: Rc<dyn Fn(&str) -> Result<String, String>> = {
        let options = props.options.clone();
        Rc::new(move |raw: &str| normalize_numeric(field, raw, &options).map_err(|e| e.to_string()))
    };
    let on_valid = props
        .on_edit
        .reform(move |value: String| FilterEdit::Numeric { field, value });
    let input = use_validated_input(props.value.clone(), validate, on_valid);

    {
        let set_value = input.set_value.clone();
        use_effect_with(props.value.clone(), move |value| {
            set_value.emit(value.clone());
            || ()
        });
    }

    let onkeydown = {
        let commit = input.on_commit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                commit.emit(());
            }
        })
    };

    let placeholder = match range_for(field, &props.options).0 {
        Some(range) if range.max > range.min => format!("{} to {}", range.min, range.max),
        _ => String::new(),
    };

    html! {
        <div class="form-group">
            <label for={field}>{ props.label }</label>
            <input
                type="number"
                id={field}
                step="any"
                {placeholder}
                value={input.text.clone()}
                class={if input.error.is_some() { "invalid" } else { "" }}
                oninput={input.on_text_input.clone()}
                onchange={input.on_commit.reform(|_| ())}
                {onkeydown}
            />
            if let Some(ref err) = input.error {
                <div class="input-error">{ err.clone() }</div>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ResultsPanelProps {
    pub phase: SearchPhase,
    pub results: Option<ResultList>,
    pub results_generation: u64,
    pub history: Vec<QueryKey>,
    pub page_size: usize,
    pub strategy: SortStrategy,
    pub on_history: Callback<QueryKey>,
    pub on_clear_history: Callback<()>,
}

#[function_component(ResultsPanel)]
pub fn results_panel(props: &ResultsPanelProps) -> Html {
    let view = use_state(|| ResultsView::new(props.page_size, props.strategy));

    // Every completed search starts on the first page
    {
        let view = view.clone();
        use_effect_with(props.results_generation, move |_| {
            let mut next = (*view).clone();
            next.on_new_results();
            view.set(next);
            || ()
        });
    }

    let history_chips = html! {
        <HistoryChips
            history={props.history.clone()}
            on_select={props.on_history.clone()}
            on_clear={props.on_clear_history.clone()}
        />
    };

    if props.phase.is_loading() {
        return html! {
            <section class="results-area">
                { render_loading() }
            </section>
        };
    }
    if let Some(message) = props.phase.error() {
        return html! {
            <section class="results-area">
                { render_error(message) }
                { history_chips }
            </section>
        };
    }
    let Some(results) = props.results.as_ref() else {
        return html! { <section class="results-area">{ history_chips }</section> };
    };

    if results.is_empty() {
        return html! {
            <section class="results-area">
                <div class="no-results-message">
                    <p>{ "No workers found" }</p>
                    <p class="hint">{ "Try adjusting your filters or repeat a recent search." }</p>
                </div>
                { history_chips }
            </section>
        };
    }

    let arranged = view.arrange(results);
    let total = arranged.len();

    let on_sort = {
        let view = view.clone();
        Callback::from(move |e: Event| match select_value(&e).parse::<SortOption>() {
            Ok(sort) => {
                let mut next = (*view).clone();
                next.select_sort(sort);
                view.set(next);
            }
            Err(e) => log::warn!("{}", e),
        })
    };
    let on_page = {
        let view = view.clone();
        Callback::from(move |next: ResultsView| view.set(next))
    };

    html! {
        <section class="results-area">
            { history_chips }
            <div class="results-toolbar">
                <span class="results-count">{ view.showing(total) }</span>
                <label class="sort-select">
                    { "Sort by " }
                    <select onchange={on_sort}>
                        { for SortOption::ALL.iter().map(|option| html! {
                            <option value={option.value()} selected={*option == view.sort()}>
                                { option.label() }
                            </option>
                        }) }
                    </select>
                </label>
            </div>
            <div class="worker-grid">
                { for view.page_items(&arranged).iter().map(|worker| html! {
                    <WorkerCard key={worker.id.to_string()} worker={worker.clone()} />
                }) }
            </div>
            <PaginationNav view={(*view).clone()} {total} on_change={on_page} />
        </section>
    }
}

fn render_loading() -> Html {
    html! {
        <div class="loading">
            <div class="spinner"></div>
            <p>{ "Searching workers..." }</p>
        </div>
    }
}

fn render_error(message: &str) -> Html {
    html! {
        <div class="current-error" role="alert">{ message.to_string() }</div>
    }
}

#[derive(Properties, PartialEq)]
pub struct WorkerCardProps {
    pub worker: Worker,
}

#[function_component(WorkerCard)]
pub fn worker_card(props: &WorkerCardProps) -> Html {
    let worker = &props.worker;
    let initial = worker
        .full_name
        .chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default();

    html! {
        <article class="worker-card">
            <div class="worker-photo">
                if let Some(ref url) = worker.profile_photo_url {
                    <img src={url.clone()} alt={worker.full_name.clone()} />
                } else {
                    <div class="photo-placeholder">{ initial }</div>
                }
            </div>
            <div class="worker-info">
                <h3>
                    { worker.full_name.clone() }
                    if worker.is_verified {
                        <span class="verified-badge">{ "Verified" }</span>
                    }
                </h3>
                <div class="worker-meta">
                    <span class="rating">{ format!("★ {}", format_rating(worker.rating)) }</span>
                    <span>{ format!("{} yrs experience", worker.years_experience) }</span>
                    <span>{ format!("Age {}", worker.age) }</span>
                </div>
                <div class="worker-location">
                    { format!("{} (from {})", worker.current_location, worker.region_of_origin) }
                </div>
                <div class="worker-details">
                    <span>{ title_case(&worker.religion) }</span>
                    <span>{ title_case(&worker.working_time) }</span>
                    <span>{ title_case(&worker.education_level) }</span>
                </div>
                { render_badges("skill-badge", worker.skills.iter().map(String::as_str)) }
                { render_badges("language-badge", worker.languages.iter().map(|l| l.name())) }
            </div>
        </article>
    }
}

fn render_badges<'a>(class: &'static str, items: impl IntoIterator<Item = &'a str>) -> Html {
    let (shown, hidden) = badges(items);
    html! {
        <div class="badges">
            { for shown.into_iter().map(|label| html! {
                <span class={class}>{ label.to_string() }</span>
            }) }
            if hidden > 0 {
                <span class="badge-more">{ format!("+{} more", hidden) }</span>
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct HistoryChipsProps {
    pub history: Vec<QueryKey>,
    pub on_select: Callback<QueryKey>,
    pub on_clear: Callback<()>,
}

/// Recent searches; clicking one re-applies its filters.
#[function_component(HistoryChips)]
pub fn history_chips(props: &HistoryChipsProps) -> Html {
    if props.history.is_empty() {
        return html! {};
    }

    html! {
        <div class="search-history">
            <span class="history-title">{ "Recent searches" }</span>
            { for props.history.iter().map(|key| {
                let onclick = {
                    let on_select = props.on_select.clone();
                    let key = key.clone();
                    Callback::from(move |_: MouseEvent| on_select.emit(key.clone()))
                };
                html! {
                    <button class="history-chip" title={key.to_string()} {onclick}>
                        { history_label(key) }
                    </button>
                }
            }) }
            <button class="btn-secondary small" onclick={props.on_clear.reform(|_| ())}>
                { "Clear" }
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PaginationNavProps {
    pub view: ResultsView,
    pub total: usize,
    pub on_change: Callback<ResultsView>,
}

#[function_component(PaginationNav)]
pub fn pagination_nav(props: &PaginationNavProps) -> Html {
    let total = props.total;
    if props.view.total_pages(total) <= 1 {
        return html! {};
    }

    let step = |f: fn(&mut ResultsView, usize)| {
        let view = props.view.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = view.clone();
            f(&mut next, total);
            on_change.emit(next);
        })
    };

    html! {
        <nav class="pagination">
            <button disabled={!props.view.has_previous()} onclick={step(ResultsView::previous)}>
                { "Previous" }
            </button>
            { for props.view.page_numbers(total).map(|page| {
                let onclick = {
                    let view = props.view.clone();
                    let on_change = props.on_change.clone();
                    Callback::from(move |_: MouseEvent| {
                        let mut next = view.clone();
                        next.go_to(page, total);
                        on_change.emit(next);
                    })
                };
                let current = page == props.view.current_page();
                html! {
                    <button class={classes!("page-number", current.then_some("active"))} {onclick}>
                        { page }
                    </button>
                }
            }) }
            <button disabled={!props.view.has_next(total)} onclick={step(ResultsView::next)}>
                { "Next" }
            </button>
        </nav>
    }
}
