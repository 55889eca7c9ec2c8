use gloo_timers::callback::Timeout;
use log::warn;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use worker_search::config::AUTH_TOKEN_KEY;
use worker_search::{HistoryStorage, LocalStorage};
use yew::prelude::*;

/// Create a debounced callback that cancels any previous pending call
pub fn debounce_callback<T: 'static>(
    timer_handle: &UseStateHandle<Option<Timeout>>,
    callback: Callback<T>,
    value: T,
    delay_ms: u32,
) {
    // Dropping the old Timeout cancels it
    timer_handle.set(None);

    let timer_handle_clone = timer_handle.clone();
    let handle = Timeout::new(delay_ms, move || {
        callback.emit(value);
        timer_handle_clone.set(None);
    });
    timer_handle.set(Some(handle));
}

/// Turn a configured API base into an absolute URL. Relative bases are
/// resolved against the page origin.
pub fn resolve_api_base(base: &str) -> String {
    if base.starts_with("http://") || base.starts_with("https://") {
        return base.to_string();
    }
    match gloo_utils::window().location().origin() {
        Ok(origin) => format!("{}/{}", origin.trim_end_matches('/'), base.trim_start_matches('/')),
        Err(e) => {
            warn!("Could not read page origin: {:?}", e);
            base.to_string()
        }
    }
}

/// Bearer token left in `localStorage` by the login page.
pub fn stored_auth_token() -> Option<String> {
    match LocalStorage.read(AUTH_TOKEN_KEY) {
        Ok(token) => token,
        Err(e) => {
            warn!("Could not read auth token: {}", e);
            None
        }
    }
}

pub fn input_value(e: &InputEvent) -> String {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.value()
}

pub fn checkbox_checked(e: &Event) -> bool {
    let input: HtmlInputElement = e.target_unchecked_into();
    input.checked()
}

pub fn select_value(e: &Event) -> String {
    let select: HtmlSelectElement = e.target_unchecked_into();
    select.value()
}
