//! `window` access: localStorage, location, alerts and the notification sound.

use flowdesk_core::error::StorageError;
use flowdesk_core::ApiError;
use flowdesk_core::{KeyValueStorage, Navigator};
use js_sys::Promise;
use leptos::logging;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

/// DOM exceptions carry their text in `message`; anything else is debug-printed.
fn describe(err: &JsValue) -> String {
    js_sys::Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

fn storage() -> Result<web_sys::Storage, StorageError> {
    let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
    window
        .local_storage()
        .map_err(|e| StorageError::Unavailable(describe(&e)))?
        .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
}

/// `window.localStorage`, looked up on every call.
pub struct LocalStorage;

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        storage().ok()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Write(describe(&e)))
    }

    fn remove_item(&self, key: &str) {
        if let Ok(s) = storage() {
            let _ = s.remove_item(key);
        }
    }
}

/// Full page navigation through `location.href`. Staying on the current
/// path is a no-op so the page keeps its state.
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        if location.pathname().is_ok_and(|current| current == path) {
            return;
        }
        if let Err(e) = location.set_href(path) {
            logging::error!("navigation to {path} failed: {}", describe(&e));
        }
    }
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Blocking alert for a failed mutation. A 401 stays silent since the
/// gateway is already redirecting to login.
pub fn report_failure(err: &ApiError, fallback: &str) {
    match err.user_notice(fallback) {
        Some(text) => alert(text),
        None => logging::log!("{fallback} (session expired)"),
    }
}

pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// One audio element, rewound and replayed for every arrival.
pub struct Chime {
    audio: Option<HtmlAudioElement>,
}

impl Chime {
    pub fn new(src: &str, volume: f64) -> Self {
        let audio = HtmlAudioElement::new_with_src(src)
            .map_err(|e| logging::warn!("notification sound unavailable: {}", describe(&e)))
            .ok();
        if let Some(a) = &audio {
            a.set_volume(volume);
        }
        Self { audio }
    }

    pub fn play(&self) {
        let Some(audio) = &self.audio else {
            return;
        };
        audio.set_current_time(0.0);
        // Autoplay policies reject the promise until the user has interacted.
        let promise: Promise = match audio.play() {
            Ok(p) => p,
            Err(e) => {
                logging::warn!("notification sound failed: {}", describe(&e));
                return;
            }
        };
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                logging::warn!("notification sound blocked: {}", describe(&e));
            }
        });
    }
}
