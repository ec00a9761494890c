/// Helpers for reading and driving host pages
pub mod input;
pub mod watch;

use crate::error::RelayError;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlElement, Window};

pub use watch::ElementWait;

pub fn window() -> Result<Window, RelayError> {
    web_sys::window().ok_or_else(|| RelayError::Js("no window".to_string()))
}

pub fn document() -> Result<Document, RelayError> {
    window()?
        .document()
        .ok_or_else(|| RelayError::Js("no document".to_string()))
}

/// `setTimeout` delay for `ms`, saturating at the largest delay a timer accepts
pub fn timer_delay(ms: u32) -> i32 {
    i32::try_from(ms).unwrap_or(i32::MAX)
}

/// Resolve after `ms` milliseconds without blocking the page
pub async fn sleep(ms: u32) {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timer_delay(ms));
        }
    });
    let _ = JsFuture::from(promise).await;
}

/// First element under `scope` matching `selector`
pub fn find_in(scope: &Element, selector: &str) -> Option<Element> {
    scope.query_selector(selector).ok().flatten()
}

/// First element in the document matching `selector`
pub fn find(selector: &str) -> Option<Element> {
    document().ok()?.query_selector(selector).ok().flatten()
}

/// Every element under `scope` matching `selector`, in document order
pub fn find_all_in(scope: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = scope.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub fn find_all(selector: &str) -> Vec<Element> {
    match document().ok().and_then(|d| d.document_element()) {
        Some(root) => find_all_in(&root, selector),
        None => Vec::new(),
    }
}

/// Trimmed text content of an element
pub fn text_of(element: &Element) -> String {
    element.text_content().unwrap_or_default().trim().to_string()
}

pub fn click(element: &Element) {
    if let Some(html) = element.dyn_ref::<HtmlElement>() {
        html.click();
    }
}
