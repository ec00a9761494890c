/// Typed wrappers over the chrome.* glue in js/chrome.js
use crate::error::RelayError;
use crate::messages::{Request, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/js/chrome.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getActiveTab() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn sendTabMessage(tab_id: i32, message: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    fn dispatchTabMessage(tab_id: i32, message: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn openTab(url: &str) -> Result<(), JsValue>;

    fn closePopup();
}

/// The tab the popup was opened over
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveTab {
    pub id: i32,
    #[serde(default)]
    pub url: String,
}

pub async fn active_tab() -> Result<ActiveTab, RelayError> {
    let tab_js = getActiveTab().await?;
    if tab_js.is_null() || tab_js.is_undefined() {
        return Err(RelayError::Js("Could not get current tab".to_string()));
    }
    Ok(serde_wasm_bindgen::from_value(tab_js)?)
}

/// Send a request to the tab's content script and decode its answer
pub async fn send(tab: &ActiveTab, request: &Request) -> Result<Response, RelayError> {
    let message = to_js(request)?;
    let reply = sendTabMessage(tab.id, message)
        .await
        .map_err(RelayError::messaging)?;
    if reply.is_undefined() {
        return Err(RelayError::Messaging(format!("no response to {}", request.action())));
    }
    Ok(serde_wasm_bindgen::from_value(reply)?)
}

/// Send without waiting for the answer; used right before the popup closes
pub fn dispatch(tab: &ActiveTab, request: &Request) -> Result<(), RelayError> {
    dispatchTabMessage(tab.id, to_js(request)?).map_err(RelayError::messaging)
}

pub async fn load<T: DeserializeOwned>(key: &str) -> Result<Option<T>, RelayError> {
    let value = getStorage(key).await?;
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    Ok(Some(serde_wasm_bindgen::from_value(value)?))
}

pub async fn save<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<(), RelayError> {
    setStorage(key, to_js(value)?).await?;
    Ok(())
}

pub async fn open_tab(url: &str) -> Result<(), RelayError> {
    openTab(url).await?;
    Ok(())
}

pub fn close_popup() {
    closePopup();
}

/// Plain JS objects (not Maps), so chrome can structured-clone them
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, RelayError> {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    Ok(value.serialize(&serializer)?)
}
