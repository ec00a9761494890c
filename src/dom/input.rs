/// Simulated user input for React-driven form fields
use super::sleep;
use crate::error::RelayError;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, Event, EventInit, EventTarget, HtmlElement, HtmlInputElement, HtmlTextAreaElement, InputEvent,
    InputEventInit, KeyboardEvent, KeyboardEventInit,
};

const ENTER_KEY_CODE: u32 = 13;

/// A text-entry element: `<input>` or `<textarea>`
#[derive(Debug, Clone)]
pub enum TextField {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl TextField {
    pub fn from_element(element: Element) -> Option<TextField> {
        match element.dyn_into::<HtmlInputElement>() {
            Ok(input) => Some(TextField::Input(input)),
            Err(element) => element.dyn_into::<HtmlTextAreaElement>().ok().map(TextField::TextArea),
        }
    }

    pub fn value(&self) -> String {
        match self {
            TextField::Input(input) => input.value(),
            TextField::TextArea(area) => area.value(),
        }
    }

    pub fn set_value(&self, value: &str) {
        match self {
            TextField::Input(input) => input.set_value(value),
            TextField::TextArea(area) => area.set_value(value),
        }
    }

    fn select(&self) {
        match self {
            TextField::Input(input) => input.select(),
            TextField::TextArea(area) => area.select(),
        }
    }

    fn html(&self) -> &HtmlElement {
        match self {
            TextField::Input(input) => &**input,
            TextField::TextArea(area) => &**area,
        }
    }

    fn target(&self) -> &EventTarget {
        self.html()
    }

    pub fn focus(&self) -> Result<(), RelayError> {
        self.html().focus()?;
        Ok(())
    }

    pub fn click(&self) {
        self.html().click();
    }

    /// Dispatch a bubbling plain event such as "input", "change" or "blur"
    pub fn fire(&self, event_type: &str) -> Result<(), RelayError> {
        let init = EventInit::new();
        init.set_bubbles(true);
        let event = Event::new_with_event_init_dict(event_type, &init)?;
        self.target().dispatch_event(&event)?;
        Ok(())
    }

    fn fire_key(&self, event_type: &str, key: &str, enter: bool) -> Result<(), RelayError> {
        let init = KeyboardEventInit::new();
        init.set_key(key);
        init.set_bubbles(true);
        init.set_cancelable(true);
        if enter {
            init.set_code("Enter");
            init.set_key_code(ENTER_KEY_CODE);
        }
        let event = KeyboardEvent::new_with_keyboard_event_init_dict(event_type, &init)?;
        self.target().dispatch_event(&event)?;
        Ok(())
    }

    /// Single Enter keydown, as the host's numeric and text fields expect
    pub fn press_enter(&self) -> Result<(), RelayError> {
        self.fire_key("keydown", "Enter", true)
    }

    /// Full keydown/keypress/keyup sequence for both Enter and the Mac "Return"
    pub fn submit_keys(&self) -> Result<(), RelayError> {
        for key in ["Enter", "Return"] {
            for event_type in ["keydown", "keypress", "keyup"] {
                self.fire_key(event_type, key, true)?;
            }
        }
        Ok(())
    }

    /// Type `text` one character at a time so the host validates each keystroke
    pub async fn type_text(&self, text: &str, delay_ms: u32) -> Result<(), RelayError> {
        self.focus()?;
        self.select();
        for ch in text.chars() {
            let typed = ch.to_string();
            self.fire_key("keydown", &typed, false)?;

            self.set_value(&format!("{}{}", self.value(), typed));

            let init = InputEventInit::new();
            init.set_bubbles(true);
            init.set_input_type("insertText");
            init.set_data(Some(&typed));
            let event = InputEvent::new_with_event_init_dict("input", &init)?;
            self.target().dispatch_event(&event)?;

            sleep(delay_ms).await;
        }

        self.fire("change")?;
        self.fire("blur")
    }

    /// Set a value so React's change tracking sees it, then fire "input"
    ///
    /// React keeps the last value it rendered on `_valueTracker`; resetting
    /// that to the old value makes the dispatched event count as a change.
    pub fn set_native_value(&self, value: &str) -> Result<(), RelayError> {
        let last_value = self.value();
        self.set_value(value);

        let tracker = js_sys::Reflect::get(self.html(), &JsValue::from_str("_valueTracker"))?;
        if !tracker.is_undefined() && !tracker.is_null() {
            let set_value = js_sys::Reflect::get(&tracker, &JsValue::from_str("setValue"))?;
            if let Some(set_value) = set_value.dyn_ref::<js_sys::Function>() {
                set_value.call1(&tracker, &JsValue::from_str(&last_value))?;
            }
        }

        self.fire("input")
    }

    /// Focus, set the value and commit it with change + Enter
    pub fn set_and_commit(&self, value: &str) -> Result<(), RelayError> {
        self.focus()?;
        self.set_native_value(value)?;
        self.fire("change")?;
        self.press_enter()
    }
}
