/// Progress overlay shown on the expense site while a batch runs
use super::{BatchSession, CancelToken};
use crate::dom::document;
use crate::error::RelayError;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

const BACKDROP_STYLE: &str = "position: fixed; top: 0; left: 0; width: 100%; height: 100%; background-color: rgba(0, 0, 0, 0.5); z-index: 9999; display: flex; align-items: center; justify-content: center;";
const MODAL_STYLE: &str = "background-color: white; padding: 24px; border-radius: 8px; box-shadow: 0 2px 8px rgba(0, 0, 0, 0.15); font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; font-size: 16px; color: #333; min-width: 300px;";
const TRACK_STYLE: &str = "width: 100%; height: 4px; background-color: #e0e0e0; border-radius: 2px; margin-bottom: 8px; overflow: hidden;";
const BAR_STYLE: &str = "width: 0%; height: 100%; background-color: #4CAF50; transition: width 0.3s ease;";
const COUNT_STYLE: &str = "font-size: 14px; color: #666; text-align: center;";
const BUTTON_STYLE: &str = "padding: 8px 24px; border-radius: 24px; font-size: 14px; font-weight: 500; height: 40px; cursor: pointer; white-space: nowrap; width: 100%;";

pub struct Overlay {
    document: Document,
    root: Element,
    modal: Element,
    message: Element,
    track: HtmlElement,
    bar: HtmlElement,
    count: HtmlElement,
    cancel: HtmlElement,
    /// Handler behind `cancel`; detached and freed with the overlay
    _on_cancel: Closure<dyn FnMut()>,
}

impl Overlay {
    /// Attach the overlay; Cancel flips `token` and removes it
    pub fn show(total: usize, token: CancelToken) -> Result<Overlay, RelayError> {
        let document = document()?;
        let root = styled(&document, "div", BACKDROP_STYLE)?;
        let modal = styled(&document, "div", MODAL_STYLE)?;

        let message = styled(&document, "div", "margin-bottom: 16px;")?;
        message.set_text_content(Some("Adding transactions to expense report..."));

        let track = html(styled(&document, "div", TRACK_STYLE)?)?;
        let bar = html(styled(&document, "div", BAR_STYLE)?)?;
        let count = html(styled(&document, "div", COUNT_STYLE)?)?;
        count.set_text_content(Some(&format!("0 of {} completed", total)));

        let cancel = html(styled(
            &document,
            "button",
            &format!("{} border: 1px solid #e0e0e0; background-color: white; color: #333; margin-top: 8px;", BUTTON_STYLE),
        )?)?;
        cancel.set_text_content(Some("Cancel"));
        let on_cancel = {
            let root = root.clone();
            Closure::<dyn FnMut()>::new(move || {
                log::info!("Transaction processing was cancelled");
                token.cancel();
                root.remove();
            })
        };
        cancel.set_onclick(Some(on_cancel.as_ref().unchecked_ref()));

        track.append_child(&bar)?;
        modal.append_child(&message)?;
        modal.append_child(&track)?;
        modal.append_child(&count)?;
        modal.append_child(&cancel)?;
        root.append_child(&modal)?;
        document
            .body()
            .ok_or_else(|| RelayError::ElementNotFound("page body".to_string()))?
            .append_child(&root)?;

        Ok(Overlay {
            document,
            root,
            modal,
            message,
            track,
            bar,
            count,
            cancel,
            _on_cancel: on_cancel,
        })
    }

    pub fn set_progress(&self, done: usize, total: usize) {
        let percent = if total == 0 { 100.0 } else { done as f64 / total as f64 * 100.0 };
        let _ = self.bar.style().set_property("width", &format!("{}%", percent));
        self.count
            .set_text_content(Some(&format!("{} of {} completed", done, total)));
    }

    /// Switch to the success view; the session ends when Done is clicked
    pub fn finish(self, total: usize, session: BatchSession) -> Result<(), RelayError> {
        self.cancel.set_onclick(None);
        self.message
            .set_text_content(Some(&format!("{} transactions successfully added", total)));
        self.message
            .set_attribute("style", "font-size: 18px; font-weight: 500; margin-bottom: 8px; color: #333;")?;

        for hidden in [&self.track, &self.count, &self.cancel] {
            hidden.style().set_property("display", "none")?;
        }

        let hint = styled(&self.document, "div", "font-size: 14px; color: #666; margin-bottom: 16px; text-align: center;")?;
        hint.set_text_content(Some(
            "Review everything to make sure it looks good, then submit your expense report.",
        ));

        let done = html(styled(
            &self.document,
            "button",
            &format!("{} border: none; background-color: #000; color: white;", BUTTON_STYLE),
        )?)?;
        done.set_text_content(Some("Done"));

        // Done ends the session; the handler is freed once it has run
        let root = self.root.clone();
        let on_done = Closure::once_into_js(move || {
            root.remove();
            log::info!("Batch {} dismissed", session.id());
            drop(session);
        });
        done.set_onclick(Some(on_done.unchecked_ref()));

        self.modal.append_child(&hint)?;
        self.modal.append_child(&done)?;
        Ok(())
    }

    pub fn remove(self) {
        self.cancel.set_onclick(None);
        self.root.remove();
    }
}

fn styled(document: &Document, tag: &str, style: &str) -> Result<Element, RelayError> {
    let element = document.create_element(tag)?;
    element.set_attribute("style", style)?;
    Ok(element)
}

fn html(element: Element) -> Result<HtmlElement, RelayError> {
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| RelayError::Js("expected an HTML element".to_string()))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use crate::filler::AutomationController;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn remove_detaches_the_cancel_handler() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();
        let overlay = Overlay::show(2, session.cancel_token()).unwrap();
        let cancel = overlay.cancel.clone();
        let root = overlay.root.clone();

        overlay.remove();

        assert!(cancel.onclick().is_none());
        assert!(!root.is_connected());
    }

    #[wasm_bindgen_test]
    fn cancel_flips_the_token() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();
        let overlay = Overlay::show(2, session.cancel_token()).unwrap();

        overlay.cancel.click();

        assert!(session.is_cancelled());
        assert!(!overlay.root.is_connected());
        overlay.remove();
    }

    #[wasm_bindgen_test]
    fn done_releases_the_session() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();
        let overlay = Overlay::show(1, session.cancel_token()).unwrap();
        let cancel = overlay.cancel.clone();
        let modal = overlay.modal.clone();
        let root = overlay.root.clone();

        overlay.finish(1, session).unwrap();
        assert!(controller.is_processing());
        assert!(cancel.onclick().is_none());

        let done: HtmlElement = modal.last_element_child().unwrap().dyn_into().unwrap();
        done.click();

        assert!(!controller.is_processing());
        assert!(!root.is_connected());
    }
}
