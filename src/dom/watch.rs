//! Waiting for elements to appear.
//!
//! An [`ElementWait`] checks the document once, then re-checks on every DOM
//! mutation until one of its selectors matches or the deadline passes.
//! Dropping the handle disconnects the observer and clears the deadline, so
//! abandoning a wait is just letting it go out of scope.

use super::{document, timer_delay, window};
use crate::error::RelayError;
use futures::channel::oneshot;
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit};

type Slot = Rc<RefCell<Option<oneshot::Sender<Element>>>>;

pub struct ElementWait {
    receiver: oneshot::Receiver<Element>,
    selectors: Vec<String>,
    observer: Option<MutationObserver>,
    timer: Option<i32>,
    _on_mutation: Option<Closure<dyn FnMut()>>,
    _on_deadline: Option<Closure<dyn FnMut()>>,
}

impl ElementWait {
    pub fn new(selector: &str, timeout_ms: u32) -> Result<Self, RelayError> {
        Self::any(&[selector], timeout_ms)
    }

    /// Wait for the first of `selectors` to match; earlier selectors win ties
    pub fn any(selectors: &[&str], timeout_ms: u32) -> Result<Self, RelayError> {
        let document = document()?;
        let selectors: Vec<String> = selectors.iter().map(|s| s.to_string()).collect();
        let (sender, receiver) = oneshot::channel();

        if let Some(found) = first_match(&document, &selectors) {
            let _ = sender.send(found);
            return Ok(ElementWait {
                receiver,
                selectors,
                observer: None,
                timer: None,
                _on_mutation: None,
                _on_deadline: None,
            });
        }

        let slot: Slot = Rc::new(RefCell::new(Some(sender)));

        let on_mutation = {
            let slot = slot.clone();
            let document = document.clone();
            let selectors = selectors.clone();
            Closure::<dyn FnMut()>::new(move || {
                if slot.borrow().is_none() {
                    return;
                }
                if let Some(found) = first_match(&document, &selectors) {
                    if let Some(sender) = slot.borrow_mut().take() {
                        let _ = sender.send(found);
                    }
                }
            })
        };

        // Dropping the sender resolves the receiver as cancelled, read as a timeout
        let on_deadline = {
            let slot = slot.clone();
            Closure::<dyn FnMut()>::new(move || {
                slot.borrow_mut().take();
            })
        };

        let root = document
            .document_element()
            .ok_or_else(|| RelayError::ElementNotFound("document root".to_string()))?;
        let observer = MutationObserver::new(on_mutation.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        init.set_attributes(true);
        observer.observe_with_options(&root, &init)?;

        let timer = window()?.set_timeout_with_callback_and_timeout_and_arguments_0(
            on_deadline.as_ref().unchecked_ref(),
            timer_delay(timeout_ms),
        )?;

        Ok(ElementWait {
            receiver,
            selectors,
            observer: Some(observer),
            timer: Some(timer),
            _on_mutation: Some(on_mutation),
            _on_deadline: Some(on_deadline),
        })
    }
}

impl Future for ElementWait {
    type Output = Result<Element, RelayError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(element)) => Poll::Ready(Ok(element)),
            Poll::Ready(Err(oneshot::Canceled)) => {
                let selector = self.selectors.first().cloned().unwrap_or_default();
                log::error!("Timeout waiting for element: {}", selector);
                Poll::Ready(Err(RelayError::Timeout { selector }))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for ElementWait {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
        if let (Some(timer), Some(window)) = (self.timer.take(), web_sys::window()) {
            window.clear_timeout_with_handle(timer);
        }
    }
}

fn first_match(document: &Document, selectors: &[String]) -> Option<Element> {
    selectors
        .iter()
        .find_map(|selector| document.query_selector(selector).ok().flatten())
}
