/// Expense Relay - Chrome Extension moving card transactions into an expense report
/// Built with Rust + WASM + Yew

mod bridge;
mod category;
mod config;
mod dates;
mod dom;
mod error;
mod extractor;
mod filler;
mod messages;
mod selectors;
mod storage;
mod transaction;
pub mod ui;

use config::Timing;
use error::RelayError;
use filler::AutomationController;
use messages::{Request, Response};
use wasm_bindgen::prelude::*;

#[cfg(all(test, target_arch = "wasm32"))]
wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

thread_local! {
    static CONTROLLER: AutomationController = AutomationController::new();
}

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

/// Message handler for the finance site's content script
#[wasm_bindgen]
pub async fn handle_source_message(request: JsValue) -> JsValue {
    let response = match serde_wasm_bindgen::from_value::<Request>(request) {
        Ok(Request::ExtractTransactions { start_date, end_date }) => {
            extract(start_date, end_date).await
        }
        Ok(other) => Response::failed(&RelayError::UnsupportedAction(other.action().to_string())),
        Err(e) => Response::failed(&RelayError::from(e)),
    };
    reply(&response)
}

/// Message handler for the expense site's content script
#[wasm_bindgen]
pub async fn handle_target_message(request: JsValue) -> JsValue {
    let response = match serde_wasm_bindgen::from_value::<Request>(request) {
        Ok(Request::AddToWorkday { transactions }) => {
            log::info!("Received {} transactions to add", transactions.len());
            let controller = CONTROLLER.with(AutomationController::clone);
            match filler::submit(&controller, transactions, &Timing::default()).await {
                Ok(()) => Response::Submitted { success: true },
                Err(e) => Response::failed(&e),
            }
        }
        Ok(Request::CheckProcessing) => {
            Response::Processing(CONTROLLER.with(AutomationController::is_processing))
        }
        Ok(other) => Response::failed(&RelayError::UnsupportedAction(other.action().to_string())),
        Err(e) => Response::failed(&RelayError::from(e)),
    };
    reply(&response)
}

async fn extract(
    start_date: Option<chrono::NaiveDate>,
    end_date: Option<chrono::NaiveDate>,
) -> Response {
    let result = match Request::date_range(start_date, end_date) {
        Ok(range) => extractor::extract_transactions(range, &Timing::default()).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(transactions) => {
            log::info!("Extracted {} transactions", transactions.len());
            Response::Extracted { transactions }
        }
        Err(e) => {
            log::error!("Error extracting transactions: {}", e);
            Response::failed(&e)
        }
    }
}

fn reply(response: &Response) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    serde::Serialize::serialize(response, &serializer).unwrap_or_else(|e| {
        log::error!("Failed to serialize response: {}", e);
        JsValue::NULL
    })
}
