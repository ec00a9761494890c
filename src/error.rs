/// Error type shared by the popup, the extractor and the form-filler.
///
/// Every variant renders a message that is shown to the user as-is.
use chrono::NaiveDate;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Substring Chrome puts in the error when no content script listens on a tab
const RECEIVER_MISSING: &str = "Receiving end does not exist";

#[derive(Debug, Error)]
pub enum RelayError {
    /// An expected element never showed up in the page
    #[error("Timeout waiting for element: {selector}")]
    Timeout { selector: String },

    /// A required element was absent when it was looked up directly
    #[error("Could not find {0}")]
    ElementNotFound(String),

    #[error("Start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The active tab is not on the site the action needs
    #[error("{0}")]
    HostMismatch(String),

    #[error("Please refresh the page and try again. The extension needs to be reloaded.")]
    ReceiverMissing,

    #[error("Messaging failed: {0}")]
    Messaging(String),

    /// Error answered by a content script
    #[error("{0}")]
    Remote(String),

    #[error("Processing cancelled by user")]
    Cancelled,

    #[error("Failed to find expense item option for \"{label}\" after {attempts} attempts")]
    CategoryNotFound { label: String, attempts: u32 },

    /// Wraps the error of the transaction that stopped a batch (1-based index)
    #[error("Transaction {index} failed: {source}")]
    TransactionFailed {
        index: usize,
        #[source]
        source: Box<RelayError>,
    },

    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Browser API error: {0}")]
    Js(String),
}

impl RelayError {
    pub fn at_transaction(index: usize, source: RelayError) -> Self {
        RelayError::TransactionFailed {
            index,
            source: Box::new(source),
        }
    }

    /// Classify a rejected `chrome.tabs.sendMessage`
    pub fn messaging(value: JsValue) -> Self {
        let message = js_message(&value);
        if message.contains(RECEIVER_MISSING) {
            RelayError::ReceiverMissing
        } else {
            RelayError::Messaging(message)
        }
    }

    /// 1-based index of the failing transaction, if the error came from a batch
    pub fn failed_index(&self) -> Option<usize> {
        match self {
            RelayError::TransactionFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<JsValue> for RelayError {
    fn from(value: JsValue) -> Self {
        RelayError::Js(js_message(&value))
    }
}

impl From<serde_wasm_bindgen::Error> for RelayError {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        RelayError::Serialization(e.to_string())
    }
}

fn js_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_failed_message() {
        let err = RelayError::at_transaction(
            3,
            RelayError::Timeout {
                selector: "[data-automation-id=\"numericInput\"]".to_string(),
            },
        );

        assert_eq!(err.failed_index(), Some(3));
        assert_eq!(
            err.to_string(),
            "Transaction 3 failed: Timeout waiting for element: [data-automation-id=\"numericInput\"]"
        );
    }

    #[test]
    fn test_invalid_range_message() {
        let err = RelayError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        };

        assert_eq!(err.to_string(), "Start date 2024-03-31 is after end date 2024-03-01");
        assert_eq!(err.failed_index(), None);
    }
}
