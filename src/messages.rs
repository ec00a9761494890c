/// Request/response shapes exchanged between the popup and content scripts
use crate::dates::DateRange;
use crate::error::RelayError;
use crate::transaction::{ScrapedTransaction, Transaction};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ExtractTransactions {
        #[serde(rename = "startDate", default, skip_serializing_if = "Option::is_none")]
        start_date: Option<NaiveDate>,
        #[serde(rename = "endDate", default, skip_serializing_if = "Option::is_none")]
        end_date: Option<NaiveDate>,
    },
    AddToWorkday {
        transactions: Vec<Transaction>,
    },
    CheckProcessing,
}

impl Request {
    pub fn extract(range: Option<&DateRange>) -> Request {
        Request::ExtractTransactions {
            start_date: range.map(|r| r.start),
            end_date: range.map(|r| r.end),
        }
    }

    /// Range carried by an extract request. Both ends are needed to filter.
    pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Option<DateRange>, RelayError> {
        match (start, end) {
            (Some(start), Some(end)) => DateRange::new(start, end).map(Some),
            _ => Ok(None),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Request::ExtractTransactions { .. } => "extractTransactions",
            Request::AddToWorkday { .. } => "addToWorkday",
            Request::CheckProcessing => "checkProcessing",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Extracted { transactions: Vec<ScrapedTransaction> },
    Submitted { success: bool },
    Processing(bool),
    Failed { error: String },
}

impl Response {
    pub fn failed(err: &RelayError) -> Response {
        Response::Failed {
            error: err.to_string(),
        }
    }
}
