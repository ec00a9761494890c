/// Storage keys and the popup's transaction cache for chrome.storage.local
use crate::category::{ExpenseOption, ExpenseOptions};
use crate::transaction::{ScrapedTransaction, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TRANSACTIONS_KEY: &str = "transactions";
pub const START_DATE_KEY: &str = "startDate";
pub const END_DATE_KEY: &str = "endDate";
pub const DATE_RANGE_SUMMARY_KEY: &str = "dateRangeSummary";
pub const EXPENSE_OPTIONS_KEY: &str = "expenseOptions";
pub const PENDING_TRANSACTIONS_KEY: &str = "pendingTransactions";

/// Transactions shown and edited in the popup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct TransactionCache {
    pub transactions: Vec<Transaction>,
}

impl TransactionCache {
    pub fn new() -> Self {
        TransactionCache {
            transactions: Vec::new(),
        }
    }

    /// Replace the cache with a fresh extraction, all on `category`
    pub fn replace_with(&mut self, scraped: Vec<ScrapedTransaction>, category: &ExpenseOption) {
        self.transactions = scraped
            .into_iter()
            .map(|s| Transaction::from_scraped(s, category))
            .collect();
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let original_len = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        self.transactions.len() < original_len
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
    }

    pub fn update_description(&mut self, id: &str, description: String) -> bool {
        self.transactions
            .iter_mut()
            .find(|t| t.id == id)
            .map(|t| {
                t.description = description;
            })
            .is_some()
    }

    pub fn update_date(&mut self, id: &str, date: DateTime<Utc>) -> bool {
        self.transactions
            .iter_mut()
            .find(|t| t.id == id)
            .map(|t| {
                t.date = date;
            })
            .is_some()
    }

    /// Point a transaction at an existing option
    pub fn update_category(&mut self, id: &str, options: &ExpenseOptions, value: &str) -> bool {
        match options.get(value) {
            Some(option) => self
                .transactions
                .iter_mut()
                .find(|t| t.id == id)
                .map(|t| t.set_category(option))
                .is_some(),
            None => false,
        }
    }
}

impl Default for TransactionCache {
    fn default() -> Self {
        Self::new()
    }
}
