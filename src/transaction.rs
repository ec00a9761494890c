/// Data structures for extracted and editable transactions
use crate::category::ExpenseOption;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row read from the finance site, before the popup assigns id and category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapedTransaction {
    pub date: DateTime<Utc>,
    pub amount: String,
    pub description: String,
}

/// A transaction as kept by the popup and replayed into the expense report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: DateTime<Utc>,
    pub amount: String,
    /// Also used as the memo of the expense line
    pub description: String,
    pub expense_type: String,
    pub expense_label: String,
}

impl Transaction {
    pub fn from_scraped(scraped: ScrapedTransaction, category: &ExpenseOption) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            date: scraped.date,
            amount: scraped.amount,
            description: scraped.description,
            expense_type: category.value.clone(),
            expense_label: category.label.clone(),
        }
    }

    pub fn set_category(&mut self, category: &ExpenseOption) {
        self.expense_type = category.value.clone();
        self.expense_label = category.label.clone();
    }

    /// Amount as typed into the numeric field: no currency sign or separators
    pub fn numeric_amount(&self) -> String {
        self.amount
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect::<String>()
            .trim()
            .to_string()
    }
}
