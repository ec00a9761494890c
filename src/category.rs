/// Expense categories: slugs, defaults and the user-managed option list
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// One selectable expense item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpenseOption {
    pub value: String,
    pub label: String,
}

impl ExpenseOption {
    pub fn from_label(label: &str) -> ExpenseOption {
        ExpenseOption {
            value: slugify(label),
            label: label.to_string(),
        }
    }
}

const DEFAULT_LABELS: [&str; 3] = [
    "Travel Meals - Individual",
    "Travel Meals - Group",
    "Taxi/Uber/Train/Etc",
];

fn non_slug_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"))
}

/// Lowercase the label and collapse every run of other characters into "-"
///
/// Examples:
/// - "Travel Meals - Group" → "travel-meals-group"
/// - "Taxi/Uber/Train/Etc" → "taxi-uber-train-etc"
pub fn slugify(label: &str) -> String {
    non_slug_run()
        .replace_all(&label.to_lowercase(), "-")
        .into_owned()
}

/// Ordered, slug-unique list of expense options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ExpenseOptions {
    options: Vec<ExpenseOption>,
}

impl ExpenseOptions {
    pub fn new() -> Self {
        ExpenseOptions { options: Vec::new() }
    }

    pub fn defaults() -> Self {
        let mut options = ExpenseOptions::new();
        for label in DEFAULT_LABELS {
            options.add(label);
        }
        options
    }

    pub fn as_slice(&self) -> &[ExpenseOption] {
        &self.options
    }

    /// Option assigned to freshly extracted transactions
    pub fn default_option(&self) -> ExpenseOption {
        self.options
            .first()
            .cloned()
            .unwrap_or_else(|| ExpenseOption::from_label(DEFAULT_LABELS[0]))
    }

    pub fn get(&self, value: &str) -> Option<&ExpenseOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Add an option for `label`, or return the one already holding its slug
    pub fn add(&mut self, label: &str) -> ExpenseOption {
        let option = ExpenseOption::from_label(label.trim());
        if let Some(existing) = self.get(&option.value) {
            return existing.clone();
        }
        self.options.push(option.clone());
        option
    }

    pub fn remove(&mut self, value: &str) -> bool {
        let original_len = self.options.len();
        self.options.retain(|o| o.value != value);
        self.options.len() < original_len
    }

    /// Options whose label contains `term` (case-insensitive), sorted by label
    pub fn matching(&self, term: &str) -> Vec<&ExpenseOption> {
        let term = term.to_lowercase();
        let mut matches: Vec<&ExpenseOption> = self
            .options
            .iter()
            .filter(|o| o.label.to_lowercase().contains(&term))
            .collect();
        matches.sort_by(|a, b| a.label.cmp(&b.label));
        matches
    }

    /// Whether typing `term` should offer to create a new option
    pub fn offers_create(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        !term.is_empty() && !self.options.iter().any(|o| o.label.to_lowercase() == term)
    }
}

impl Default for ExpenseOptions {
    fn default() -> Self {
        Self::new()
    }
}
