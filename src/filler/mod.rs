/// Replays transactions into the expense report's line-item form
mod dom_form;
mod overlay;
mod session;

pub use dom_form::DomForm;
pub use overlay::Overlay;
pub use session::{AutomationController, BatchSession, CancelToken};

use crate::config::Timing;
use crate::error::RelayError;
use crate::transaction::Transaction;
use chrono::NaiveDate;

/// Where a batch currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillState {
    Idle,
    AwaitingAddButton,
    FormOpen,
    FillingDate,
    FillingCategory,
    FillingAmount,
    FillingMemo,
    Saving,
    Done,
    Cancelled,
    Failed,
}

/// What the host UI showed after a category search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySearch {
    /// The option for the label is on screen
    Matched,
    /// The host said "No matches found"
    NoMatches,
    /// Neither showed up in time
    Missing,
}

/// The steps of entering one expense line
#[allow(async_fn_in_trait)]
pub trait LineItemForm {
    /// Put the report into edit mode, once per batch
    async fn open_editor(&mut self) -> Result<(), RelayError>;
    /// Click "add" and wait until the line form is usable
    async fn add_line(&mut self) -> Result<(), RelayError>;
    async fn fill_date(&mut self, date: NaiveDate) -> Result<(), RelayError>;
    /// Type `label` into the category search and report what came back
    async fn search_category(&mut self, label: &str) -> Result<CategorySearch, RelayError>;
    async fn select_category(&mut self, label: &str) -> Result<(), RelayError>;
    async fn fill_amount(&mut self, amount: &str) -> Result<(), RelayError>;
    async fn fill_memo(&mut self, memo: &str) -> Result<(), RelayError>;
    /// Commit the line
    async fn save_line(&mut self) -> Result<(), RelayError>;
    async fn pause(&mut self, ms: u32);
}

/// How the category step ended for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryOutcome {
    Selected,
    Skipped,
}

/// Search for and pick the category, retrying while the option fails to show
pub async fn choose_category<F: LineItemForm>(
    form: &mut F,
    label: &str,
    timing: &Timing,
) -> Result<CategoryOutcome, RelayError> {
    let attempts = timing.category_attempts.max(1);
    for attempt in 1..=attempts {
        match form.search_category(label).await? {
            CategorySearch::Matched => {
                form.select_category(label).await?;
                log::info!("Selected \"{}\"", label);
                return Ok(CategoryOutcome::Selected);
            }
            CategorySearch::NoMatches => {
                log::warn!("No matches found for \"{}\", skipping expense item selection", label);
                return Ok(CategoryOutcome::Skipped);
            }
            CategorySearch::Missing if attempt < attempts => {
                log::warn!("Could not find expense item \"{}\", retry {} of {}", label, attempt, attempts);
                form.pause(timing.category_backoff_ms).await;
            }
            CategorySearch::Missing => {}
        }
    }
    Err(RelayError::CategoryNotFound {
        label: label.to_string(),
        attempts,
    })
}

/// Enter every transaction in order; stops at the first failure or cancel
///
/// `on_progress(done, total)` runs after each saved line. A failure is
/// reported with the 1-based index of the transaction it happened on.
pub async fn run_batch<F: LineItemForm>(
    form: &mut F,
    session: &BatchSession,
    transactions: &[Transaction],
    timing: &Timing,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<(), RelayError> {
    let total = transactions.len();
    log::info!("Processing {} transactions", total);

    let result = async {
        form.open_editor().await?;

        for (i, txn) in transactions.iter().enumerate() {
            let index = i + 1;
            if session.is_cancelled() {
                return Err(RelayError::Cancelled);
            }
            log::info!("Processing transaction {} of {}: {}", index, total, txn.description);

            fill_one(form, session, txn, timing)
                .await
                .map_err(|e| match e {
                    RelayError::Cancelled => e,
                    other => RelayError::at_transaction(index, other),
                })?;

            log::info!("Successfully processed transaction {}", index);
            on_progress(index, total);

            if index < total {
                form.pause(timing.between_transactions_ms).await;
            }
        }
        Ok::<(), RelayError>(())
    }
    .await;

    session.set_state(match &result {
        Ok(()) => FillState::Done,
        Err(RelayError::Cancelled) => FillState::Cancelled,
        Err(_) => FillState::Failed,
    });
    result
}

/// Run a batch against the live page behind the progress overlay
///
/// A second call while a batch holds `controller` does nothing.
pub async fn submit(
    controller: &AutomationController,
    transactions: Vec<Transaction>,
    timing: &Timing,
) -> Result<(), RelayError> {
    let Some(session) = controller.try_begin() else {
        log::info!("Transaction processing is already in progress");
        return Ok(());
    };

    let total = transactions.len();
    let overlay = Overlay::show(total, session.cancel_token())?;
    let mut form = DomForm::new(timing.clone());

    let result = run_batch(&mut form, &session, &transactions, timing, |done, total| {
        overlay.set_progress(done, total)
    })
    .await;
    log::info!("Batch {} ended as {:?}", session.id(), session.state());

    match result {
        Ok(()) => {
            log::info!("Successfully processed all transactions");
            overlay.finish(total, session)
        }
        Err(e) => {
            if let Some(index) = e.failed_index() {
                log::error!("Stopped at transaction {} of {}", index, total);
            }
            log::error!("Error processing transactions: {}", e);
            overlay.remove();
            Err(e)
        }
    }
}

async fn fill_one<F: LineItemForm>(
    form: &mut F,
    session: &BatchSession,
    txn: &Transaction,
    timing: &Timing,
) -> Result<(), RelayError> {
    session.set_state(FillState::AwaitingAddButton);
    form.add_line().await?;
    session.set_state(FillState::FormOpen);

    if session.is_cancelled() {
        return Err(RelayError::Cancelled);
    }

    session.set_state(FillState::FillingDate);
    form.fill_date(txn.date.date_naive()).await?;

    session.set_state(FillState::FillingCategory);
    choose_category(form, &txn.expense_label, timing).await?;

    session.set_state(FillState::FillingAmount);
    form.fill_amount(&txn.numeric_amount()).await?;

    session.set_state(FillState::FillingMemo);
    form.fill_memo(&txn.description).await?;

    session.set_state(FillState::Saving);
    form.save_line().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ExpenseOption;
    use crate::transaction::ScrapedTransaction;
    use chrono::{TimeZone, Utc};
    use futures::executor::block_on;
    use std::collections::VecDeque;

    /// Records every call; behaviour is scripted per call
    #[derive(Default)]
    struct FakeForm {
        calls: Vec<String>,
        lines_added: usize,
        fail_add_on_line: Option<usize>,
        searches: VecDeque<CategorySearch>,
        pauses: Vec<u32>,
        cancel_after_line: Option<(usize, CancelToken)>,
    }

    impl LineItemForm for FakeForm {
        async fn open_editor(&mut self) -> Result<(), RelayError> {
            self.calls.push("open_editor".to_string());
            Ok(())
        }

        async fn add_line(&mut self) -> Result<(), RelayError> {
            self.lines_added += 1;
            self.calls.push(format!("add_line {}", self.lines_added));
            if self.fail_add_on_line == Some(self.lines_added) {
                return Err(RelayError::Timeout {
                    selector: "[data-automation-id=\"multiViewContainerAddButton\"]".to_string(),
                });
            }
            if let Some((line, token)) = &self.cancel_after_line {
                if *line == self.lines_added {
                    token.cancel();
                }
            }
            Ok(())
        }

        async fn fill_date(&mut self, date: NaiveDate) -> Result<(), RelayError> {
            self.calls.push(format!("date {}", date));
            Ok(())
        }

        async fn search_category(&mut self, label: &str) -> Result<CategorySearch, RelayError> {
            self.calls.push(format!("search {}", label));
            Ok(self.searches.pop_front().unwrap_or(CategorySearch::Matched))
        }

        async fn select_category(&mut self, label: &str) -> Result<(), RelayError> {
            self.calls.push(format!("select {}", label));
            Ok(())
        }

        async fn fill_amount(&mut self, amount: &str) -> Result<(), RelayError> {
            self.calls.push(format!("amount {}", amount));
            Ok(())
        }

        async fn fill_memo(&mut self, memo: &str) -> Result<(), RelayError> {
            self.calls.push(format!("memo {}", memo));
            Ok(())
        }

        async fn save_line(&mut self) -> Result<(), RelayError> {
            self.calls.push("save".to_string());
            Ok(())
        }

        async fn pause(&mut self, ms: u32) {
            self.pauses.push(ms);
        }
    }

    fn txn(day: u32, amount: &str, memo: &str, label: &str) -> Transaction {
        Transaction::from_scraped(
            ScrapedTransaction {
                date: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
                amount: amount.to_string(),
                description: memo.to_string(),
            },
            &ExpenseOption::from_label(label),
        )
    }

    fn batch(n: u32) -> Vec<Transaction> {
        (1..=n).map(|d| txn(d, "$10.00", &format!("Item {}", d), "Parking")).collect()
    }

    #[test]
    fn test_single_transaction_steps_in_order() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();
        let mut form = FakeForm::default();
        let txns = vec![txn(5, "$12.34", "Coffee", "Travel Meals - Individual")];

        block_on(run_batch(&mut form, &session, &txns, &Timing::default(), |_, _| {})).unwrap();

        assert_eq!(
            form.calls,
            vec![
                "open_editor",
                "add_line 1",
                "date 2024-03-05",
                "search Travel Meals - Individual",
                "select Travel Meals - Individual",
                "amount 12.34",
                "memo Coffee",
                "save",
            ]
        );
        assert_eq!(session.state(), FillState::Done);
    }

    #[test]
    fn test_delay_only_between_transactions() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();
        let mut form = FakeForm::default();
        let mut progress = Vec::new();

        block_on(run_batch(&mut form, &session, &batch(3), &Timing::default(), |done, total| {
            progress.push((done, total))
        }))
        .unwrap();

        assert_eq!(form.pauses, vec![2_000, 2_000]);
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_failure_at_k_stops_batch_and_reports_index() {
        for (n, k) in [(1, 1), (3, 1), (3, 2), (3, 3), (5, 4)] {
            let controller = AutomationController::new();
            let session = controller.try_begin().unwrap();
            let mut form = FakeForm {
                fail_add_on_line: Some(k),
                ..Default::default()
            };
            let mut saved = 0;

            let err = block_on(run_batch(&mut form, &session, &batch(n), &Timing::default(), |done, _| {
                saved = done
            }))
            .unwrap_err();

            assert_eq!(err.failed_index(), Some(k), "n={} k={}", n, k);
            assert_eq!(form.lines_added, k, "nothing after {} may start", k);
            assert_eq!(saved, k - 1);
            assert_eq!(session.state(), FillState::Failed);
        }
    }

    #[test]
    fn test_no_matches_skips_selection_without_error() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();
        let mut form = FakeForm {
            searches: VecDeque::from(vec![CategorySearch::NoMatches]),
            ..Default::default()
        };
        let txns = vec![txn(5, "$12.34", "Train", "Travel")];

        block_on(run_batch(&mut form, &session, &txns, &Timing::default(), |_, _| {})).unwrap();

        assert!(!form.calls.iter().any(|c| c.starts_with("select")));
        assert!(form.calls.contains(&"amount 12.34".to_string()));
        assert!(form.calls.contains(&"memo Train".to_string()));
        assert_eq!(form.calls.last().map(String::as_str), Some("save"));
    }

    #[test]
    fn test_category_retries_then_selects() {
        let mut form = FakeForm {
            searches: VecDeque::from(vec![CategorySearch::Missing, CategorySearch::Missing, CategorySearch::Matched]),
            ..Default::default()
        };

        let outcome = block_on(choose_category(&mut form, "Parking", &Timing::default())).unwrap();

        assert_eq!(outcome, CategoryOutcome::Selected);
        assert_eq!(form.pauses, vec![1_000, 1_000]);
    }

    #[test]
    fn test_category_gives_up_after_three_attempts() {
        let mut form = FakeForm {
            searches: VecDeque::from(vec![CategorySearch::Missing; 4]),
            ..Default::default()
        };

        let err = block_on(choose_category(&mut form, "Parking", &Timing::default())).unwrap_err();

        assert!(matches!(err, RelayError::CategoryNotFound { attempts: 3, .. }));
        assert_eq!(form.calls.iter().filter(|c| c.starts_with("search")).count(), 3);
        assert_eq!(form.pauses, vec![1_000, 1_000]);
    }

    #[test]
    fn test_cancel_stops_before_filling() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();
        let mut form = FakeForm {
            cancel_after_line: Some((2, session.cancel_token())),
            ..Default::default()
        };

        let err = block_on(run_batch(&mut form, &session, &batch(3), &Timing::default(), |_, _| {})).unwrap_err();

        assert!(matches!(err, RelayError::Cancelled));
        assert_eq!(form.lines_added, 2);
        assert_eq!(form.calls.iter().filter(|c| c.as_str() == "save").count(), 1);
        assert_eq!(session.state(), FillState::Cancelled);
    }

    #[test]
    fn test_cancel_before_start() {
        let controller = AutomationController::new();
        let session = controller.try_begin().unwrap();
        session.cancel_token().cancel();
        let mut form = FakeForm::default();

        let err = block_on(run_batch(&mut form, &session, &batch(2), &Timing::default(), |_, _| {})).unwrap_err();

        assert!(matches!(err, RelayError::Cancelled));
        assert_eq!(form.lines_added, 0);
    }
}
