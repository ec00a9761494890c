/// `LineItemForm` over the live expense-site DOM
use super::{CategorySearch, LineItemForm};
use crate::config::Timing;
use crate::dom::input::TextField;
use crate::dom::{self, sleep, ElementWait};
use crate::error::RelayError;
use crate::selectors::{self, Hook, MEMO_LABEL};
use chrono::{Datelike, NaiveDate};
use web_sys::Element;

pub struct DomForm {
    timing: Timing,
    /// Line form mounted by the last `add_line`
    form: Option<Element>,
    /// Category option found by the last successful search
    option: Option<Element>,
}

impl DomForm {
    pub fn new(timing: Timing) -> Self {
        DomForm {
            timing,
            form: None,
            option: None,
        }
    }

    async fn wait(&self, hook: Hook) -> Result<Element, RelayError> {
        ElementWait::new(hook.selector(), self.timing.wait_timeout_ms)?.await
    }

    fn form(&self) -> Result<&Element, RelayError> {
        self.form
            .as_ref()
            .ok_or_else(|| RelayError::ElementNotFound("expense form".to_string()))
    }

    fn field_in_form(&self, hook: Hook, what: &str) -> Result<TextField, RelayError> {
        dom::find_in(self.form()?, hook.selector())
            .and_then(TextField::from_element)
            .ok_or_else(|| RelayError::ElementNotFound(what.to_string()))
    }

    /// Open the date picker and click the highlighted day, or today as fallback
    async fn confirm_date_in_picker(&self) -> Result<(), RelayError> {
        sleep(self.timing.field_settle_ms).await;
        if let Some(button) = dom::find(Hook::DatePickerButton.selector()) {
            log::debug!("Clicking calendar button");
            dom::click(&button);
        }
        sleep(self.timing.field_settle_ms).await;

        let day = ElementWait::any(
            &[
                Hook::DatePickerSelectedDay.selector(),
                Hook::DatePickerSelectedToday.selector(),
            ],
            self.timing.wait_timeout_ms,
        )?
        .await?;
        log::debug!("Clicking picker day: {:?}", day.get_attribute("data-automation-id"));
        dom::click(&day);
        Ok(())
    }

    async fn enter_search(&self, input: &TextField, text: &str) -> Result<(), RelayError> {
        input.focus()?;
        input.click();
        input.set_native_value(text)?;

        sleep(self.timing.field_settle_ms).await;

        input.focus()?;
        input.submit_keys()?;

        if let Some(search) = dom::find_in(self.form()?, Hook::SearchButton.selector()) {
            dom::click(&search);
            log::debug!("Clicked search button");
        }
        log::debug!("Entered \"{}\" into expense item search", text);

        sleep(self.timing.search_settle_ms).await;
        Ok(())
    }
}

impl LineItemForm for DomForm {
    async fn open_editor(&mut self) -> Result<(), RelayError> {
        let edit = self.wait(Hook::EditReportButton).await.map_err(|e| {
            RelayError::ElementNotFound(format!("Edit Expense Report button ({})", e))
        })?;
        dom::click(&edit);
        log::info!("Clicked Edit Expense Report");
        sleep(self.timing.form_settle_ms).await;
        Ok(())
    }

    async fn add_line(&mut self) -> Result<(), RelayError> {
        self.form = None;
        self.option = None;

        let add = self.wait(Hook::AddLineButton).await?;
        dom::click(&add);
        log::debug!("Clicked Add button, waiting for expense form");

        let form = self.wait(Hook::LineEditForm).await?;
        for hook in [Hook::DateMonth, Hook::CategoryInput, Hook::AmountInput] {
            self.wait(hook).await?;
        }
        log::debug!("All form fields appeared");

        sleep(self.timing.form_settle_ms).await;
        self.form = Some(form);
        Ok(())
    }

    async fn fill_date(&mut self, date: NaiveDate) -> Result<(), RelayError> {
        let fields = [
            (self.field_in_form(Hook::DateMonth, "date input fields")?, format!("{:02}", date.month())),
            (self.field_in_form(Hook::DateDay, "date input fields")?, format!("{:02}", date.day())),
            (self.field_in_form(Hook::DateYear, "date input fields")?, format!("{:04}", date.year())),
        ];

        for (input, _) in &fields {
            input.set_value("");
        }
        for (input, text) in &fields {
            input.type_text(text, self.timing.keystroke_delay_ms).await?;
        }
        for (input, _) in &fields {
            input.fire("blur")?;
        }
        log::debug!("Set date: {}", date);

        // The typed value usually sticks even when the picker cannot be driven
        if let Err(e) = self.confirm_date_in_picker().await {
            log::warn!("Error handling date selection: {}", e);
        }
        Ok(())
    }

    async fn search_category(&mut self, label: &str) -> Result<CategorySearch, RelayError> {
        let input = self.field_in_form(Hook::CategoryInput, "expense item input")?;

        if let Err(e) = self.enter_search(&input, label).await {
            log::warn!("Expense item search failed: {}", e);
            return Ok(CategorySearch::Missing);
        }

        if dom::find(Hook::NoMatchesPrompt.selector()).is_some() {
            return Ok(CategorySearch::NoMatches);
        }

        let wait = ElementWait::new(&selectors::category_option(label), self.timing.option_wait_ms)?;
        match wait.await {
            Ok(option) => {
                self.option = Some(option);
                Ok(CategorySearch::Matched)
            }
            Err(_) => Ok(CategorySearch::Missing),
        }
    }

    async fn select_category(&mut self, label: &str) -> Result<(), RelayError> {
        let option = self
            .option
            .take()
            .ok_or_else(|| RelayError::ElementNotFound(format!("expense item option \"{}\"", label)))?;
        dom::click(&option);

        sleep(self.timing.field_settle_ms).await;

        let confirm = ElementWait::new(&selectors::category_option(label), self.timing.option_wait_ms)?;
        if confirm.await.is_err() {
            log::error!("Error waiting for selected option \"{}\"", label);
        }
        Ok(())
    }

    async fn fill_amount(&mut self, amount: &str) -> Result<(), RelayError> {
        let input = self.field_in_form(Hook::AmountInput, "amount input")?;
        input.set_and_commit(amount)?;
        log::debug!("Set amount: {}", amount);
        Ok(())
    }

    async fn fill_memo(&mut self, memo: &str) -> Result<(), RelayError> {
        let form = self.form()?;
        let label = dom::find_all_in(form, Hook::FormLabel.selector())
            .into_iter()
            .find(|label| dom::text_of(label) == MEMO_LABEL);

        let Some(label) = label else {
            log::warn!("Could not find memo label");
            return Ok(());
        };
        let Some(target_id) = label.get_attribute("for") else {
            log::warn!("Memo label has no target");
            return Ok(());
        };

        match dom::find_in(form, &selectors::element_id(&target_id)).and_then(TextField::from_element) {
            Some(input) => {
                input.set_and_commit(memo)?;
                log::debug!("Set memo: {}", memo);
            }
            None => log::warn!("Could not find memo input with ID {}", target_id),
        }
        Ok(())
    }

    async fn save_line(&mut self) -> Result<(), RelayError> {
        sleep(self.timing.field_settle_ms).await;

        let item = dom::find(Hook::SelectedListItem.selector()).or_else(|| {
            log::warn!("Could not find selected item element, trying first list item");
            dom::find(Hook::ListItem.selector())
        });
        match item {
            Some(item) => dom::click(&item),
            None => log::warn!("Could not find any list item elements"),
        }

        self.form = None;
        Ok(())
    }

    async fn pause(&mut self, ms: u32) {
        sleep(ms).await;
    }
}
