/// Date-range form state behind the popup's preset select and custom inputs

use crate::dates::{self, DatePreset, DateRange};
use crate::error::RelayError;
use crate::messages::Request;
use chrono::NaiveDate;

pub const CUSTOM_RANGE: &str = "Custom range";

#[derive(Debug, Clone, PartialEq)]
pub struct RangeForm {
    /// A preset label or `CUSTOM_RANGE`
    pub choice: String,
    /// Custom inputs, `YYYY-MM-DD`
    pub start: String,
    pub end: String,
}

impl Default for RangeForm {
    fn default() -> Self {
        RangeForm {
            choice: DatePreset::AllDates.label().to_string(),
            start: String::new(),
            end: String::new(),
        }
    }
}

impl RangeForm {
    /// Rebuild the form for a stored range, preferring a preset that covers it today
    pub fn from_stored(range: Option<DateRange>, today: NaiveDate) -> RangeForm {
        let Some(range) = range else {
            return RangeForm::default();
        };
        let choice = DatePreset::ALL
            .into_iter()
            .find(|preset| preset.range(today) == Some(range))
            .map(|preset| preset.label())
            .unwrap_or(CUSTOM_RANGE);

        RangeForm {
            choice: choice.to_string(),
            start: range.start.format("%Y-%m-%d").to_string(),
            end: range.end.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn is_custom(&self) -> bool {
        DatePreset::from_label(&self.choice).is_none()
    }

    /// Switch to `choice`, filling the custom inputs from the preset's range
    pub fn choose(&self, choice: &str, today: NaiveDate) -> RangeForm {
        let mut form = RangeForm {
            choice: choice.to_string(),
            ..self.clone()
        };
        if let Some(range) = DatePreset::from_label(choice).and_then(|preset| preset.range(today)) {
            form.start = range.start.format("%Y-%m-%d").to_string();
            form.end = range.end.format("%Y-%m-%d").to_string();
        }
        form
    }

    /// The range to filter by; an incomplete custom range filters nothing
    pub fn resolve(&self, today: NaiveDate) -> Result<Option<DateRange>, RelayError> {
        match DatePreset::from_label(&self.choice) {
            Some(preset) => Ok(preset.range(today)),
            None => Request::date_range(
                dates::parse_input_day(&self.start),
                dates::parse_input_day(&self.end),
            ),
        }
    }
}
