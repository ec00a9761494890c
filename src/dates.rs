/// Date parsing, date ranges and popup range presets
use crate::error::RelayError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Hour of day (UTC) every parsed transaction date is pinned to
pub const NORMALIZED_HOUR: u32 = 12;

fn month_day_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(\d{1,2})/(\d{1,2})\s*$").expect("valid month/day regex"))
}

/// Parse a finance-site date label like "3/5" into a timestamp in `year`
///
/// Returns `None` for anything that is not a real calendar day.
pub fn parse_month_day(text: &str, year: i32) -> Option<DateTime<Utc>> {
    let caps = month_day_pattern().captures(text)?;
    let month: u32 = caps[1].parse().ok()?;
    let day: u32 = caps[2].parse().ok()?;

    at_normalized_hour(NaiveDate::from_ymd_opt(year, month, day)?)
}

pub fn at_normalized_hour(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(NORMALIZED_HOUR, 0, 0).map(|naive| naive.and_utc())
}

/// Parse the `YYYY-MM-DD` value of an `<input type="date">`
pub fn parse_input_day(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Inclusive range of calendar days, compared in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RelayError> {
        if start > end {
            return Err(RelayError::InvalidRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// True if `date` lies in [start 00:00:00.000, end 23:59:59.999] UTC
    pub fn contains(&self, date: &DateTime<Utc>) -> bool {
        match (
            self.start.and_hms_opt(0, 0, 0),
            self.end.and_hms_milli_opt(23, 59, 59, 999),
        ) {
            (Some(lower), Some(upper)) => *date >= lower.and_utc() && *date <= upper.and_utc(),
            _ => false,
        }
    }

    /// Year used for date labels that carry no year
    pub fn label_year(&self) -> i32 {
        self.start.year()
    }

    /// Human readable form, e.g. "Mar 1, 2024 - Mar 31, 2024"
    pub fn summary(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%b %-d, %Y"),
            self.end.format("%b %-d, %Y")
        )
    }
}

/// Ranges offered as one-click choices in the popup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    AllDates,
    ThisMonth,
    LastMonth,
    Last30Days,
    YearToDate,
}

impl DatePreset {
    pub const ALL: [DatePreset; 5] = [
        DatePreset::AllDates,
        DatePreset::ThisMonth,
        DatePreset::LastMonth,
        DatePreset::Last30Days,
        DatePreset::YearToDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DatePreset::AllDates => "All dates",
            DatePreset::ThisMonth => "This month",
            DatePreset::LastMonth => "Last month",
            DatePreset::Last30Days => "Last 30 days",
            DatePreset::YearToDate => "Year to date",
        }
    }

    pub fn from_label(label: &str) -> Option<DatePreset> {
        DatePreset::ALL.into_iter().find(|preset| preset.label() == label)
    }

    /// Range this preset covers on `today`; `None` means no filtering
    pub fn range(self, today: NaiveDate) -> Option<DateRange> {
        let first_of_month = today.with_day(1).unwrap_or(today);
        let (start, end) = match self {
            DatePreset::AllDates => return None,
            DatePreset::ThisMonth => (first_of_month, today),
            DatePreset::LastMonth => {
                let last_of_previous = first_of_month.pred_opt().unwrap_or(first_of_month);
                (last_of_previous.with_day(1).unwrap_or(last_of_previous), last_of_previous)
            }
            DatePreset::Last30Days => (today - Duration::days(29), today),
            DatePreset::YearToDate => (today.with_ordinal(1).unwrap_or(today), today),
        };
        Some(DateRange { start, end })
    }
}

/// Summary stored next to the range; "All dates" when there is none
pub fn range_summary(range: Option<&DateRange>) -> String {
    range
        .map(DateRange::summary)
        .unwrap_or_else(|| DatePreset::AllDates.label().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_month_day() {
        let parsed = parse_month_day("3/5", 2024).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-05T12:00:00+00:00");
    }

    #[rstest]
    #[case(" 12/31 ", Some((12, 31)))]
    #[case("02/09", Some((2, 9)))]
    #[case("2/30", None)]
    #[case("13/1", None)]
    #[case("Pending", None)]
    #[case("3/5/2024", None)]
    #[case("", None)]
    fn test_parse_month_day_cases(#[case] text: &str, #[case] expected: Option<(u32, u32)>) {
        let parsed = parse_month_day(text, 2023).map(|d| (d.month(), d.day()));
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_leap_day_depends_on_year() {
        assert!(parse_month_day("2/29", 2024).is_some());
        assert!(parse_month_day("2/29", 2023).is_none());
    }

    #[test]
    fn test_parse_input_day() {
        assert_eq!(parse_input_day("2024-03-05"), Some(day(2024, 3, 5)));
        assert_eq!(parse_input_day(""), None);
        assert_eq!(parse_input_day("3/5"), None);

        let pinned = at_normalized_hour(day(2024, 3, 5)).unwrap();
        assert_eq!(pinned, parse_month_day("3/5", 2024).unwrap());
    }

    #[test]
    fn test_range_rejects_start_after_end() {
        let err = DateRange::new(day(2024, 3, 31), day(2024, 3, 1)).unwrap_err();
        assert!(matches!(err, RelayError::InvalidRange { .. }));
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = DateRange::new(day(2024, 3, 1), day(2024, 3, 31)).unwrap();

        let first = day(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let last = day(2024, 3, 31).and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc();
        let before = day(2024, 2, 29).and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc();
        let after = day(2024, 4, 1).and_hms_opt(0, 0, 0).unwrap().and_utc();

        assert!(range.contains(&first));
        assert!(range.contains(&last));
        assert!(!range.contains(&before));
        assert!(!range.contains(&after));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(day(2024, 3, 5), day(2024, 3, 5)).unwrap();
        assert!(range.contains(&parse_month_day("3/5", 2024).unwrap()));
        assert!(!range.contains(&parse_month_day("3/6", 2024).unwrap()));
    }

    #[test]
    fn test_summary() {
        let range = DateRange::new(day(2024, 3, 1), day(2024, 3, 31)).unwrap();
        assert_eq!(range.summary(), "Mar 1, 2024 - Mar 31, 2024");
        assert_eq!(range_summary(None), "All dates");
    }

    #[test]
    fn test_presets() {
        let today = day(2024, 3, 15);

        assert_eq!(DatePreset::AllDates.range(today), None);
        assert_eq!(
            DatePreset::ThisMonth.range(today),
            Some(DateRange { start: day(2024, 3, 1), end: today })
        );
        assert_eq!(
            DatePreset::LastMonth.range(today),
            Some(DateRange { start: day(2024, 2, 1), end: day(2024, 2, 29) })
        );
        assert_eq!(
            DatePreset::Last30Days.range(today),
            Some(DateRange { start: day(2024, 2, 15), end: today })
        );
        assert_eq!(
            DatePreset::YearToDate.range(today),
            Some(DateRange { start: day(2024, 1, 1), end: today })
        );
    }

    #[test]
    fn test_last_month_in_january() {
        let range = DatePreset::LastMonth.range(day(2025, 1, 10)).unwrap();
        assert_eq!(range.start, day(2024, 12, 1));
        assert_eq!(range.end, day(2024, 12, 31));
    }

    #[test]
    fn test_preset_labels_round_trip() {
        for preset in DatePreset::ALL {
            assert_eq!(DatePreset::from_label(preset.label()), Some(preset));
        }
    }
}
