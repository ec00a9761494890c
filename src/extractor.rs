/// Transaction extraction from the finance site's transaction table
use crate::config::Timing;
use crate::dates::{parse_month_day, DateRange};
use crate::dom::{self, ElementWait};
use crate::error::RelayError;
use crate::selectors::Hook;
use crate::transaction::ScrapedTransaction;
use chrono::{Datelike, Local};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement};

/// Raw cell text of one table row; `None` when the cell is missing or empty
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowCells {
    pub date: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
}

impl RowCells {
    pub fn new(date: &str, amount: &str, description: &str) -> RowCells {
        RowCells {
            date: non_empty(date.trim()),
            amount: non_empty(amount.trim()),
            description: non_empty(description.trim()),
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() { None } else { Some(text.to_string()) }
}

/// Year for "M/D" labels: the range's start year, else the current year
pub fn label_year(range: Option<&DateRange>, current_year: i32) -> i32 {
    range.map_or(current_year, DateRange::label_year)
}

/// Turn raw rows into transactions, skipping incomplete rows and filtering by range
pub fn parse_rows(rows: Vec<RowCells>, range: Option<&DateRange>, current_year: i32) -> Vec<ScrapedTransaction> {
    let year = label_year(range, current_year);

    rows.into_iter()
        .filter_map(|row| {
            let (Some(date_text), Some(amount), Some(description)) = (row.date, row.amount, row.description) else {
                log::debug!("Skipping row with missing cells");
                return None;
            };
            match parse_month_day(&date_text, year) {
                Some(date) => Some(ScrapedTransaction { date, amount, description }),
                None => {
                    log::warn!("Skipping row with unparseable date: {:?}", date_text);
                    None
                }
            }
        })
        .filter(|txn| range.is_none_or(|r| r.contains(&txn.date)))
        .collect()
}

/// Wait for the table, read every row and return the transactions in range
pub async fn extract_transactions(range: Option<DateRange>, timing: &Timing) -> Result<Vec<ScrapedTransaction>, RelayError> {
    ElementWait::new(Hook::TransactionRow.selector(), timing.wait_timeout_ms)?.await?;

    let rows: Vec<RowCells> = dom::find_all(Hook::TransactionRow.selector())
        .iter()
        .map(read_row)
        .collect();
    log::info!("Found transaction elements: {}", rows.len());

    let transactions = parse_rows(rows, range.as_ref(), Local::now().year());
    log::info!("Found transactions: {}", transactions.len());
    Ok(transactions)
}

fn read_row(row: &Element) -> RowCells {
    let cell_text = |hook: Hook| dom::find_in(row, hook.selector()).map(|cell| dom::text_of(&cell));

    let description = dom::find_in(row, Hook::RowDescription.selector()).map(|cell| {
        cell.dyn_ref::<HtmlInputElement>()
            .map(|input| input.value().trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| dom::text_of(&cell))
    });

    RowCells::new(
        &cell_text(Hook::RowDate).unwrap_or_default(),
        &cell_text(Hook::RowAmount).unwrap_or_default(),
        &description.unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn march_2024() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_single_row_in_range() {
        let rows = vec![RowCells::new("3/5", "$12.34", "Coffee")];

        let txns = parse_rows(rows, Some(&march_2024()), 1999);

        assert_eq!(txns.len(), 1);
        assert_eq!(serde_json::to_value(txns[0].date).unwrap(), "2024-03-05T12:00:00Z");
        assert_eq!(txns[0].amount, "$12.34");
        assert_eq!(txns[0].description, "Coffee");
    }

    #[test]
    fn test_rows_outside_range_are_dropped() {
        let rows = vec![
            RowCells::new("2/29", "$1.00", "Before"),
            RowCells::new("3/1", "$2.00", "First day"),
            RowCells::new("3/31", "$3.00", "Last day"),
            RowCells::new("4/1", "$4.00", "After"),
        ];

        let txns = parse_rows(rows, Some(&march_2024()), 1999);
        let names: Vec<&str> = txns.iter().map(|t| t.description.as_str()).collect();

        assert_eq!(names, vec!["First day", "Last day"]);
    }

    #[test]
    fn test_incomplete_rows_are_skipped() {
        let rows = vec![
            RowCells::new("", "$1.00", "No date"),
            RowCells::new("3/2", "  ", "No amount"),
            RowCells::new("3/3", "$3.00", ""),
            RowCells::default(),
            RowCells::new("Pending", "$5.00", "Bad date"),
            RowCells::new("3/4", "$4.00", "Kept"),
        ];

        let txns = parse_rows(rows, None, 2024);

        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "Kept");
    }

    #[test]
    fn test_no_range_uses_current_year_and_keeps_everything() {
        let rows = vec![
            RowCells::new("1/2", "$1.00", "January"),
            RowCells::new("12/30", "$2.00", "December"),
        ];

        let txns = parse_rows(rows, None, 2031);

        assert_eq!(txns.len(), 2);
        assert!(txns.iter().all(|t| t.date.year() == 2031));
    }

    #[test]
    fn test_range_start_year_wins() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 12, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
        .unwrap();
        let rows = vec![
            RowCells::new("12/20", "$1.00", "December"),
            RowCells::new("1/5", "$2.00", "January"),
        ];

        let txns = parse_rows(rows, Some(&range), 2024);

        // "1/5" is read as 2023-01-05, which falls before the range
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].description, "December");
    }

    #[test]
    fn test_label_year() {
        assert_eq!(label_year(Some(&march_2024()), 1999), 2024);
        assert_eq!(label_year(None, 1999), 1999);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod dom_tests {
    use super::*;
    use crate::messages::Response;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    async fn times_out_without_rows() {
        let timing = Timing {
            wait_timeout_ms: 50,
            ..Timing::default()
        };

        let err = extract_transactions(None, &timing).await.unwrap_err();

        assert_eq!(
            serde_json::to_value(Response::failed(&err)).unwrap(),
            serde_json::json!({"error": "Timeout waiting for element: [data-test=\"transaction-table-row\"]"})
        );
    }
}
