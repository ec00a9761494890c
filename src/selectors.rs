/// Selector table for the two host sites.
///
/// Both sites expose test/automation attributes that are not versioned, so
/// every selector the extension relies on is listed here and nowhere else.

/// Logical page elements the extension reads or drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    // Finance site
    TransactionRow,
    RowDate,
    RowAmount,
    RowDescription,

    // Expense site
    EditReportButton,
    AddLineButton,
    LineEditForm,
    DateMonth,
    DateDay,
    DateYear,
    DatePickerButton,
    DatePickerSelectedDay,
    DatePickerSelectedToday,
    CategoryInput,
    SearchButton,
    NoMatchesPrompt,
    FormLabel,
    AmountInput,
    SelectedListItem,
    ListItem,
}

impl Hook {
    #[cfg(test)]
    pub const ALL: [Hook; 20] = [
        Hook::TransactionRow,
        Hook::RowDate,
        Hook::RowAmount,
        Hook::RowDescription,
        Hook::EditReportButton,
        Hook::AddLineButton,
        Hook::LineEditForm,
        Hook::DateMonth,
        Hook::DateDay,
        Hook::DateYear,
        Hook::DatePickerButton,
        Hook::DatePickerSelectedDay,
        Hook::DatePickerSelectedToday,
        Hook::CategoryInput,
        Hook::SearchButton,
        Hook::NoMatchesPrompt,
        Hook::FormLabel,
        Hook::AmountInput,
        Hook::SelectedListItem,
        Hook::ListItem,
    ];

    pub const fn selector(self) -> &'static str {
        match self {
            Hook::TransactionRow => r#"[data-test="transaction-table-row"]"#,
            Hook::RowDate => r#"[data-test="transaction-cell-date"]"#,
            Hook::RowAmount => r#"[data-test="amount-table-cell"]"#,
            Hook::RowDescription => r#"[data-test="transaction-cell-name"]"#,
            Hook::EditReportButton => r#"[title="Edit Expense Report"]"#,
            Hook::AddLineButton => r#"[data-automation-id="multiViewContainerAddButton"]"#,
            Hook::LineEditForm => r#"[data-automation-id="inlineRowEditPage"]"#,
            Hook::DateMonth => r#"[data-automation-id="dateSectionMonth-input"]"#,
            Hook::DateDay => r#"[data-automation-id="dateSectionDay-input"]"#,
            Hook::DateYear => r#"[data-automation-id="dateSectionYear-input"]"#,
            Hook::DatePickerButton => r#"[data-automation-id="datePickerButton"]"#,
            Hook::DatePickerSelectedDay => r#"[data-automation-id="datePickerSelectedDay"]"#,
            Hook::DatePickerSelectedToday => r#"[data-automation-id="datePickerSelectedToday"]"#,
            Hook::CategoryInput => r#"[data-automation-id="monikerListSuggestionsInput"] input"#,
            Hook::SearchButton => r#"[data-automation-id="searchButton"]"#,
            Hook::NoMatchesPrompt => r#"[data-automation-id="promptTitle"][title="No matches found"]"#,
            Hook::FormLabel => r#"[data-automation-id="formLabel"]"#,
            Hook::AmountInput => r#"[data-automation-id="numericInput"]"#,
            Hook::SelectedListItem => {
                r#"[data-automation-id="multiViewListDetailItem"][data-automation-selected="true"]"#
            }
            Hook::ListItem => r#"[data-automation-id="multiViewListDetailItem"]"#,
        }
    }
}

/// Label text that identifies the memo field on the line form
pub const MEMO_LABEL: &str = "Memo";

/// Radio option for a category in the expense site's search results
pub fn category_option(label: &str) -> String {
    attribute_equals("data-automation-label", label)
}

/// Element whose `id` is exactly `id`
pub fn element_id(id: &str) -> String {
    attribute_equals("id", id)
}

fn attribute_equals(name: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[{}=\"{}\"]", name, escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_selectors_are_distinct() {
        let selectors: HashSet<&str> = Hook::ALL.iter().map(|hook| hook.selector()).collect();
        assert_eq!(selectors.len(), Hook::ALL.len());
    }

    #[test]
    fn test_category_option() {
        assert_eq!(
            category_option("Travel Meals - Individual"),
            r#"[data-automation-label="Travel Meals - Individual"]"#
        );
    }

    #[test]
    fn test_category_option_escapes_quotes() {
        assert_eq!(
            category_option(r#"12" Sub"#),
            r#"[data-automation-label="12\" Sub"]"#
        );
    }

    #[test]
    fn test_element_id() {
        assert_eq!(element_id("56$301"), r#"[id="56$301"]"#);
    }
}
