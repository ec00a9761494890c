/// Editable transaction table

use super::categories::CategoryPicker;
use crate::category::ExpenseOptions;
use crate::transaction::Transaction;
use patternfly_yew::prelude::*;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct TransactionTableProps {
    pub transactions: Vec<Transaction>,
    pub options: ExpenseOptions,
    /// (id, "YYYY-MM-DD")
    pub on_date: Callback<(String, String)>,
    /// (id, memo)
    pub on_memo: Callback<(String, String)>,
    /// (id, category value)
    pub on_category: Callback<(String, String)>,
    /// (id, new category label)
    pub on_create_category: Callback<(String, String)>,
    pub on_delete: Callback<String>,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(TransactionTable)]
pub fn transaction_table(props: &TransactionTableProps) -> Html {
    if props.transactions.is_empty() {
        return html! {
            <p class="message-text">{"No transactions yet. Extract them from Rocket Money."}</p>
        };
    }

    html! {
        <table class="transaction-table">
            <thead>
                <tr>
                    <th>{"Date"}</th>
                    <th>{"Amount"}</th>
                    <th>{"Memo"}</th>
                    <th>{"Category"}</th>
                    <th></th>
                </tr>
            </thead>
            <tbody>
                {for props.transactions.iter().map(|txn| row(props, txn))}
            </tbody>
        </table>
    }
}

/// Change callback that tags the input's value with the row id
fn tagged(id: &str, callback: &Callback<(String, String)>) -> Callback<Event> {
    let id = id.to_string();
    let callback = callback.clone();
    Callback::from(move |e: Event| {
        let value = e.target_unchecked_into::<HtmlInputElement>().value();
        callback.emit((id.clone(), value));
    })
}

fn row(props: &TransactionTableProps, txn: &Transaction) -> Html {
    let on_date = tagged(&txn.id, &props.on_date);
    let on_memo = tagged(&txn.id, &props.on_memo);

    let on_select = {
        let id = txn.id.clone();
        let on_category = props.on_category.clone();
        Callback::from(move |value: String| on_category.emit((id.clone(), value)))
    };
    let on_create = {
        let id = txn.id.clone();
        let on_create_category = props.on_create_category.clone();
        Callback::from(move |label: String| on_create_category.emit((id.clone(), label)))
    };
    let on_delete = {
        let id = txn.id.clone();
        let on_delete = props.on_delete.clone();
        Callback::from(move |_| on_delete.emit(id.clone()))
    };

    html! {
        <tr key={txn.id.clone()}>
            <td>
                <input
                    type="date"
                    value={txn.date.format("%Y-%m-%d").to_string()}
                    disabled={props.disabled}
                    onchange={on_date}
                />
            </td>
            <td class="amount-cell">{&txn.amount}</td>
            <td>
                <input
                    type="text"
                    value={txn.description.clone()}
                    disabled={props.disabled}
                    onchange={on_memo}
                />
            </td>
            <td>
                <CategoryPicker
                    options={props.options.clone()}
                    selected={txn.expense_type.clone()}
                    selected_label={txn.expense_label.clone()}
                    on_select={on_select}
                    on_create={on_create}
                />
            </td>
            <td>
                <Button onclick={on_delete} disabled={props.disabled} variant={ButtonVariant::Plain}>
                    {"✕"}
                </Button>
            </td>
        </tr>
    }
}
