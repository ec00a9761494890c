#![cfg(target_arch = "wasm32")]

use expense_relay::{handle_source_message, handle_target_message};
use serde_json::{json, Value};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn request(value: Value) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    serde::Serialize::serialize(&value, &serializer).unwrap()
}

fn reply(value: JsValue) -> Value {
    serde_wasm_bindgen::from_value(value).unwrap()
}

/// Mount a fake transaction table and return its container
fn mount_rows(rows: &[(&str, &str, &str)]) -> web_sys::Element {
    let document = web_sys::window().unwrap().document().unwrap();
    let table = document.create_element("div").unwrap();
    let html: String = rows
        .iter()
        .map(|(date, amount, name)| {
            format!(
                r#"<div data-test="transaction-table-row">
                     <span data-test="transaction-cell-date">{date}</span>
                     <span data-test="amount-table-cell">{amount}</span>
                     <span data-test="transaction-cell-name">{name}</span>
                   </div>"#
            )
        })
        .collect();
    table.set_inner_html(&html);
    document.body().unwrap().append_child(&table).unwrap();
    table
}

#[wasm_bindgen_test]
async fn extracts_rows_in_range() {
    let table = mount_rows(&[
        ("3/5", "$12.34", "Coffee"),
        ("4/2", "$8.00", "Out of range"),
        ("Pending", "$1.00", "No date"),
    ]);

    let response = handle_source_message(request(json!({
        "action": "extractTransactions",
        "startDate": "2024-03-01",
        "endDate": "2024-03-31",
    })))
    .await;
    table.remove();

    assert_eq!(
        reply(response),
        json!({
            "transactions": [
                {"date": "2024-03-05T12:00:00Z", "amount": "$12.34", "description": "Coffee"}
            ]
        })
    );
}

#[wasm_bindgen_test]
async fn rejects_inverted_range() {
    let response = handle_source_message(request(json!({
        "action": "extractTransactions",
        "startDate": "2024-03-31",
        "endDate": "2024-03-01",
    })))
    .await;

    assert_eq!(
        reply(response),
        json!({"error": "Start date 2024-03-31 is after end date 2024-03-01"})
    );
}

#[wasm_bindgen_test]
async fn source_page_ignores_target_actions() {
    let response = handle_source_message(request(json!({"action": "checkProcessing"}))).await;

    assert_eq!(reply(response), json!({"error": "Unsupported action: checkProcessing"}));
}

#[wasm_bindgen_test]
async fn target_page_is_idle_until_asked() {
    let response = handle_target_message(request(json!({"action": "checkProcessing"}))).await;

    assert_eq!(reply(response), json!(false));
}
