/// Popup UI for Expense Relay

use super::categories::CategoryManager;
use super::range::{RangeForm, CUSTOM_RANGE};
use super::table::TransactionTable;
use crate::bridge;
use crate::category::ExpenseOptions;
use crate::config::{self, SOURCE_URL};
use crate::dates::{self, DatePreset, DateRange};
use crate::error::RelayError;
use crate::messages::{Request, Response};
use crate::storage::{
    TransactionCache, DATE_RANGE_SUMMARY_KEY, END_DATE_KEY, EXPENSE_OPTIONS_KEY,
    PENDING_TRANSACTIONS_KEY, START_DATE_KEY, TRANSACTIONS_KEY,
};
use chrono::{Local, NaiveDate};
use patternfly_yew::prelude::*;
use serde::Serialize;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

#[derive(Clone, PartialEq)]
enum AppState {
    Idle,
    Loading(String),
    /// Extraction asked for on a page other than the finance site
    WrongSite(String),
    Error(String),
}

#[derive(Clone, PartialEq)]
enum ActivePane {
    Transactions,
    Categories,
}

/// Everything the popup restores on open
struct Saved {
    cache: TransactionCache,
    options: ExpenseOptions,
    range: Option<DateRange>,
    summary: Option<String>,
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| AppState::Idle);
    let cache = use_state(TransactionCache::new);
    let options = use_state(ExpenseOptions::defaults);
    let range_form = use_state(RangeForm::default);
    let range_error = use_state(|| None::<String>);
    let summary = use_state(|| DatePreset::AllDates.label().to_string());
    let active_pane = use_state(|| ActivePane::Transactions);

    // Restore saved state on mount
    {
        let state = state.clone();
        let cache = cache.clone();
        let options = options.clone();
        let range_form = range_form.clone();
        let summary = summary.clone();
        use_effect_with((), move |_| {
            spawn_local(async move {
                match load_saved().await {
                    Ok(saved) => {
                        let range_summary = saved
                            .summary
                            .unwrap_or_else(|| dates::range_summary(saved.range.as_ref()));
                        range_form.set(RangeForm::from_stored(saved.range, today()));
                        summary.set(range_summary);
                        cache.set(saved.cache);
                        options.set(saved.options);
                    }
                    Err(e) => {
                        state.set(AppState::Error(format!("Failed to load saved data: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    // Validate and persist a new range selection
    let apply_range = {
        let state = state.clone();
        let range_form = range_form.clone();
        let range_error = range_error.clone();
        let summary = summary.clone();
        move |form: RangeForm| {
            match form.resolve(today()) {
                Ok(range) => {
                    let text = dates::range_summary(range.as_ref());
                    range_error.set(None);
                    summary.set(text.clone());
                    save_range(range, text, state.clone());
                }
                Err(e) => range_error.set(Some(e.to_string())),
            }
            range_form.set(form);
        }
    };

    let on_preset = {
        let range_form = range_form.clone();
        let apply_range = apply_range.clone();
        Callback::from(move |e: Event| {
            let choice = e.target_unchecked_into::<HtmlSelectElement>().value();
            apply_range(range_form.choose(&choice, today()));
        })
    };

    let on_custom_start = {
        let range_form = range_form.clone();
        let apply_range = apply_range.clone();
        Callback::from(move |e: Event| {
            let start = e.target_unchecked_into::<HtmlInputElement>().value();
            apply_range(RangeForm {
                start,
                ..(*range_form).clone()
            });
        })
    };

    let on_custom_end = {
        let range_form = range_form.clone();
        let apply_range = apply_range.clone();
        Callback::from(move |e: Event| {
            let end = e.target_unchecked_into::<HtmlInputElement>().value();
            apply_range(RangeForm {
                end,
                ..(*range_form).clone()
            });
        })
    };

    // Extract handler
    let on_extract = {
        let state = state.clone();
        let cache = cache.clone();
        let options = options.clone();
        let range_form = range_form.clone();
        let range_error = range_error.clone();

        Callback::from(move |_| {
            let range = match range_form.resolve(today()) {
                Ok(range) => range,
                Err(e) => {
                    range_error.set(Some(e.to_string()));
                    return;
                }
            };

            let state = state.clone();
            let cache = cache.clone();
            let options = (*options).clone();

            state.set(AppState::Loading("Extracting transactions...".to_string()));

            spawn_local(async move {
                match extract(range, &options).await {
                    Ok(extracted) => {
                        log::info!("Loaded {} transactions", extracted.transactions.len());
                        cache.set(extracted);
                        state.set(AppState::Idle);
                    }
                    Err(RelayError::HostMismatch(message)) => {
                        state.set(AppState::WrongSite(message));
                    }
                    Err(e) => {
                        state.set(AppState::Error(format!("Failed to extract: {}", e)));
                    }
                }
            });
        })
    };

    let on_open_source = Callback::from(move |_| {
        spawn_local(async move {
            if let Err(e) = bridge::open_tab(SOURCE_URL).await {
                log::error!("Failed to open {}: {}", SOURCE_URL, e);
            }
        });
    });

    // Submit handler
    let on_submit = {
        let state = state.clone();
        let cache = cache.clone();

        Callback::from(move |_| {
            let state = state.clone();
            let cache = (*cache).clone();

            state.set(AppState::Loading("Sending transactions to Workday...".to_string()));

            spawn_local(async move {
                match submit(&cache).await {
                    Ok(true) => bridge::close_popup(),
                    Ok(false) => state.set(AppState::Idle),
                    Err(e) => state.set(AppState::Error(e.to_string())),
                }
            });
        })
    };

    // Row edits
    let on_date = {
        let state = state.clone();
        let cache = cache.clone();
        Callback::from(move |(id, text): (String, String)| {
            let Some(date) = dates::parse_input_day(&text).and_then(dates::at_normalized_hour) else {
                return;
            };
            let mut updated = (*cache).clone();
            if updated.update_date(&id, date) {
                persist(TRANSACTIONS_KEY, updated.clone(), state.clone());
                cache.set(updated);
            }
        })
    };

    let on_memo = {
        let state = state.clone();
        let cache = cache.clone();
        Callback::from(move |(id, memo): (String, String)| {
            let mut updated = (*cache).clone();
            if updated.update_description(&id, memo) {
                persist(TRANSACTIONS_KEY, updated.clone(), state.clone());
                cache.set(updated);
            }
        })
    };

    let on_category = {
        let state = state.clone();
        let cache = cache.clone();
        let options = options.clone();
        Callback::from(move |(id, value): (String, String)| {
            let mut updated = (*cache).clone();
            if updated.update_category(&id, &options, &value) {
                persist(TRANSACTIONS_KEY, updated.clone(), state.clone());
                cache.set(updated);
            }
        })
    };

    let on_create_category = {
        let state = state.clone();
        let cache = cache.clone();
        let options = options.clone();
        Callback::from(move |(id, label): (String, String)| {
            let mut updated_options = (*options).clone();
            let option = updated_options.add(&label);
            let mut updated = (*cache).clone();
            updated.update_category(&id, &updated_options, &option.value);

            persist(EXPENSE_OPTIONS_KEY, updated_options.clone(), state.clone());
            persist(TRANSACTIONS_KEY, updated.clone(), state.clone());
            options.set(updated_options);
            cache.set(updated);
        })
    };

    let on_delete = {
        let state = state.clone();
        let cache = cache.clone();
        Callback::from(move |id: String| {
            if let Some(txn) = cache.get(&id) {
                log::debug!("Deleting transaction {} ({})", id, txn.description);
            }
            let mut updated = (*cache).clone();
            if updated.remove(&id) {
                persist(TRANSACTIONS_KEY, updated.clone(), state.clone());
                cache.set(updated);
            }
        })
    };

    let on_delete_all = {
        let state = state.clone();
        let cache = cache.clone();
        Callback::from(move |_| {
            if !confirm("Are you sure you want to delete all transactions?") {
                return;
            }
            let mut updated = (*cache).clone();
            updated.clear();
            persist(TRANSACTIONS_KEY, updated.clone(), state.clone());
            cache.set(updated);
        })
    };

    // Category management
    let on_add_category = {
        let state = state.clone();
        let options = options.clone();
        Callback::from(move |label: String| {
            let mut updated = (*options).clone();
            updated.add(&label);
            persist(EXPENSE_OPTIONS_KEY, updated.clone(), state.clone());
            options.set(updated);
        })
    };

    let on_remove_category = {
        let state = state.clone();
        let options = options.clone();
        Callback::from(move |value: String| {
            let mut updated = (*options).clone();
            if updated.remove(&value) {
                persist(EXPENSE_OPTIONS_KEY, updated.clone(), state.clone());
                options.set(updated);
            }
        })
    };

    let is_busy = matches!(*state, AppState::Loading(_));
    let has_transactions = !cache.is_empty();

    let on_pane_click = {
        let active_pane = active_pane.clone();
        move |pane: ActivePane| {
            let active_pane = active_pane.clone();
            Callback::from(move |_| {
                active_pane.set(pane.clone());
            })
        }
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Expense Relay"}</h1>

            // Date range
            <div class="range-picker">
                <select class="range-select" onchange={on_preset} disabled={is_busy}>
                    {for DatePreset::ALL.iter().map(|preset| html! {
                        <option value={preset.label()} selected={range_form.choice == preset.label()}>
                            {preset.label()}
                        </option>
                    })}
                    <option value={CUSTOM_RANGE} selected={range_form.is_custom()}>{CUSTOM_RANGE}</option>
                </select>
                if range_form.is_custom() {
                    <div class="range-custom">
                        <input type="date" value={range_form.start.clone()} onchange={on_custom_start} disabled={is_busy} />
                        <span>{" to "}</span>
                        <input type="date" value={range_form.end.clone()} onchange={on_custom_end} disabled={is_busy} />
                    </div>
                }
                if let Some(err) = (*range_error).clone() {
                    <Alert r#type={AlertType::Danger} title={err} inline={true}>
                    </Alert>
                } else {
                    <p class="message-text">{format!("Range: {}", *summary)}</p>
                }
            </div>

            // Pane navigation
            <div class="pf-v5-c-tabs tabs-nav">
                <ul class="pf-v5-c-tabs__list">
                    <li class={if *active_pane == ActivePane::Transactions { "pf-v5-c-tabs__item pf-m-current" } else { "pf-v5-c-tabs__item" }}>
                        <button
                            class="pf-v5-c-tabs__link"
                            onclick={on_pane_click(ActivePane::Transactions)}
                        >
                            <span class="pf-v5-c-tabs__item-text">{format!("Transactions ({})", cache.transactions.len())}</span>
                        </button>
                    </li>
                    <li class={if *active_pane == ActivePane::Categories { "pf-v5-c-tabs__item pf-m-current" } else { "pf-v5-c-tabs__item" }}>
                        <button
                            class="pf-v5-c-tabs__link"
                            onclick={on_pane_click(ActivePane::Categories)}
                        >
                            <span class="pf-v5-c-tabs__item-text">{"Categories"}</span>
                        </button>
                    </li>
                </ul>
            </div>

            // Status display
            {match &*state {
                AppState::Loading(msg) => html! {
                    <div class="loading-text-center">
                        <Spinner />
                        <p class="loading-text">{msg}</p>
                    </div>
                },
                AppState::WrongSite(msg) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Warning} title={msg.clone()} inline={true}>
                        </Alert>
                        <Button onclick={on_open_source} variant={ButtonVariant::Link}>
                            {"Open Rocket Money"}
                        </Button>
                    </div>
                },
                AppState::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                AppState::Idle => html! {}
            }}

            <div class="tab-pane-content">
                {match &*active_pane {
                    ActivePane::Transactions => html! {
                        <div class="flex-column-gap">
                            <Button onclick={on_extract} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                                {"Get Transactions"}
                            </Button>
                            <TransactionTable
                                transactions={cache.transactions.clone()}
                                options={(*options).clone()}
                                on_date={on_date}
                                on_memo={on_memo}
                                on_category={on_category}
                                on_create_category={on_create_category}
                                on_delete={on_delete}
                                disabled={is_busy}
                            />
                            if has_transactions {
                                <Button onclick={on_delete_all} disabled={is_busy} variant={ButtonVariant::Danger} block={true}>
                                    {"Delete All"}
                                </Button>
                                <Button onclick={on_submit} disabled={is_busy} variant={ButtonVariant::Primary} block={true}>
                                    {"Add to Workday"}
                                </Button>
                            }
                        </div>
                    },
                    ActivePane::Categories => html! {
                        <CategoryManager
                            options={(*options).clone()}
                            on_add={on_add_category}
                            on_remove={on_remove_category}
                            disabled={is_busy}
                        />
                    },
                }}
            </div>

            <p class="footer-popup">
                {"Expense Relay v0.1.0"}
            </p>
        </div>
    }
}

// Helper functions

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Save `value` under `key` in the background, surfacing failures in the popup
fn persist<T: Serialize + 'static>(key: &'static str, value: T, state: UseStateHandle<AppState>) {
    spawn_local(async move {
        if let Err(e) = bridge::save(key, &value).await {
            state.set(AppState::Error(format!("Failed to save: {}", e)));
        }
    });
}

fn save_range(range: Option<DateRange>, summary: String, state: UseStateHandle<AppState>) {
    spawn_local(async move {
        let result = async {
            bridge::save(START_DATE_KEY, &range.map(|r| r.start)).await?;
            bridge::save(END_DATE_KEY, &range.map(|r| r.end)).await?;
            bridge::save(DATE_RANGE_SUMMARY_KEY, &summary).await
        };
        if let Err(e) = result.await {
            state.set(AppState::Error(format!("Failed to save date range: {}", e)));
        }
    });
}

async fn load_saved() -> Result<Saved, RelayError> {
    let cache = bridge::load::<TransactionCache>(TRANSACTIONS_KEY)
        .await?
        .unwrap_or_default();

    let options = match bridge::load::<ExpenseOptions>(EXPENSE_OPTIONS_KEY).await? {
        Some(options) => options,
        None => {
            let defaults = ExpenseOptions::defaults();
            bridge::save(EXPENSE_OPTIONS_KEY, &defaults).await?;
            defaults
        }
    };

    let start = bridge::load::<NaiveDate>(START_DATE_KEY).await?;
    let end = bridge::load::<NaiveDate>(END_DATE_KEY).await?;
    let range = Request::date_range(start, end).unwrap_or_else(|e| {
        log::warn!("Ignoring saved date range: {}", e);
        None
    });
    let summary = bridge::load::<String>(DATE_RANGE_SUMMARY_KEY).await?;

    Ok(Saved {
        cache,
        options,
        range,
        summary,
    })
}

async fn extract(range: Option<DateRange>, options: &ExpenseOptions) -> Result<TransactionCache, RelayError> {
    let tab = bridge::active_tab().await?;
    if !config::is_source_page(&tab.url) {
        return Err(RelayError::HostMismatch(
            "Please navigate to the Rocket Money transactions page".to_string(),
        ));
    }

    let scraped = match bridge::send(&tab, &Request::extract(range.as_ref())).await? {
        Response::Extracted { transactions } => transactions,
        Response::Failed { error } => return Err(RelayError::Remote(error)),
        other => {
            return Err(RelayError::Messaging(format!("unexpected response: {:?}", other)));
        }
    };

    let mut cache = TransactionCache::new();
    cache.replace_with(scraped, &options.default_option());
    bridge::save(TRANSACTIONS_KEY, &cache).await?;
    Ok(cache)
}

/// Hand the transactions to the expense page; `false` if it is still busy
async fn submit(cache: &TransactionCache) -> Result<bool, RelayError> {
    let tab = bridge::active_tab().await?;
    if !config::is_target_page(&tab.url) {
        return Err(RelayError::HostMismatch(
            "Please navigate to your Workday expense report".to_string(),
        ));
    }

    if let Response::Processing(true) = bridge::send(&tab, &Request::CheckProcessing).await? {
        log::info!("Transactions are already being added, ignoring submit");
        return Ok(false);
    }

    bridge::save(PENDING_TRANSACTIONS_KEY, &cache.transactions).await?;
    bridge::dispatch(
        &tab,
        &Request::AddToWorkday {
            transactions: cache.transactions.clone(),
        },
    )?;
    log::info!("Dispatched {} transactions", cache.transactions.len());
    Ok(true)
}
