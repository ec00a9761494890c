/// Category picker for a transaction row, and the category manager panel

use crate::category::ExpenseOptions;
use patternfly_yew::prelude::*;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

/// Select value that switches the picker into search/create mode
const NEW_CATEGORY: &str = "__new__";

/// One `<option>` of the category select
#[derive(Debug, Clone, PartialEq)]
pub struct SelectEntry {
    pub value: String,
    pub label: String,
    pub selected: bool,
    pub disabled: bool,
}

/// Options for a row whose category is `selected` / `selected_label`
///
/// A category deleted after it was assigned stays visible as a disabled,
/// selected entry, so the row shows the label it will be submitted with.
pub fn select_entries(options: &ExpenseOptions, selected: &str, selected_label: &str) -> Vec<SelectEntry> {
    let mut entries = Vec::new();
    if options.get(selected).is_none() {
        entries.push(SelectEntry {
            value: selected.to_string(),
            label: selected_label.to_string(),
            selected: true,
            disabled: true,
        });
    }
    entries.extend(options.as_slice().iter().map(|option| SelectEntry {
        value: option.value.clone(),
        label: option.label.clone(),
        selected: option.value == selected,
        disabled: false,
    }));
    entries
}

#[derive(Properties, PartialEq)]
pub struct CategoryPickerProps {
    pub options: ExpenseOptions,
    pub selected: String,
    /// Label stored on the transaction, shown even if its option is gone
    pub selected_label: String,
    pub on_select: Callback<String>,
    pub on_create: Callback<String>,
}

#[function_component(CategoryPicker)]
pub fn category_picker(props: &CategoryPickerProps) -> Html {
    let searching = use_state(|| false);
    let term = use_state(String::new);

    let on_change = {
        let searching = searching.clone();
        let on_select = props.on_select.clone();
        Callback::from(move |e: Event| {
            let value = e.target_unchecked_into::<HtmlSelectElement>().value();
            if value == NEW_CATEGORY {
                searching.set(true);
            } else {
                on_select.emit(value);
            }
        })
    };

    if !*searching {
        return html! {
            <select class="category-select" onchange={on_change}>
                {for select_entries(&props.options, &props.selected, &props.selected_label)
                    .into_iter()
                    .map(|entry| html! {
                        <option value={entry.value} selected={entry.selected} disabled={entry.disabled}>
                            {entry.label}
                        </option>
                    })}
                <option value={NEW_CATEGORY}>{"+ New category..."}</option>
            </select>
        };
    }

    let on_input = {
        let term = term.clone();
        Callback::from(move |e: InputEvent| {
            term.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let close = {
        let searching = searching.clone();
        let term = term.clone();
        move || {
            searching.set(false);
            term.set(String::new());
        }
    };

    let pick = {
        let close = close.clone();
        let on_select = props.on_select.clone();
        move |value: String| {
            let close = close.clone();
            let on_select = on_select.clone();
            Callback::from(move |_: MouseEvent| {
                on_select.emit(value.clone());
                close();
            })
        }
    };

    let on_create = {
        let close = close.clone();
        let on_create = props.on_create.clone();
        let label = term.trim().to_string();
        Callback::from(move |_: MouseEvent| {
            on_create.emit(label.clone());
            close();
        })
    };

    let on_cancel = Callback::from(move |_: MouseEvent| close());

    html! {
        <div class="category-search">
            <input
                type="text"
                class="category-search-input"
                placeholder="Search or create category"
                value={(*term).clone()}
                oninput={on_input}
            />
            <div class="category-suggestions">
                {for props.options.matching(&term).into_iter().map(|option| html! {
                    <button class="category-suggestion" onclick={pick(option.value.clone())}>
                        {&option.label}
                    </button>
                })}
                if props.options.offers_create(&term) {
                    <button class="category-suggestion category-create" onclick={on_create}>
                        {format!("Create \"{}\"", term.trim())}
                    </button>
                }
                <button class="category-suggestion" onclick={on_cancel}>{"Cancel"}</button>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CategoryManagerProps {
    pub options: ExpenseOptions,
    pub on_add: Callback<String>,
    pub on_remove: Callback<String>,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(CategoryManager)]
pub fn category_manager(props: &CategoryManagerProps) -> Html {
    let label = use_state(String::new);

    let on_input = {
        let label = label.clone();
        Callback::from(move |e: InputEvent| {
            label.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let on_add = {
        let label = label.clone();
        let on_add = props.on_add.clone();
        Callback::from(move |_| {
            let text = label.trim().to_string();
            if !text.is_empty() {
                on_add.emit(text);
                label.set(String::new());
            }
        })
    };

    html! {
        <div class="category-manager">
            <h2 class="stats-title">{"Categories"}</h2>
            <div class="stats-box">
                {for props.options.as_slice().iter().map(|option| {
                    let on_remove = {
                        let on_remove = props.on_remove.clone();
                        let value = option.value.clone();
                        Callback::from(move |_| on_remove.emit(value.clone()))
                    };
                    html! {
                        <div class="stat-item">
                            <span class="stat-domain">{&option.label}</span>
                            <Button onclick={on_remove} disabled={props.disabled} variant={ButtonVariant::Plain}>
                                {"✕"}
                            </Button>
                        </div>
                    }
                })}
            </div>
            <div class="category-add">
                <input
                    type="text"
                    placeholder="New category"
                    value={(*label).clone()}
                    oninput={on_input}
                />
                <Button
                    onclick={on_add}
                    disabled={props.disabled || label.trim().is_empty()}
                    variant={ButtonVariant::Secondary}
                >
                    {"Add"}
                </Button>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_mark_current_category() {
        let options = ExpenseOptions::defaults();

        let entries = select_entries(&options, "travel-meals-group", "Travel Meals - Group");

        assert_eq!(entries.len(), 3);
        let selected: Vec<&str> = entries.iter().filter(|e| e.selected).map(|e| e.label.as_str()).collect();
        assert_eq!(selected, vec!["Travel Meals - Group"]);
        assert!(entries.iter().all(|e| !e.disabled));
    }

    #[test]
    fn test_deleted_category_stays_visible() {
        let mut options = ExpenseOptions::defaults();
        options.remove("travel-meals-group");

        let entries = select_entries(&options, "travel-meals-group", "Travel Meals - Group");

        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            SelectEntry {
                value: "travel-meals-group".to_string(),
                label: "Travel Meals - Group".to_string(),
                selected: true,
                disabled: true,
            }
        );
        assert_eq!(entries.iter().filter(|e| e.selected).count(), 1);
        assert!(entries[1..].iter().all(|e| !e.selected && !e.disabled));
    }
}
