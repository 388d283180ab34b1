use std::sync::Arc;

use dioxus::prelude::*;

use crate::domain::entities::list_query::{ListQuery, SortOrder, SorterEntry};
use crate::usecase::services::list_service::{ListService, ViewState};
use crate::usecase::services::navigation_sync::ViewChange;

/// Header clicks cycle ascend -> descend -> none.
fn next_order(current: Option<SortOrder>) -> SortOrder {
    match current {
        Some(SortOrder::Ascend) => SortOrder::Descend,
        Some(SortOrder::Descend) => SortOrder::Unsorted,
        _ => SortOrder::Ascend,
    }
}

fn sort_marker(order: Option<SortOrder>) -> &'static str {
    match order {
        Some(SortOrder::Ascend) => " ▲",
        Some(SortOrder::Descend) => " ▼",
        _ => "",
    }
}

fn page_change(query: &ListQuery, page: i64) -> ViewChange {
    ViewChange {
        page: Some(page),
        filters: query.filters.clone(),
        sorter: query.sorter.clone().into(),
    }
}

/// Renders the list view provided through context as an `Arc<ListService>`.
#[component]
pub fn ListTable() -> Element {
    let service = use_context::<Arc<ListService>>();
    // Reading the revision subscribes this component to it.
    let mut revision = use_signal(|| 0_u64);
    let _revision = revision();

    let query = service.list_query();
    let state = service.render();

    let refresh_service = service.clone();
    let toolbar_service = service.clone();
    let shows_auto_refetch = service.shows_auto_refetch();
    let auto_refetch_on = service.auto_refetch().is_some();
    let auto_refetch_secs = service.config().auto_refetch.unwrap_or_default();

    let toolbar = rsx! {
        div {
            style: "display: flex; align-items: center; gap: 12px; margin-bottom: 8px;",
            button {
                style: "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;",
                onclick: move |_| {
                    refresh_service.refresh();
                    revision += 1;
                },
                "Refresh"
            }
            if shows_auto_refetch {
                label {
                    input {
                        r#type: "checkbox",
                        checked: auto_refetch_on,
                        onchange: move |_| {
                            toolbar_service.set_auto_refetch(!auto_refetch_on);
                            revision += 1;
                        },
                    }
                    " Auto Refresh ({auto_refetch_secs}s)"
                }
            }
        }
    };

    match state {
        ViewState::Loading { .. } => rsx! {
            {toolbar}
            p { "Loading..." }
        },
        ViewState::Failed { title, message } => rsx! {
            div {
                style: "padding: 24px; text-align: center; color: #a61d24;",
                h3 { "{title}" }
                p { "{message}" }
            }
        },
        ViewState::Ready {
            columns,
            rows,
            pagination,
        } => {
            let total_label = pagination.show_total();
            let current = pagination.display_current();
            let page_count = pagination.page_count().max(1);
            let has_previous = pagination.has_previous();
            let has_next = pagination.has_next();
            let previous_service = service.clone();
            let previous_query = query.clone();
            let next_service = service.clone();
            let next_query = query.clone();

            rsx! {
                {toolbar}
                table {
                    style: "border-collapse: collapse; width: 100%;",
                    thead {
                        tr {
                            {columns.iter().enumerate().map(|(idx, column)| {
                                let title = column.title.clone();
                                let marker = sort_marker(column.current_sort_order);
                                let sort_key = column.key.clone().filter(|_| column.sortable);
                                let order = next_order(column.current_sort_order);
                                let filter_key = column.key.clone().filter(|_| column.filterable);
                                let filter_text = column
                                    .current_filter_values
                                    .clone()
                                    .unwrap_or_default()
                                    .join(", ");
                                let service = service.clone();
                                let query = query.clone();
                                let filter_service = service.clone();
                                let filter_query = query.clone();
                                let cursor = if sort_key.is_some() { "pointer" } else { "default" };
                                rsx!(
                                    th {
                                        key: "{idx}",
                                        style: "text-align: left; padding: 6px; border-bottom: 1px solid #ddd; cursor: {cursor};",
                                        onclick: move |_| {
                                            let Some(key) = sort_key.clone() else {
                                                return;
                                            };
                                            service.on_change(ViewChange {
                                                page: Some(1),
                                                filters: query.filters.clone(),
                                                sorter: SorterEntry::new(key, order).into(),
                                            });
                                            revision += 1;
                                        },
                                        "{title}{marker}"
                                        if let Some(key) = filter_key {
                                            div {
                                                input {
                                                    style: "width: 100%; margin-top: 4px; font-weight: normal;",
                                                    placeholder: "Filter",
                                                    value: "{filter_text}",
                                                    onclick: move |evt: MouseEvent| evt.stop_propagation(),
                                                    onchange: move |evt: FormEvent| {
                                                        filter_service.on_change(ViewChange::filter(
                                                            &filter_query,
                                                            &key,
                                                            &evt.value(),
                                                        ));
                                                        revision += 1;
                                                    },
                                                }
                                            }
                                        }
                                    }
                                )
                            })}
                        }
                    }
                    tbody {
                        {rows.iter().enumerate().map(|(row_idx, row)| {
                            let cells: Vec<_> = columns.iter().map(|column| column.cell(row)).collect();
                            rsx!(
                                tr {
                                    key: "{row_idx}",
                                    {cells.into_iter().map(|cell| {
                                        let text = cell.text;
                                        match cell.href {
                                            Some(href) => rsx!(
                                                td { style: "padding: 6px;", a { href: "{href}", "{text}" } }
                                            ),
                                            None => rsx!(
                                                td { style: "padding: 6px;", "{text}" }
                                            ),
                                        }
                                    })}
                                }
                            )
                        })}
                    }
                }
                div {
                    style: "display: flex; align-items: center; gap: 8px; margin-top: 8px;",
                    span { "{total_label}" }
                    button {
                        disabled: !has_previous,
                        onclick: move |_| {
                            previous_service.on_change(page_change(&previous_query, current - 1));
                            revision += 1;
                        },
                        "‹"
                    }
                    span { "{current} / {page_count}" }
                    button {
                        disabled: !has_next,
                        onclick: move |_| {
                            next_service.on_change(page_change(&next_query, current + 1));
                            revision += 1;
                        },
                        "›"
                    }
                }
            }
        }
    }
}
