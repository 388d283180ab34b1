use tracing::debug;
use url::form_urlencoded;

use crate::domain::entities::list_query::{
    Filters, ListDefaults, ListQuery, SortOrder, SorterEntry,
};
use crate::domain::entities::query_params::QueryParams;

pub const PAGE_PARAM: &str = "page";
pub const SORT_PARAM: &str = "sort";

/// Page number from the URL. Missing or unparseable values fall back to 1.
pub fn decode_page(params: &QueryParams) -> i64 {
    match params.get(PAGE_PARAM) {
        None => 1,
        Some(raw) => raw.trim().parse::<i64>().unwrap_or_else(|_| {
            debug!(value = raw, "ignoring unparseable page parameter");
            1
        }),
    }
}

/// Every non-reserved key becomes a column filter. Repeated keys accumulate.
pub fn decode_filters(params: &QueryParams) -> Filters {
    let mut filters = Filters::new();
    for key in params.keys() {
        if key == PAGE_PARAM || key == SORT_PARAM {
            continue;
        }
        // `?status=` means no filter, not a filter on the empty string.
        let values: Vec<String> = params
            .get_all(key)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
        if values.is_empty() {
            continue;
        }
        filters.insert(key, Some(values));
    }
    filters
}

/// `sort=<columnKey>.<order>` entries, in URL order.
pub fn decode_sorter(params: &QueryParams) -> Vec<SorterEntry> {
    params
        .get_all(SORT_PARAM)
        .filter_map(|raw| {
            let Some((column_key, order)) = raw.split_once('.') else {
                debug!(value = raw, "ignoring sort parameter without order");
                return None;
            };
            if column_key.is_empty() {
                debug!(value = raw, "ignoring sort parameter without column");
                return None;
            }
            Some(SorterEntry::new(column_key, SortOrder::from_url_value(order)))
        })
        .collect()
}

/// Builds the list query for the current URL.
///
/// URL filters override `defaults.filters` per column. The default sorter is
/// used only when the URL carries no usable `sort` entry.
pub fn decode(params: &QueryParams, defaults: &ListDefaults) -> ListQuery {
    let sorter = decode_sorter(params);
    ListQuery {
        page: decode_page(params),
        limit: defaults.limit,
        filters: decode_filters(params).merged_over(&defaults.filters),
        sorter: if sorter.is_empty() {
            defaults.sorter.clone()
        } else {
            sorter
        },
    }
}

pub fn decode_str(query: &str, defaults: &ListDefaults) -> ListQuery {
    decode(&QueryParams::parse(query), defaults)
}

/// Serializes a list query to a URL query string (without the leading `?`).
pub fn encode(query: &ListQuery) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());

    if query.page > 1 {
        serializer.append_pair(PAGE_PARAM, &query.page.to_string());
    }

    for (column, values) in query.filters.iter() {
        for value in values.into_iter().flatten() {
            if !value.is_empty() {
                serializer.append_pair(column, value);
            }
        }
    }

    for entry in &query.sorter {
        if entry.column_key.is_empty() {
            continue;
        }
        serializer.append_pair(
            SORT_PARAM,
            &format!("{}.{}", entry.column_key, entry.order.as_str()),
        );
    }

    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn defaults() -> ListDefaults {
        ListDefaults::default()
    }

    #[test]
    fn decode_empty_query_uses_defaults() {
        let query = decode_str("", &defaults());

        assert_eq!(query, ListQuery::default());
    }

    #[test]
    fn decode_page_falls_back_on_garbage() {
        assert_eq!(decode_str("page=abc", &defaults()).page, 1);
        assert_eq!(decode_str("page=", &defaults()).page, 1);
        assert_eq!(decode_str("page=4", &defaults()).page, 4);
        assert_eq!(decode_str("page=0", &defaults()).page, 0);
    }

    #[test]
    fn url_filters_override_defaults_per_column() {
        let defaults = ListDefaults {
            filters: Filters::new().with("status", &["open"]).with("kind", &["bug"]),
            ..ListDefaults::default()
        };

        let query = decode_str("?status=closed", &defaults);

        assert_eq!(
            query.filters,
            Filters::new().with("status", &["closed"]).with("kind", &["bug"])
        );
    }

    #[test]
    fn repeated_filter_keys_accumulate() {
        let query = decode_str("status=open&page=2&status=closed&sort=name.ascend", &defaults());

        assert_eq!(query.filters, Filters::new().with("status", &["open", "closed"]));
        assert_eq!(query.page, 2);
    }

    #[test]
    fn empty_filter_values_are_dropped() {
        let query = decode_str("status=&team=core&team=", &defaults());

        assert!(!query.filters.contains_key("status"));
        assert_eq!(query.filters, Filters::new().with("team", &["core"]));
    }

    #[test]
    fn sort_precedence_follows_url_order() {
        let query = decode_str("?sort=name.ascend&sort=age.descend", &defaults());

        assert_eq!(
            query.sorter,
            vec![
                SorterEntry::new("name", SortOrder::Ascend),
                SorterEntry::new("age", SortOrder::Descend),
            ]
        );
    }

    #[test]
    fn sort_none_and_malformed_entries() {
        let query = decode_str("sort=name.none&sort=broken&sort=.ascend&sort=a.b.c", &defaults());

        assert_eq!(
            query.sorter,
            vec![
                SorterEntry::new("name", SortOrder::Unsorted),
                SorterEntry::new("a", SortOrder::Unsorted),
            ]
        );
    }

    #[test]
    fn default_sorter_only_without_url_sort() {
        let defaults = ListDefaults {
            sorter: vec![SorterEntry::new("created", SortOrder::Descend)],
            ..ListDefaults::default()
        };

        assert_eq!(decode_str("", &defaults).sorter, defaults.sorter);
        assert_eq!(
            decode_str("sort=name.ascend", &defaults).sorter,
            vec![SorterEntry::new("name", SortOrder::Ascend)]
        );
    }

    #[test]
    fn encode_omits_first_page() {
        let first = ListQuery::default();
        let second = ListQuery {
            page: 2,
            ..ListQuery::default()
        };

        assert_eq!(encode(&first), "");
        assert_eq!(encode(&second), "page=2");
    }

    #[test]
    fn encode_filters_then_sorters() {
        let mut filters = Filters::new().with("status", &["open", "", "closed"]);
        filters.insert("owner", None);
        let query = ListQuery {
            page: 3,
            limit: None,
            filters,
            sorter: vec![
                SorterEntry::new("name", SortOrder::Ascend),
                SorterEntry::new("", SortOrder::Descend),
                SorterEntry::new("age", SortOrder::Unsorted),
            ],
        };

        assert_eq!(
            encode(&query),
            "page=3&status=open&status=closed&sort=name.ascend&sort=age.none"
        );
    }

    #[test]
    fn encode_percent_encodes_values() {
        let query = ListQuery {
            filters: Filters::new().with("name", &["a&b c"]),
            ..ListQuery::default()
        };

        let encoded = encode(&query);

        assert_eq!(encoded, "name=a%26b+c");
        assert_eq!(decode_str(&encoded, &defaults()).filters, query.filters);
    }

    fn column_key() -> impl Strategy<Value = String> {
        "[a-z][a-z_]{0,8}".prop_filter("reserved", |key| key != "page" && key != "sort")
    }

    fn sort_order() -> impl Strategy<Value = SortOrder> {
        prop_oneof![
            Just(SortOrder::Ascend),
            Just(SortOrder::Descend),
            Just(SortOrder::Unsorted),
        ]
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(
            page in 1i64..500,
            filter_entries in proptest::collection::btree_map(
                column_key(),
                proptest::collection::vec("[ -~]{1,12}", 1..4),
                0..4,
            ),
            sorter in proptest::collection::vec((column_key(), sort_order()), 0..4),
        ) {
            let mut filters = Filters::new();
            for (key, values) in filter_entries {
                filters.insert(key, Some(values));
            }
            let query = ListQuery {
                page,
                limit: None,
                filters,
                sorter: sorter
                    .into_iter()
                    .map(|(key, order)| SorterEntry::new(key, order))
                    .collect(),
            };

            let decoded = decode_str(&encode(&query), &ListDefaults::default());

            prop_assert_eq!(decoded, query);
        }
    }
}
