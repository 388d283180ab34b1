use std::sync::Arc;

use tracing::debug;
use url::Url;

use crate::domain::entities::list_query::{Filters, ListQuery, SorterInput};
use crate::usecase::ports::navigation::Navigator;
use crate::usecase::services::query_codec::encode;

/// State change reported by the table widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewChange {
    pub page: Option<i64>,
    pub filters: Filters,
    pub sorter: SorterInput,
}

impl ViewChange {
    /// Filter edit on `column`: comma-separated values replace the column's
    /// current filter, blank input clears it, and the view returns to page 1.
    pub fn filter(current: &ListQuery, column: &str, raw: &str) -> Self {
        let values: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
        let mut filters = current.filters.clone();
        filters.insert(column, (!values.is_empty()).then_some(values));
        Self {
            page: Some(1),
            filters,
            sorter: current.sorter.clone().into(),
        }
    }
}

/// Folds a widget change into a new query. The widget always reports the
/// complete filter and sort state, so both replace the current ones.
pub fn reduce(current: &ListQuery, change: ViewChange) -> ListQuery {
    ListQuery {
        page: change.page.unwrap_or(current.page),
        limit: current.limit,
        filters: change.filters,
        sorter: change.sorter.into_vec(),
    }
}

/// Path of `path` with any query string or fragment removed.
pub fn bare_path(path: &str) -> String {
    match Url::parse("http://h/").and_then(|base| base.join(path)) {
        Ok(url) => url.path().to_string(),
        Err(err) => {
            debug!(path, %err, "falling back to root path");
            "/".to_string()
        }
    }
}

pub fn location_for(path: &str, query: &ListQuery) -> String {
    format!("{}?{}", bare_path(path), encode(query))
}

/// Writes view changes back into the URL.
pub struct NavigationSync {
    navigator: Arc<dyn Navigator>,
}

impl NavigationSync {
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self { navigator }
    }

    /// Returns the new query once the location has been replaced, so a fetch
    /// issued with it always matches the visible URL.
    pub fn apply(&self, current: &ListQuery, change: ViewChange) -> ListQuery {
        let next = reduce(current, change);
        let location = location_for(&self.navigator.current_path(), &next);
        debug!(%location, "replacing location");
        self.navigator.replace_location(&location);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::list_query::{Limit, SortOrder, SorterEntry};
    use crate::platform::navigation::MemoryNavigator;

    #[test]
    fn bare_path_strips_query_and_fragment() {
        assert_eq!(bare_path("/things/1?page=3&sort=a.ascend#top"), "/things/1");
        assert_eq!(bare_path("things"), "/things");
        assert_eq!(bare_path(""), "/");
    }

    #[test]
    fn reduce_normalizes_single_sorter() {
        let current = ListQuery {
            page: 4,
            limit: Some(Limit::Items(10)),
            ..ListQuery::default()
        };
        let change = ViewChange {
            page: None,
            filters: Filters::new().with("status", &["open"]),
            sorter: SorterEntry::new("name", SortOrder::Descend).into(),
        };

        let next = reduce(&current, change);

        assert_eq!(next.page, 4);
        assert_eq!(next.limit, Some(Limit::Items(10)));
        assert_eq!(next.sorter, vec![SorterEntry::new("name", SortOrder::Descend)]);
    }

    #[test]
    fn filter_edit_resets_page_and_keeps_sort() {
        let current = ListQuery {
            page: 3,
            filters: Filters::new().with("team", &["core"]),
            sorter: vec![SorterEntry::new("name", SortOrder::Ascend)],
            ..ListQuery::default()
        };

        let next = reduce(&current, ViewChange::filter(&current, "status", " open, closed ,"));

        assert_eq!(next.page, 1);
        assert_eq!(
            next.filters,
            Filters::new()
                .with("team", &["core"])
                .with("status", &["open", "closed"])
        );
        assert_eq!(next.sorter, current.sorter);

        let cleared = reduce(&next, ViewChange::filter(&next, "team", "  "));
        assert_eq!(cleared.filters.get("team"), None);
        assert_eq!(encode(&cleared), "status=open&status=closed&sort=name.ascend");
    }

    #[test]
    fn apply_replaces_location_without_stale_params() {
        let navigator = Arc::new(MemoryNavigator::new("/things/7?page=9&status=old"));
        let sync = NavigationSync::new(navigator.clone());

        let next = sync.apply(
            &ListQuery::default(),
            ViewChange {
                page: Some(2),
                filters: Filters::new().with("status", &["open"]),
                sorter: vec![SorterEntry::new("name", SortOrder::Ascend)].into(),
            },
        );

        assert_eq!(next.page, 2);
        assert_eq!(
            navigator.location(),
            "/things/7?page=2&status=open&sort=name.ascend"
        );
        assert_eq!(navigator.history_len(), 1);
    }
}
