use std::sync::Arc;

use chrono::Duration;
use parking_lot::RwLock;
use tracing::warn;

use crate::config::{ListViewConfig, DEFAULT_AUTO_REFETCH_SECS};
use crate::domain::entities::column::ColumnDescriptor;
use crate::domain::entities::list_query::{FetcherQuery, Limit, ListDefaults, ListQuery};
use crate::domain::entities::row::Row;
use crate::usecase::ports::fetch::RowFetcher;
use crate::usecase::ports::navigation::Navigator;
use crate::usecase::services::cache::CacheService;
use crate::usecase::services::column_annotator::annotate_columns;
use crate::usecase::services::navigation_sync::{NavigationSync, ViewChange};
use crate::usecase::services::pagination::Pagination;
use crate::usecase::services::query_codec::decode;

pub const ERROR_TITLE: &str = "Error Loading Data";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading {
        columns: Vec<ColumnDescriptor>,
    },
    Ready {
        columns: Vec<ColumnDescriptor>,
        rows: Arc<Vec<Row>>,
        pagination: Pagination,
    },
    /// Replaces the whole table; no stale rows are shown.
    Failed { title: String, message: String },
}

/// Coordinates one list view: URL state in, annotated columns and a page of
/// rows out, and widget changes back into the URL.
pub struct ListService {
    cache_key: String,
    columns: Vec<ColumnDescriptor>,
    defaults: ListDefaults,
    config: ListViewConfig,
    fetcher: Arc<dyn RowFetcher>,
    navigator: Arc<dyn Navigator>,
    cache: Arc<CacheService>,
    sync: NavigationSync,
    auto_refetch: RwLock<Option<u64>>,
}

impl ListService {
    pub fn new(
        cache_key: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
        fetcher: Arc<dyn RowFetcher>,
        navigator: Arc<dyn Navigator>,
        cache: Arc<CacheService>,
    ) -> Self {
        Self {
            cache_key: cache_key.into(),
            columns,
            defaults: ListDefaults::default(),
            config: ListViewConfig::default(),
            fetcher,
            sync: NavigationSync::new(navigator.clone()),
            navigator,
            cache,
            auto_refetch: RwLock::new(None),
        }
    }

    pub fn with_defaults(mut self, defaults: ListDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_config(mut self, config: ListViewConfig) -> Self {
        *self.auto_refetch.get_mut() = config.auto_refetch;
        self.config = config;
        self
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn config(&self) -> &ListViewConfig {
        &self.config
    }

    /// Query for the current URL. Without a default limit the configured
    /// page size is what gets fetched.
    pub fn list_query(&self) -> ListQuery {
        let mut query = decode(&self.navigator.current_params(), &self.defaults);
        query
            .limit
            .get_or_insert(Limit::Items(self.config.page_size));
        query
    }

    pub fn fetcher_query(&self) -> FetcherQuery {
        FetcherQuery::new(self.cache_key.clone(), self.list_query())
    }

    pub fn columns(&self) -> Vec<ColumnDescriptor> {
        annotate_columns(&self.columns, &self.list_query())
    }

    fn refresh_interval(&self) -> Option<Duration> {
        self.auto_refetch
            .read()
            .and_then(|secs| i64::try_from(secs).ok())
            .map(Duration::seconds)
    }

    /// Cached state for the current URL without fetching.
    pub fn peek(&self) -> ViewState {
        let query = self.fetcher_query();
        let columns = annotate_columns(&self.columns, &query.query);
        let cached = query
            .to_params()
            .ok()
            .and_then(|params| self.cache.lookup(&params));
        match cached {
            None => ViewState::Loading { columns },
            Some(cached) => self.finish(columns, &query.query, cached.result),
        }
    }

    /// Fetches (or reuses) the page for the current URL.
    pub fn render(&self) -> ViewState {
        let query = self.fetcher_query();
        let columns = annotate_columns(&self.columns, &query.query);

        let params = match query.to_params() {
            Ok(params) => params,
            Err(err) => {
                warn!(%err, "failed to build fetch parameters");
                return ViewState::Failed {
                    title: ERROR_TITLE.to_string(),
                    message: err.to_string(),
                };
            }
        };

        let result = self.cache.fetch_with(params, self.refresh_interval(), || {
            self.fetcher.fetch(&query)
        });
        self.finish(columns, &query.query, result)
    }

    fn finish(
        &self,
        columns: Vec<ColumnDescriptor>,
        query: &ListQuery,
        result: crate::usecase::services::cache::FetchResult,
    ) -> ViewState {
        match result {
            Ok(rows) => {
                // An unbounded listing is a single page holding every row.
                let page_size = match query.limit {
                    Some(Limit::Items(per_page)) => per_page,
                    Some(Limit::Unbounded) => u32::try_from(rows.len().max(1)).unwrap_or(u32::MAX),
                    None => self.config.page_size,
                };
                ViewState::Ready {
                    pagination: Pagination::from_rows(query.page, &rows, page_size),
                    columns,
                    rows,
                }
            }
            Err(err) => ViewState::Failed {
                title: ERROR_TITLE.to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Widget change handler. The URL is updated before this returns.
    pub fn on_change(&self, change: ViewChange) -> ListQuery {
        self.sync.apply(&self.list_query(), change)
    }

    /// Whether the view offers an auto refresh toggle at all.
    pub fn shows_auto_refetch(&self) -> bool {
        self.config.auto_refetch.is_some()
    }

    pub fn auto_refetch(&self) -> Option<u64> {
        *self.auto_refetch.read()
    }

    /// Turns periodic refetching on or off and revalidates the current page.
    pub fn set_auto_refetch(&self, on: bool) {
        let interval = on.then(|| self.config.auto_refetch.unwrap_or(DEFAULT_AUTO_REFETCH_SECS));
        *self.auto_refetch.write() = interval;
        if let Ok(params) = self.fetcher_query().to_params() {
            self.cache.revalidate(&params);
        }
    }

    /// Marks every cached page of this view's dataset stale.
    pub fn refresh(&self) -> usize {
        self.cache.invalidate(&self.cache_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::list_query::{Filters, SortOrder, SorterEntry};
    use crate::platform::navigation::MemoryNavigator;
    use crate::usecase::ports::fetch::FetchError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingFetcher {
        calls: AtomicUsize,
        seen: parking_lot::Mutex<Vec<FetcherQuery>>,
        fail: bool,
    }

    impl RowFetcher for RecordingFetcher {
        fn fetch(&self, query: &FetcherQuery) -> Result<Vec<Row>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().push(query.clone());
            if self.fail {
                return Err(FetchError::Storage("connection refused".to_string()));
            }
            Ok(vec![serde_json::from_value(json!({
                "totalCount": 60,
                "id": 1,
                "age": 30
            }))
            .expect("row should deserialize")])
        }
    }

    fn service(
        location: &str,
        fetcher: Arc<RecordingFetcher>,
    ) -> (ListService, Arc<MemoryNavigator>, Arc<CacheService>) {
        let navigator = Arc::new(MemoryNavigator::new(location));
        let cache = Arc::new(CacheService::new());
        let service = ListService::new(
            "things",
            vec![
                ColumnDescriptor::new("age", "Age").sortable(),
                ColumnDescriptor::new("status", "Status").filterable(),
            ],
            fetcher,
            navigator.clone(),
            cache.clone(),
        );
        (service, navigator, cache)
    }

    #[test]
    fn render_annotates_and_paginates() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (service, _, _) = service("/things?page=2&sort=age.descend", fetcher.clone());

        let ViewState::Ready {
            columns,
            rows,
            pagination,
        } = service.render()
        else {
            panic!("view should be ready");
        };

        assert_eq!(rows.len(), 1);
        assert_eq!(pagination.total, Some(60));
        assert_eq!(pagination.current, 2);
        assert_eq!(pagination.page_size, 25);
        assert_eq!(columns[0].current_sort_order, Some(SortOrder::Descend));
        assert_eq!(columns[1].current_filter_values, Some(Vec::new()));

        let seen = fetcher.seen.lock();
        assert_eq!(seen[0].cache_key, "things");
        assert_eq!(seen[0].query.page, 2);
    }

    #[test]
    fn configured_page_size_drives_fetch_limit() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (service, _, _) = service("/things?page=3", fetcher.clone());
        let service = service.with_config(ListViewConfig {
            page_size: 10,
            ..ListViewConfig::default()
        });

        let ViewState::Ready { pagination, .. } = service.render() else {
            panic!("view should be ready");
        };

        assert_eq!(fetcher.seen.lock()[0].query.limit, Some(Limit::Items(10)));
        assert_eq!(pagination.page_size, 10);
        assert_eq!(pagination.page_count(), 6);
    }

    #[test]
    fn default_limit_wins_over_configured_page_size() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (service, _, _) = service("/things", fetcher.clone());
        let service = service
            .with_config(ListViewConfig {
                page_size: 10,
                ..ListViewConfig::default()
            })
            .with_defaults(ListDefaults {
                limit: Some(Limit::Items(20)),
                ..ListDefaults::default()
            });

        let ViewState::Ready { pagination, .. } = service.render() else {
            panic!("view should be ready");
        };

        assert_eq!(fetcher.seen.lock()[0].query.limit, Some(Limit::Items(20)));
        assert_eq!(pagination.page_size, 20);
    }

    #[test]
    fn change_updates_url_before_next_fetch() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (service, navigator, _) = service("/things", fetcher.clone());
        service.render();

        let next = service.on_change(ViewChange {
            page: Some(3),
            filters: Filters::new().with("status", &["open"]),
            sorter: SorterEntry::new("age", SortOrder::Ascend).into(),
        });
        assert_eq!(
            navigator.location(),
            "/things?page=3&status=open&sort=age.ascend"
        );
        assert_eq!(service.list_query(), next);

        service.render();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(fetcher.seen.lock()[1].query, next);
    }

    #[test]
    fn refresh_refetches_only_after_invalidation() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (service, _, _) = service("/things", fetcher.clone());

        service.render();
        service.render();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        assert_eq!(service.refresh(), 1);
        service.render();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fetch_failure_replaces_table() {
        let fetcher = Arc::new(RecordingFetcher {
            fail: true,
            ..RecordingFetcher::default()
        });
        let (service, _, _) = service("/things", fetcher.clone());

        assert!(matches!(service.peek(), ViewState::Loading { .. }));
        let state = service.render();

        assert_eq!(
            state,
            ViewState::Failed {
                title: ERROR_TITLE.to_string(),
                message: "storage error: connection refused".to_string(),
            }
        );
        service.render();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn auto_refetch_toggle_revalidates() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (service, _, _) = service("/things", fetcher.clone());
        let service = service.with_config(ListViewConfig {
            auto_refetch: Some(10),
            ..ListViewConfig::default()
        });
        assert!(service.shows_auto_refetch());
        assert_eq!(service.auto_refetch(), Some(10));

        service.render();
        service.set_auto_refetch(false);
        assert_eq!(service.auto_refetch(), None);
        service.render();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);

        service.set_auto_refetch(true);
        assert_eq!(service.auto_refetch(), Some(10));
    }

    #[test]
    fn auto_refetch_without_configured_interval_uses_default() {
        let fetcher = Arc::new(RecordingFetcher::default());
        let (service, _, _) = service("/things", fetcher);

        assert!(!service.shows_auto_refetch());
        service.set_auto_refetch(true);
        assert_eq!(service.auto_refetch(), Some(DEFAULT_AUTO_REFETCH_SECS));
    }
}
