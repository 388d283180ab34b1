//! URL-backed list views: page, filter and sort state kept in the query
//! string, column annotation for the table widget, a shared fetch cache with
//! dataset-wide invalidation, and SQLite pagination with a window-count total.

pub mod config;
pub mod domain;
pub mod infra;
pub mod platform;
pub mod usecase;

#[cfg(feature = "desktop")]
pub mod ui;

pub use config::{ListViewConfig, ITEMS_PER_PAGE};
pub use domain::entities::list_query::{
    FetcherQuery, Filters, Limit, ListDefaults, ListQuery, SortOrder, SorterEntry, SorterInput,
};
pub use usecase::services::cache::CacheService;
pub use usecase::services::list_service::{ListService, ViewState};
pub use usecase::services::query_codec::{decode, decode_str, encode};
