use crate::domain::entities::list_query::FetcherQuery;
use crate::domain::entities::row::Row;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Loads one page of rows for a list view.
pub trait RowFetcher: Send + Sync {
    fn fetch(&self, query: &FetcherQuery) -> Result<Vec<Row>, FetchError>;
}
