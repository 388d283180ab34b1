use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, warn};

use crate::domain::entities::list_query::{FetcherQuery, SorterEntry};
use crate::domain::entities::row::Row;
use crate::infra::sqlite::pagination::{apply_pagination, apply_sorter, DEFAULT_ITEMS_PER_PAGE};
use crate::infra::sqlite::queries::{run_select, table_columns};
use crate::infra::sqlite::schema::open_connection;
use crate::infra::sqlite::select::SelectQuery;
use crate::usecase::ports::fetch::{FetchError, RowFetcher};

/// Serves one SQLite table to a list view.
///
/// Filters and sort keys naming columns outside `columns` are ignored.
pub struct SqliteListRepository {
    pub db_path: PathBuf,
    pub table: String,
    pub columns: Vec<String>,
}

impl SqliteListRepository {
    pub fn new(db_path: PathBuf, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            db_path,
            table: table.into(),
            columns,
        }
    }

    /// Exposes every column the table currently has.
    pub fn for_table(db_path: PathBuf, table: impl Into<String>) -> Result<Self> {
        let table = table.into();
        let conn = open_connection(&db_path)?;
        let columns = table_columns(&conn, &table)?;
        Ok(Self::new(db_path, table, columns))
    }

    fn is_known(&self, column: &str) -> bool {
        self.columns.iter().any(|known| known == column)
    }

    /// Lowers a fetcher query to SQL without running it.
    pub fn build_query(&self, query: &FetcherQuery) -> SelectQuery {
        let list = &query.query;
        let mut select = SelectQuery::new(self.table.clone()).select(self.columns.iter().cloned());

        for (column, values) in list.filters.iter() {
            let Some(values) = values else {
                continue;
            };
            if !self.is_known(column) {
                debug!(column, "ignoring filter on unknown column");
                continue;
            }
            select = select.where_in(column, values);
        }

        let sorter: Vec<SorterEntry> = list
            .sorter
            .iter()
            .filter(|entry| {
                let known = entry.column_key.is_empty() || self.is_known(&entry.column_key);
                if !known {
                    debug!(column = %entry.column_key, "ignoring sort on unknown column");
                }
                known
            })
            .cloned()
            .collect();
        let select = apply_sorter(select, &sorter);

        apply_pagination(
            select,
            list.page,
            list.limit.unwrap_or(DEFAULT_ITEMS_PER_PAGE),
        )
    }

    fn fetch_rows(&self, query: &FetcherQuery) -> Result<Vec<Row>> {
        let conn = open_connection(&self.db_path)?;
        run_select(&conn, &self.build_query(query))
    }
}

impl RowFetcher for SqliteListRepository {
    fn fetch(&self, query: &FetcherQuery) -> Result<Vec<Row>, FetchError> {
        self.fetch_rows(query).map_err(|err| {
            warn!(cache_key = %query.cache_key, error = %format!("{err:#}"), "list fetch failed");
            FetchError::Storage(format!("{err:#}"))
        })
    }
}
