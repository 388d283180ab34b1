use crate::config::ITEMS_PER_PAGE;
use crate::domain::entities::list_query::{Limit, SortOrder, SorterEntry};
use crate::infra::sqlite::select::{OrderDirection, SelectQuery};

pub const TOTAL_COUNT_ALIAS: &str = "totalCount";
pub const TOTAL_COUNT_EXPR: &str = "count(*) OVER()";

pub const DEFAULT_ITEMS_PER_PAGE: Limit = Limit::Items(ITEMS_PER_PAGE);

/// Adds the `totalCount` window projection and applies LIMIT/OFFSET.
///
/// Page 1 with an unbounded limit returns every row. Pages below 1 are
/// treated as page 1; later pages of an unbounded listing are empty. Offsets
/// saturate, so an absurd page number reads as a page past the end.
pub fn apply_pagination(query: SelectQuery, page: i64, items_per_page: Limit) -> SelectQuery {
    let query = query.select_expr(TOTAL_COUNT_EXPR, TOTAL_COUNT_ALIAS);
    let page = page.max(1);

    match items_per_page {
        Limit::Unbounded if page == 1 => query,
        Limit::Unbounded => query.limit(0).offset(0),
        Limit::Items(per_page) => {
            let per_page = i64::from(per_page);
            query.limit(per_page).offset((page - 1).saturating_mul(per_page))
        }
    }
}

/// Lazy `(column, direction)` pairs for ORDER BY, in precedence order.
///
/// Cloning restarts the walk from the current position; calling
/// [`iterate_sorter`] again restarts from the first entry.
#[derive(Debug, Clone)]
pub struct SorterIter<'a> {
    entries: std::slice::Iter<'a, SorterEntry>,
}

impl<'a> Iterator for SorterIter<'a> {
    type Item = (&'a str, OrderDirection);

    fn next(&mut self) -> Option<Self::Item> {
        for entry in self.entries.by_ref() {
            if entry.column_key.is_empty() {
                continue;
            }
            // "none" sorts ascending rather than dropping the term.
            let direction = match entry.order {
                SortOrder::Descend => OrderDirection::Desc,
                SortOrder::Ascend | SortOrder::Unsorted => OrderDirection::Asc,
            };
            return Some((entry.column_key.as_str(), direction));
        }
        None
    }
}

pub fn iterate_sorter(sorter: &[SorterEntry]) -> SorterIter<'_> {
    SorterIter {
        entries: sorter.iter(),
    }
}

/// Appends one ORDER BY term per sorter entry.
pub fn apply_sorter(query: SelectQuery, sorter: &[SorterEntry]) -> SelectQuery {
    iterate_sorter(sorter).fold(query, |query, (column, direction)| {
        query.order_by(column, direction)
    })
}
