use crate::domain::entities::row::TotalCount;

/// Pagination descriptor handed to the table widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page_size: u32,
    /// Page requested through the URL, not clamped.
    pub current: i64,
    /// `None` when the page came back empty.
    pub total: Option<i64>,
    pub show_size_changer: bool,
}

impl Pagination {
    /// Reads the total from the first row; every row carries the same count.
    pub fn from_rows<R: TotalCount>(page: i64, rows: &[R], page_size: u32) -> Self {
        Self {
            page_size,
            current: page,
            total: rows.first().map(TotalCount::total_count),
            show_size_changer: false,
        }
    }

    pub fn total_or_zero(&self) -> i64 {
        self.total.unwrap_or(0).max(0)
    }

    pub fn page_count(&self) -> i64 {
        let page_size = i64::from(self.page_size.max(1));
        (self.total_or_zero() + page_size - 1) / page_size
    }

    /// Current page clamped into the known page range.
    pub fn display_current(&self) -> i64 {
        self.current.clamp(1, self.page_count().max(1))
    }

    pub fn has_previous(&self) -> bool {
        self.display_current() > 1
    }

    pub fn has_next(&self) -> bool {
        self.display_current() < self.page_count()
    }

    pub fn show_total(&self) -> String {
        format!("Total: {}", self.total_or_zero())
    }
}
