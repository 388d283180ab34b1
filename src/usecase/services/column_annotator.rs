use crate::domain::entities::column::ColumnDescriptor;
use crate::domain::entities::list_query::ListQuery;

/// Copies the query's sort and filter state onto the columns that take part
/// in sorting or filtering. Other columns are returned untouched.
pub fn annotate_column(column: &ColumnDescriptor, query: &ListQuery) -> ColumnDescriptor {
    let Some(key) = column.key.as_deref() else {
        return column.clone();
    };
    if !column.sortable && !column.filterable {
        return column.clone();
    }

    let mut annotated = column.clone();

    if column.sortable {
        if let Some(entry) = query.sorter.iter().find(|entry| entry.column_key == key) {
            annotated.current_sort_order = Some(entry.order);
        }
    }

    if column.filterable {
        annotated.current_filter_values =
            Some(query.filters.get(key).map(<[String]>::to_vec).unwrap_or_default());
    }

    annotated
}

pub fn annotate_columns(columns: &[ColumnDescriptor], query: &ListQuery) -> Vec<ColumnDescriptor> {
    columns
        .iter()
        .map(|column| annotate_column(column, query))
        .collect()
}
