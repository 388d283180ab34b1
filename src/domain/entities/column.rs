use crate::domain::entities::list_query::SortOrder;
use crate::domain::entities::row::Row;

/// Where a details link points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// `prefix` followed by the row id.
    Prefix(String),
    /// Path with `{field}` placeholders filled from the row.
    Template(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CellRender {
    #[default]
    Text,
    IdLink {
        base_path: String,
    },
    DetailsLink {
        target: LinkTarget,
        label: String,
    },
}

/// What a table cell shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub href: Option<String>,
}

/// Column configuration handed to the table widget.
///
/// `current_sort_order` and `current_filter_values` are filled in by the
/// column annotator from the decoded list query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnDescriptor {
    pub key: Option<String>,
    pub title: String,
    pub data_index: Option<String>,
    pub width: Option<u32>,
    pub sortable: bool,
    pub filterable: bool,
    pub render: CellRender,
    pub current_sort_order: Option<SortOrder>,
    pub current_filter_values: Option<Vec<String>>,
}

impl ColumnDescriptor {
    /// A data column whose key doubles as the row field it displays.
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            data_index: Some(key.clone()),
            key: Some(key),
            title: title.into(),
            ..Self::default()
        }
    }

    /// A purely presentational column that never takes part in sort or filter.
    pub fn presentational(title: impl Into<String>, data_index: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            data_index: Some(data_index.into()),
            ..Self::default()
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn cell(&self, row: &Row) -> Cell {
        let value = self
            .data_index
            .as_deref()
            .map(|field| row.field_text(field))
            .unwrap_or_default();

        match &self.render {
            CellRender::Text => Cell {
                text: value,
                href: None,
            },
            CellRender::IdLink { base_path } => Cell {
                href: Some(format!("{base_path}/{value}")),
                text: value,
            },
            CellRender::DetailsLink { target, label } => Cell {
                text: label.clone(),
                href: Some(match target {
                    LinkTarget::Prefix(prefix) => format!("{prefix}{value}"),
                    LinkTarget::Template(template) => fill_template(template, row),
                }),
            },
        }
    }
}

/// `ID` column linking every row to `<base_path>/<id>`.
pub fn id_column(base_path: impl Into<String>) -> ColumnDescriptor {
    ColumnDescriptor {
        render: CellRender::IdLink {
            base_path: base_path.into(),
        },
        width: Some(120),
        ..ColumnDescriptor::new("id", "ID")
    }
}

/// Trailing column with a link to a row's detail page.
pub fn details_link_column(target: LinkTarget, label: Option<&str>) -> ColumnDescriptor {
    ColumnDescriptor {
        render: CellRender::DetailsLink {
            target,
            label: label.unwrap_or("Details").to_string(),
        },
        width: Some(115),
        ..ColumnDescriptor::new("id", "")
    }
}

fn fill_template(template: &str, row: &Row) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&row.field_text(&rest[start + 1..start + len]));
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}
