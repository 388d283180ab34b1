use rusqlite::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// Quotes an identifier so user-supplied column keys never reach the SQL text
/// unescaped.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone, PartialEq)]
struct Predicate {
    sql: String,
    params: Vec<Value>,
}

/// Minimal SELECT builder over a single table.
///
/// Every method consumes and returns the builder, so a base query can be
/// cloned and refined per request.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: String,
    columns: Vec<String>,
    projections: Vec<(String, String)>,
    predicates: Vec<Predicate>,
    order_by: Vec<(String, OrderDirection)>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            projections: Vec::new(),
            predicates: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds a raw SQL expression under `alias`.
    pub fn select_expr(mut self, expr: impl Into<String>, alias: impl Into<String>) -> Self {
        self.projections.push((expr.into(), alias.into()));
        self
    }

    /// `column IN (values...)`. An empty value list adds nothing.
    pub fn where_in(mut self, column: &str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.predicates.push(Predicate {
            sql: format!("{} IN ({placeholders})", quote_ident(column)),
            params: values.iter().cloned().map(Value::Text).collect(),
        });
        self
    }

    pub fn order_by(mut self, column: &str, direction: OrderDirection) -> Self {
        self.order_by.push((column.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }

    pub fn has_projection(&self, alias: &str) -> bool {
        self.projections.iter().any(|(_, existing)| existing == alias)
    }

    pub fn order_terms(&self) -> &[(String, OrderDirection)] {
        &self.order_by
    }

    /// SQL text plus positional parameters, in placeholder order.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut select_list: Vec<String> = if self.columns.is_empty() {
            vec!["*".to_string()]
        } else {
            self.columns.iter().map(|column| quote_ident(column)).collect()
        };
        select_list.extend(
            self.projections
                .iter()
                .map(|(expr, alias)| format!("{expr} AS {}", quote_ident(alias))),
        );

        let mut sql = format!(
            "SELECT {} FROM {}",
            select_list.join(", "),
            quote_ident(&self.table)
        );
        let mut params = Vec::new();

        if !self.predicates.is_empty() {
            let clauses = self
                .predicates
                .iter()
                .map(|predicate| predicate.sql.as_str())
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(&format!(" WHERE {clauses}"));
            for predicate in &self.predicates {
                params.extend(predicate.params.iter().cloned());
            }
        }

        if !self.order_by.is_empty() {
            let terms = self
                .order_by
                .iter()
                .map(|(column, direction)| format!("{} {}", quote_ident(column), direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(&format!(" ORDER BY {terms}"));
        }

        match (self.limit, self.offset) {
            (None, None) => {}
            (limit, offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                params.push(Value::Integer(limit.unwrap_or(-1)));
                params.push(Value::Integer(offset.unwrap_or(0)));
            }
        }

        (sql, params)
    }
}
