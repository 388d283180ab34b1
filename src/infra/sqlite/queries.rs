use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Number, Value};

use crate::domain::entities::row::Row;
use crate::infra::sqlite::pagination::TOTAL_COUNT_ALIAS;
use crate::infra::sqlite::select::SelectQuery;

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(number) => Value::Number(number.into()),
        ValueRef::Real(number) => Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(_) => Value::Null,
    }
}

/// Runs `query` and returns its rows with `totalCount` lifted out of the
/// field map.
pub fn run_select(conn: &Connection, query: &SelectQuery) -> Result<Vec<Row>> {
    let (sql, params) = query.to_sql();
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("failed to prepare list query: {sql}"))?;
    let column_names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut rows = stmt
        .query(rusqlite::params_from_iter(params))
        .context("failed to run list query")?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().context("failed to read list row")? {
        let mut fields = Map::new();
        let mut total_count = 0_i64;
        for (idx, name) in column_names.iter().enumerate() {
            let value = row
                .get_ref(idx)
                .with_context(|| format!("failed to read column {name}"))?;
            if name == TOTAL_COUNT_ALIAS {
                total_count = value.as_i64().context("totalCount is not an integer")?;
                continue;
            }
            fields.insert(name.clone(), to_json(value));
        }
        out.push(Row {
            total_count,
            fields,
        });
    }

    Ok(out)
}

/// Column names of `table` in declaration order.
pub fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid ASC")
        .context("failed to prepare table info query")?;
    let columns = stmt
        .query_map([table], |row| row.get::<_, String>(0))
        .context("failed to query table info")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect table columns")?;
    Ok(columns)
}
