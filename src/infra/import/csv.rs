use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::infra::sqlite::schema::{init_db, open_connection};
use crate::infra::sqlite::select::quote_ident;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResult {
    pub table: String,
    pub columns: Vec<String>,
    pub row_count: i64,
}

/// Creates `table` with one TEXT column per CSV header and loads every record.
/// An existing table of the same name is replaced.
pub fn import_csv_table<R: Read>(
    conn: &mut Connection,
    table: &str,
    source: R,
) -> Result<ImportResult> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("failed to read csv headers")?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        anyhow::bail!("csv header is required")
    }

    let tx = conn.transaction().context("failed to start transaction")?;

    let column_defs = headers
        .iter()
        .map(|name| format!("{} TEXT", quote_ident(name)))
        .collect::<Vec<_>>()
        .join(", ");
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table_ident};
         CREATE TABLE {table_ident} ({column_defs});",
        table_ident = quote_ident(table)
    ))
    .with_context(|| format!("failed to create table {table}"))?;

    let placeholders = vec!["?"; headers.len()].join(", ");
    let mut insert_row = tx
        .prepare(&format!(
            "INSERT INTO {} VALUES ({placeholders})",
            quote_ident(table)
        ))
        .context("failed to prepare row insert")?;

    let mut row_count = 0_i64;
    for record in reader.records() {
        let record = record.context("failed to parse csv record")?;
        let values = (0..headers.len()).map(|idx| record.get(idx).unwrap_or(""));
        insert_row
            .execute(rusqlite::params_from_iter(values))
            .context("failed to insert row")?;
        row_count += 1;
    }
    drop(insert_row);

    tx.commit().context("failed to commit import transaction")?;

    Ok(ImportResult {
        table: table.to_string(),
        columns: headers,
        row_count,
    })
}

pub fn import_csv_file(db_path: &Path, table: &str, csv_path: &Path) -> Result<ImportResult> {
    init_db(db_path)?;
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open csv: {}", csv_path.display()))?;
    let mut conn = open_connection(db_path)?;
    import_csv_table(&mut conn, table, file)
}
