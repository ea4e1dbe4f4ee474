// ABOUTME: MySQL catalog introspection and row reading
// ABOUTME: Read-only queries against INFORMATION_SCHEMA and the exported entries

use crate::catalog::{CatalogEntry, EntryKind};
use crate::dump::literal::quote_identifier;
use mysql_async::{prelude::*, BinaryProtocol, Conn, QueryResult};

/// List all tables and views of a MySQL database with their TABLE_TYPE.
///
/// No ORDER BY: entries come back in the server's catalog order.
pub async fn list_entries(
    conn: &mut Conn,
    db_name: &str,
) -> Result<Vec<CatalogEntry>, mysql_async::Error> {
    tracing::debug!("Listing tables and views of MySQL database '{}'", db_name);

    let query = r#"
        SELECT TABLE_NAME, TABLE_TYPE
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
    "#;

    let rows: Vec<(String, String)> = conn.exec(query, (db_name,)).await?;

    Ok(rows
        .into_iter()
        .map(|(name, table_type)| CatalogEntry::new(name, EntryKind::from_table_type(&table_type)))
        .collect())
}

/// TABLE_TYPE of one entry, `None` when it is not in the catalog
pub async fn table_type(
    conn: &mut Conn,
    db_name: &str,
    table_name: &str,
) -> Result<Option<String>, mysql_async::Error> {
    let query = r#"
        SELECT TABLE_TYPE
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
        AND TABLE_NAME = ?
    "#;

    conn.exec_first(query, (db_name, table_name)).await
}

/// Column names of a table or view in declaration order
pub async fn column_names(
    conn: &mut Conn,
    db_name: &str,
    table_name: &str,
) -> Result<Vec<String>, mysql_async::Error> {
    let query = r#"
        SELECT COLUMN_NAME
        FROM INFORMATION_SCHEMA.COLUMNS
        WHERE TABLE_SCHEMA = ?
        AND TABLE_NAME = ?
        ORDER BY ORDINAL_POSITION
    "#;

    conn.exec(query, (db_name, table_name)).await
}

/// `SHOW CREATE TABLE` or `SHOW CREATE VIEW` text, depending on the entry kind
pub async fn create_statement(
    conn: &mut Conn,
    entry: &CatalogEntry,
) -> Result<Option<String>, mysql_async::Error> {
    let quoted = quote_identifier(&entry.name);
    match entry.kind {
        EntryKind::Table => {
            let row: Option<(String, String)> = conn
                .query_first(format!("SHOW CREATE TABLE {}", quoted))
                .await?;
            Ok(row.map(|(_, create)| create))
        }
        EntryKind::View => {
            // View, Create View, character_set_client, collation_connection
            let row: Option<(String, String, String, String)> = conn
                .query_first(format!("SHOW CREATE VIEW {}", quoted))
                .await?;
            Ok(row.map(|(_, create, _, _)| create))
        }
    }
}

/// Start the bounded row query for an entry.
///
/// Uses a prepared statement so values come back typed (binary protocol)
/// instead of as text.
pub async fn open_rows<'a>(
    conn: &'a mut Conn,
    entry: &CatalogEntry,
    limit: u64,
) -> Result<QueryResult<'a, 'static, BinaryProtocol>, mysql_async::Error> {
    let query = format!("SELECT * FROM {} LIMIT ?", quote_identifier(&entry.name));
    conn.exec_iter(query, (limit,)).await
}
