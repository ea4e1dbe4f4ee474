// ABOUTME: Schema serializer writing DROP + CREATE blocks for tables and views
// ABOUTME: Normalizes AUTO_INCREMENT start values so reimported tables restart at 1

use super::literal::quote_identifier;
use crate::catalog::{CatalogEntry, EntryKind};
use crate::error::ExportError;
use crate::i18n::Messages;
use crate::source::DumpSource;
use std::io::Write;

const AUTO_INCREMENT_MARKER: &str = "AUTO_INCREMENT=";

/// Reset the first `AUTO_INCREMENT=<digits>` of a CREATE TABLE statement to 1.
///
/// Statements without the marker are returned unchanged.
///
/// # Examples
///
/// ```
/// # use mysql_exporter::dump::schema::reset_auto_increment;
/// assert_eq!(
///     reset_auto_increment("CREATE TABLE `t` (...) ENGINE=InnoDB AUTO_INCREMENT=42 DEFAULT CHARSET=utf8mb4"),
///     "CREATE TABLE `t` (...) ENGINE=InnoDB AUTO_INCREMENT=1 DEFAULT CHARSET=utf8mb4"
/// );
/// ```
pub fn reset_auto_increment(statement: &str) -> String {
    let Some(start) = statement.find(AUTO_INCREMENT_MARKER) else {
        return statement.to_string();
    };

    let digits_start = start + AUTO_INCREMENT_MARKER.len();
    let digits_len = statement[digits_start..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();

    format!(
        "{}1{}",
        &statement[..digits_start],
        &statement[digits_start + digits_len..]
    )
}

/// Render the schema block for one entry
pub fn schema_block(messages: &Messages, entry: &CatalogEntry, statement: &str) -> String {
    let quoted = quote_identifier(&entry.name);
    let (drop_kind, statement) = match entry.kind {
        EntryKind::Table => ("TABLE", reset_auto_increment(statement)),
        EntryKind::View => ("VIEW", statement.to_string()),
    };

    format!(
        "-- {} {}\nDROP {} IF EXISTS {};\n{};\n\n",
        messages.structure_label(entry.kind),
        quoted,
        drop_kind,
        quoted,
        statement
    )
}

/// Fetch the definition of `entry` and write its DROP + CREATE block to `sink`.
///
/// Tables get their `AUTO_INCREMENT` start value reset to 1; view
/// definitions are written as returned by the server.
///
/// # Arguments
///
/// * `source` - Catalog and definition source
/// * `entry` - Entry to describe, already classified
/// * `sink` - Output for `schema.sql`; left open for the caller
/// * `messages` - Language of the block's comment line
///
/// # Errors
///
/// Returns [`ExportError::SchemaFetch`] if the CREATE statement cannot be
/// read and [`ExportError::SchemaWrite`] if writing the block fails. Both are
/// fatal for tables and views alike.
pub async fn emit_schema<S, W>(
    source: &mut S,
    entry: &CatalogEntry,
    sink: &mut W,
    messages: &Messages,
) -> Result<(), ExportError>
where
    S: DumpSource,
    W: Write,
{
    let statement =
        source
            .create_statement(entry)
            .await
            .map_err(|source| ExportError::SchemaFetch {
                kind: entry.kind,
                entry: entry.name.clone(),
                source,
            })?;

    tracing::debug!("Fetched CREATE statement for {} '{}'", entry.kind, entry.name);

    sink.write_all(schema_block(messages, entry, &statement).as_bytes())
        .map_err(|source| ExportError::SchemaWrite {
            kind: entry.kind,
            entry: entry.name.clone(),
            source,
        })
}
