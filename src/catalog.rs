// ABOUTME: Catalog entries: the tables and views that make up one export
// ABOUTME: Classification is computed once per entry and carried as a tagged value

use crate::error::{BoxError, ExportError};
use crate::source::DumpSource;
use std::fmt;

/// Whether a catalog entry is a base table or a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Table,
    View,
}

impl EntryKind {
    /// Map an `information_schema.TABLES.TABLE_TYPE` value to a kind.
    ///
    /// Only `VIEW` is a view; `BASE TABLE`, `SYSTEM VIEW` and anything else
    /// the server reports are exported as tables.
    pub fn from_table_type(table_type: &str) -> Self {
        if table_type.eq_ignore_ascii_case("VIEW") {
            EntryKind::View
        } else {
            EntryKind::Table
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Table => f.write_str("table"),
            EntryKind::View => f.write_str("view"),
        }
    }
}

/// A table or view in the target schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn table(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Table)
    }

    pub fn view(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::View)
    }
}

/// List every entry of `schema` in catalog order.
///
/// Each entry carries its kind, taken from the same listing, so later steps
/// never look it up again.
///
/// # Arguments
///
/// * `source` - Catalog source
/// * `schema` - Database name to list
///
/// # Returns
///
/// Tables and views in the order the server reports them
///
/// # Errors
///
/// Returns [`ExportError::Catalog`] if the listing query fails.
pub async fn list_entries<S: DumpSource>(
    source: &mut S,
    schema: &str,
) -> Result<Vec<CatalogEntry>, ExportError> {
    let entries = source
        .list_entries(schema)
        .await
        .map_err(|source| catalog_error(schema, source))?;

    tracing::debug!("Catalog of '{}' has {} entries", schema, entries.len());

    Ok(entries)
}

/// Fresh catalog lookup of a single entry's kind
pub async fn classify<S: DumpSource>(
    source: &mut S,
    schema: &str,
    name: &str,
) -> Result<EntryKind, ExportError> {
    source
        .classify(schema, name)
        .await
        .map_err(|source| catalog_error(schema, source))
}

/// Column names of `entry` in declaration order
pub async fn columns<S: DumpSource>(
    source: &mut S,
    schema: &str,
    entry: &CatalogEntry,
) -> Result<Vec<String>, ExportError> {
    source
        .columns(schema, &entry.name)
        .await
        .map_err(|source| ExportError::Columns {
            kind: entry.kind,
            entry: entry.name.clone(),
            source,
        })
}

fn catalog_error(schema: &str, source: BoxError) -> ExportError {
    ExportError::Catalog {
        schema: schema.to_string(),
        source,
    }
}
