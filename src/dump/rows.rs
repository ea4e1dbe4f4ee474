// ABOUTME: Row serializer streaming table and view rows into batched INSERT statements
// ABOUTME: Tables are lock-bracketed and fail hard; view data is best-effort

use super::literal::{column_list, quote_identifier, write_row, SqlLiteral};
use crate::catalog::{CatalogEntry, EntryKind};
use crate::error::ExportError;
use crate::i18n::Messages;
use crate::source::{DumpSource, RowStreamError};
use std::error::Error as _;
use std::io::{self, Write};

/// Rows per INSERT statement
pub const BATCH_LIMIT: usize = 1000;

/// Knobs for the data pass over one entry
#[derive(Debug, Clone, Copy)]
pub struct DataOptions {
    /// `LIMIT` of the row query
    pub max_rows: u64,
    /// Fail the run on view query/read errors instead of skipping the view
    pub strict_views: bool,
}

/// Writes rows as multi-row INSERT statements of at most `limit` rows each.
///
/// The first row of a batch opens `INSERT INTO ... VALUES (...)`, following
/// rows append `,\n(...)`, and a batch is closed with `;\n` when it is full
/// or in [`InsertBatcher::finish`].
pub struct InsertBatcher<'a, W: Write> {
    out: &'a mut W,
    prefix: String,
    limit: usize,
    in_batch: usize,
    rows: u64,
    buf: Vec<u8>,
}

impl<'a, W: Write> InsertBatcher<'a, W> {
    pub fn new(out: &'a mut W, entry: &str, columns: &[String]) -> Self {
        Self::with_limit(out, entry, columns, BATCH_LIMIT)
    }

    pub fn with_limit(out: &'a mut W, entry: &str, columns: &[String], limit: usize) -> Self {
        Self {
            out,
            prefix: format!(
                "INSERT INTO {} ({}) VALUES ",
                quote_identifier(entry),
                column_list(columns)
            ),
            limit: limit.max(1),
            in_batch: 0,
            rows: 0,
            buf: Vec::new(),
        }
    }

    pub fn push(&mut self, row: &[SqlLiteral]) -> io::Result<()> {
        self.buf.clear();
        if self.in_batch == 0 {
            self.buf.extend_from_slice(self.prefix.as_bytes());
            self.buf.push(b'(');
        } else {
            self.buf.extend_from_slice(b",\n(");
        }
        write_row(row, &mut self.buf);
        self.buf.push(b')');

        self.in_batch += 1;
        self.rows += 1;

        if self.in_batch >= self.limit {
            self.buf.extend_from_slice(b";\n");
            self.in_batch = 0;
        }

        self.out.write_all(&self.buf)
    }

    /// Close any open statement and return the number of rows written
    pub fn finish(self) -> io::Result<u64> {
        if self.in_batch > 0 {
            self.out.write_all(b";\n")?;
        }
        Ok(self.rows)
    }
}

/// Comment (and, for tables, lock statement) that opens an entry's data block
pub fn data_opening(messages: &Messages, entry: &CatalogEntry) -> String {
    let quoted = quote_identifier(&entry.name);
    match entry.kind {
        EntryKind::Table => format!(
            "\n-- {} {}\nLOCK TABLES {} WRITE;\n",
            messages.data_label(entry.kind),
            quoted,
            quoted
        ),
        EntryKind::View => format!(
            "\n-- {} {}\n-- {}\n",
            messages.data_label(entry.kind),
            quoted,
            messages.view_data_note()
        ),
    }
}

/// Write the data block of one entry and return how many rows it holds.
///
/// View rows are staged in memory and reach `sink` only when the whole
/// result set was read, so a view whose query or read fails contributes no
/// INSERT rows at all (unless `strict_views` makes that fatal).
///
/// # Arguments
///
/// * `source` - Row source for the entry
/// * `entry` - Entry to export, already classified
/// * `columns` - Column names in declaration order; empty means no INSERTs
/// * `sink` - Output for `data.sql`; left open for the caller
/// * `options` - Row limit and view failure policy
/// * `messages` - Language of the block's comment lines
///
/// # Returns
///
/// Number of rows written, which is 0 for a skipped view
///
/// # Errors
///
/// Returns [`ExportError::DataQuery`] or [`ExportError::DataRead`] for a
/// table, or for a view when `strict_views` is set, and
/// [`ExportError::DataWrite`] if the sink rejects a write.
pub async fn emit_data<S, W>(
    source: &mut S,
    entry: &CatalogEntry,
    columns: &[String],
    sink: &mut W,
    options: &DataOptions,
    messages: &Messages,
) -> Result<u64, ExportError>
where
    S: DumpSource,
    W: Write,
{
    sink.write_all(data_opening(messages, entry).as_bytes())
        .map_err(|e| write_error(entry, e))?;

    let rows = if columns.is_empty() {
        tracing::debug!("{} '{}' has no columns", entry.kind, entry.name);
        0
    } else {
        match entry.kind {
            EntryKind::Table => {
                stream_inserts(source, entry, columns, options.max_rows, sink).await?
            }
            EntryKind::View => {
                let mut staged = Vec::new();
                match stream_inserts(source, entry, columns, options.max_rows, &mut staged).await {
                    Ok(rows) => {
                        sink.write_all(&staged).map_err(|e| write_error(entry, e))?;
                        rows
                    }
                    Err(err) if !options.strict_views && err.is_view_degradable() => {
                        tracing::warn!("{}", degraded_view_message(&err));
                        0
                    }
                    Err(err) => return Err(err),
                }
            }
        }
    };

    if entry.kind == EntryKind::Table {
        sink.write_all(b"UNLOCK TABLES;\n")
            .map_err(|e| write_error(entry, e))?;
    }

    Ok(rows)
}

async fn stream_inserts<S, W>(
    source: &mut S,
    entry: &CatalogEntry,
    columns: &[String],
    max_rows: u64,
    out: &mut W,
) -> Result<u64, ExportError>
where
    S: DumpSource,
    W: Write,
{
    tracing::debug!(
        "Reading up to {} rows from {} '{}'",
        max_rows,
        entry.kind,
        entry.name
    );

    let mut batcher = InsertBatcher::new(out, &entry.name, columns);
    let streamed = source
        .stream_rows(entry, max_rows, |row| batcher.push(row))
        .await;

    match streamed {
        Ok(_) => batcher.finish().map_err(|e| write_error(entry, e)),
        Err(RowStreamError::Query(source)) => Err(ExportError::DataQuery {
            kind: entry.kind,
            entry: entry.name.clone(),
            source,
        }),
        Err(RowStreamError::Read(source)) => Err(ExportError::DataRead {
            kind: entry.kind,
            entry: entry.name.clone(),
            source,
        }),
        Err(RowStreamError::Write(e)) => Err(write_error(entry, e)),
    }
}

/// Error with its driver cause, as logged for a skipped view
fn degraded_view_message(err: &ExportError) -> String {
    match err.source() {
        Some(cause) => format!("{}: {}", err, cause),
        None => err.to_string(),
    }
}

fn write_error(entry: &CatalogEntry, source: io::Error) -> ExportError {
    ExportError::DataWrite {
        kind: entry.kind,
        entry: entry.name.clone(),
        source,
    }
}
