// ABOUTME: The database seam of the export pipeline
// ABOUTME: Serializers talk to this trait, the MySQL driver implements it

use crate::catalog::{CatalogEntry, EntryKind};
use crate::dump::literal::SqlLiteral;
use crate::error::BoxError;
use std::io;

/// Why streaming an entry's rows stopped early
#[derive(Debug)]
pub enum RowStreamError {
    /// The bounded row query itself failed
    Query(BoxError),
    /// Reading or decoding a row from the result set failed
    Read(BoxError),
    /// The row callback could not write to its sink
    Write(io::Error),
}

/// Read access to one database, as needed by the export pipeline.
///
/// All calls are sequential on a single connection; implementations are free
/// to hold a connection by `&mut self`.
#[allow(async_fn_in_trait)]
pub trait DumpSource {
    /// All tables and views of `schema`, classified, in catalog order
    async fn list_entries(&mut self, schema: &str) -> Result<Vec<CatalogEntry>, BoxError>;

    /// Catalog lookup of a single entry; errors when the entry does not exist
    async fn classify(&mut self, schema: &str, name: &str) -> Result<EntryKind, BoxError>;

    /// Column names in declaration order
    async fn columns(&mut self, schema: &str, name: &str) -> Result<Vec<String>, BoxError>;

    /// `SHOW CREATE TABLE` / `SHOW CREATE VIEW` text for the entry
    async fn create_statement(&mut self, entry: &CatalogEntry) -> Result<String, BoxError>;

    /// Run the bounded row query and hand each row to `on_row` as it arrives.
    ///
    /// Returns the number of rows delivered.
    async fn stream_rows<F>(
        &mut self,
        entry: &CatalogEntry,
        limit: u64,
        on_row: F,
    ) -> Result<u64, RowStreamError>
    where
        F: FnMut(&[SqlLiteral]) -> io::Result<()>;
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory [`DumpSource`] with scripted failures for pipeline tests.

    use super::*;

    struct MemoryEntry {
        entry: CatalogEntry,
        columns: Vec<String>,
        create: String,
        rows: Vec<Vec<SqlLiteral>>,
        fail_query: bool,
        fail_read_after: Option<usize>,
    }

    #[derive(Default)]
    pub struct MemorySource {
        entries: Vec<MemoryEntry>,
        fail_catalog: bool,
    }

    fn failure(message: &str) -> BoxError {
        io::Error::other(message.to_string()).into()
    }

    impl MemorySource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn table(
            self,
            name: &str,
            columns: &[&str],
            create: &str,
            rows: Vec<Vec<SqlLiteral>>,
        ) -> Self {
            self.push(CatalogEntry::table(name), columns, create, rows)
        }

        pub fn view(
            self,
            name: &str,
            columns: &[&str],
            create: &str,
            rows: Vec<Vec<SqlLiteral>>,
        ) -> Self {
            self.push(CatalogEntry::view(name), columns, create, rows)
        }

        fn push(
            mut self,
            entry: CatalogEntry,
            columns: &[&str],
            create: &str,
            rows: Vec<Vec<SqlLiteral>>,
        ) -> Self {
            self.entries.push(MemoryEntry {
                entry,
                columns: columns.iter().map(|c| c.to_string()).collect(),
                create: create.to_string(),
                rows,
                fail_query: false,
                fail_read_after: None,
            });
            self
        }

        pub fn fail_catalog(mut self) -> Self {
            self.fail_catalog = true;
            self
        }

        pub fn fail_query(mut self, name: &str) -> Self {
            if let Some(e) = self.entries.iter_mut().find(|e| e.entry.name == name) {
                e.fail_query = true;
            }
            self
        }

        pub fn fail_read_after(mut self, name: &str, rows: usize) -> Self {
            if let Some(e) = self.entries.iter_mut().find(|e| e.entry.name == name) {
                e.fail_read_after = Some(rows);
            }
            self
        }

        fn find(&self, name: &str) -> Result<&MemoryEntry, BoxError> {
            self.entries
                .iter()
                .find(|e| e.entry.name == name)
                .ok_or_else(|| failure(&format!("unknown entry {}", name)))
        }
    }

    impl DumpSource for MemorySource {
        async fn list_entries(&mut self, _schema: &str) -> Result<Vec<CatalogEntry>, BoxError> {
            if self.fail_catalog {
                return Err(failure("information_schema unavailable"));
            }
            Ok(self.entries.iter().map(|e| e.entry.clone()).collect())
        }

        async fn classify(&mut self, _schema: &str, name: &str) -> Result<EntryKind, BoxError> {
            Ok(self.find(name)?.entry.kind)
        }

        async fn columns(&mut self, _schema: &str, name: &str) -> Result<Vec<String>, BoxError> {
            Ok(self.find(name)?.columns.clone())
        }

        async fn create_statement(&mut self, entry: &CatalogEntry) -> Result<String, BoxError> {
            Ok(self.find(&entry.name)?.create.clone())
        }

        async fn stream_rows<F>(
            &mut self,
            entry: &CatalogEntry,
            limit: u64,
            mut on_row: F,
        ) -> Result<u64, RowStreamError>
        where
            F: FnMut(&[SqlLiteral]) -> io::Result<()>,
        {
            let scripted = self.find(&entry.name).map_err(RowStreamError::Query)?;
            if scripted.fail_query {
                return Err(RowStreamError::Query(failure("query rejected")));
            }

            let mut delivered = 0u64;
            for (idx, row) in scripted.rows.iter().take(limit as usize).enumerate() {
                if scripted.fail_read_after == Some(idx) {
                    return Err(RowStreamError::Read(failure("connection reset")));
                }
                on_row(row).map_err(RowStreamError::Write)?;
                delivered += 1;
            }
            Ok(delivered)
        }
    }
}
