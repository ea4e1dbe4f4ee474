// ABOUTME: Error taxonomy for the export pipeline
// ABOUTME: Every failure carries the operation and, where it applies, the entry it hit

use crate::catalog::EntryKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed driver-level error, so the pipeline does not depend on one driver's error type
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All ways an export run can fail.
///
/// Every variant is fatal except [`ExportError::DataQuery`] and
/// [`ExportError::DataRead`] raised for a view, which the row serializer
/// degrades to "zero rows exported" unless strict view handling is enabled.
/// See [`ExportError::is_view_degradable`].
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to {action} MySQL server at {address}")]
    Connection {
        address: String,
        action: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("failed to read the table list of database '{schema}'")]
    Catalog {
        schema: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to get column information for {kind} '{entry}'")]
    Columns {
        kind: EntryKind,
        entry: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to get CREATE statement for {kind} '{entry}'")]
    SchemaFetch {
        kind: EntryKind,
        entry: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to write structure for {kind} '{entry}'")]
    SchemaWrite {
        kind: EntryKind,
        entry: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to query data for {kind} '{entry}'")]
    DataQuery {
        kind: EntryKind,
        entry: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to read row data for {kind} '{entry}'")]
    DataRead {
        kind: EntryKind,
        entry: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to write data for {kind} '{entry}'")]
    DataWrite {
        kind: EntryKind,
        entry: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to {action} archive {}", .path.display())]
    Archive {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("failed to {action} {}", .path.display())]
    Filesystem {
        path: PathBuf,
        action: &'static str,
        #[source]
        source: io::Error,
    },
}

impl ExportError {
    /// True for the failures a view may shrug off: its data query or a row read.
    pub fn is_view_degradable(&self) -> bool {
        matches!(
            self,
            ExportError::DataQuery {
                kind: EntryKind::View,
                ..
            } | ExportError::DataRead {
                kind: EntryKind::View,
                ..
            }
        )
    }

    pub(crate) fn filesystem(
        path: impl Into<PathBuf>,
        action: &'static str,
        source: io::Error,
    ) -> Self {
        ExportError::Filesystem {
            path: path.into(),
            action,
            source,
        }
    }

    pub(crate) fn archive(
        path: impl Into<PathBuf>,
        action: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        ExportError::Archive {
            path: path.into(),
            action,
            source: source.into(),
        }
    }
}
