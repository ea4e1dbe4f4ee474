// ABOUTME: MySQL connection management and the MySQL-backed dump source
// ABOUTME: Opens one connection, probes liveness, and serves the export pipeline

pub mod converter;
pub mod reader;

use crate::catalog::{CatalogEntry, EntryKind};
use crate::config::ExportConfig;
use crate::dump::literal::SqlLiteral;
use crate::error::{BoxError, ExportError};
use crate::source::{DumpSource, RowStreamError};
use mysql_async::{prelude::Queryable, Conn, Opts, OptsBuilder};
use std::io;

/// Build driver options from the export configuration
pub fn build_opts(config: &ExportConfig) -> Opts {
    OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(Some(config.database.clone()))
        .into()
}

/// Connect to MySQL and verify the connection with a ping
///
/// # Errors
///
/// Returns [`ExportError::Connection`] if:
/// - Cannot connect to MySQL server (network, authentication, unknown database)
/// - The liveness probe fails
///
/// # Examples
///
/// ```no_run
/// # use mysql_exporter::{config::ExportConfig, mysql::connect_mysql};
/// # async fn example() -> Result<(), mysql_exporter::error::ExportError> {
/// let config = ExportConfig {
///     database: "shop".to_string(),
///     ..Default::default()
/// };
/// let conn = connect_mysql(&config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn connect_mysql(config: &ExportConfig) -> Result<Conn, ExportError> {
    let address = config.address();
    tracing::info!("Connecting to MySQL server at {}", address);

    let mut conn = Conn::new(build_opts(config))
        .await
        .map_err(|e| ExportError::Connection {
            address: address.clone(),
            action: "connect to",
            source: e.into(),
        })?;

    conn.ping().await.map_err(|e| ExportError::Connection {
        address: address.clone(),
        action: "ping",
        source: e.into(),
    })?;

    tracing::debug!("Successfully connected to MySQL");

    Ok(conn)
}

/// [`DumpSource`] backed by a single MySQL connection
pub struct MySqlSource {
    conn: Conn,
}

impl MySqlSource {
    pub async fn connect(config: &ExportConfig) -> Result<Self, ExportError> {
        let conn = connect_mysql(config).await?;
        Ok(Self { conn })
    }

    /// Close the connection politely; failures are only logged
    pub async fn disconnect(self) {
        if let Err(e) = self.conn.disconnect().await {
            tracing::debug!("Error while disconnecting from MySQL: {}", e);
        }
    }
}

impl DumpSource for MySqlSource {
    async fn list_entries(&mut self, schema: &str) -> Result<Vec<CatalogEntry>, BoxError> {
        Ok(reader::list_entries(&mut self.conn, schema).await?)
    }

    async fn classify(&mut self, schema: &str, name: &str) -> Result<EntryKind, BoxError> {
        match reader::table_type(&mut self.conn, schema, name).await? {
            Some(table_type) => Ok(EntryKind::from_table_type(&table_type)),
            None => Err(format!("'{}' not found in database '{}'", name, schema).into()),
        }
    }

    async fn columns(&mut self, schema: &str, name: &str) -> Result<Vec<String>, BoxError> {
        Ok(reader::column_names(&mut self.conn, schema, name).await?)
    }

    async fn create_statement(&mut self, entry: &CatalogEntry) -> Result<String, BoxError> {
        reader::create_statement(&mut self.conn, entry)
            .await?
            .ok_or_else(|| format!("SHOW CREATE returned no row for '{}'", entry.name).into())
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
        let mut result = reader::open_rows(&mut self.conn, entry, limit)
            .await
            .map_err(|e| RowStreamError::Query(e.into()))?;

        let mut delivered = 0u64;
        while let Some(row) = result
            .next()
            .await
            .map_err(|e| RowStreamError::Read(e.into()))?
        {
            let values = converter::mysql_row_to_literals(&row);
            on_row(&values).map_err(RowStreamError::Write)?;
            delivered += 1;
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_opts_from_config() {
        let config = ExportConfig {
            host: "db.internal".to_string(),
            port: 3307,
            user: "reporter".to_string(),
            password: "s3cret".to_string(),
            database: "shop".to_string(),
            ..Default::default()
        };

        let opts = build_opts(&config);
        assert_eq!(opts.ip_or_hostname(), "db.internal");
        assert_eq!(opts.tcp_port(), 3307);
        assert_eq!(opts.user(), Some("reporter"));
        assert_eq!(opts.pass(), Some("s3cret"));
        assert_eq!(opts.db_name(), Some("shop"));
    }

    #[tokio::test]
    async fn test_connect_refused_is_connection_error() {
        // Port 1 on localhost is not a MySQL server
        let config = ExportConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            database: "shop".to_string(),
            ..Default::default()
        };

        let err = connect_mysql(&config).await.unwrap_err();
        assert!(matches!(err, ExportError::Connection { .. }));
    }
}
