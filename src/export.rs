// ABOUTME: Export orchestrator sequencing catalog, schema, data and archive steps
// ABOUTME: Owns the output files for the whole run and reports per-entry progress

use crate::archive;
use crate::catalog::{self, CatalogEntry, EntryKind};
use crate::config::ExportConfig;
use crate::dump::rows::{emit_data, DataOptions};
use crate::dump::schema::emit_schema;
use crate::error::ExportError;
use crate::i18n::Messages;
use crate::source::DumpSource;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const FOREIGN_KEYS_OFF: &str = "SET FOREIGN_KEY_CHECKS=0;\n\n";
const FOREIGN_KEYS_ON: &str = "\nSET FOREIGN_KEY_CHECKS=1;\n";

/// Outcome of one exported entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub name: String,
    pub kind: EntryKind,
    pub rows: u64,
}

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub entries: Vec<EntryReport>,
    pub schema_path: PathBuf,
    pub data_path: PathBuf,
    pub archive_path: Option<PathBuf>,
}

impl ExportSummary {
    pub fn total_rows(&self) -> u64 {
        self.entries.iter().map(|e| e.rows).sum()
    }
}

/// Header of `schema.sql`
pub fn schema_header(messages: &Messages, database: &str, timestamp: &str) -> String {
    format!(
        "-- {}\n-- {}\n-- {}\n\n{}",
        messages.schema_file_title(),
        messages.database_line(database),
        messages.exported_at_line(timestamp),
        FOREIGN_KEYS_OFF
    )
}

/// Header of `data.sql`
pub fn data_header(messages: &Messages, database: &str, max_rows: u64, timestamp: &str) -> String {
    format!(
        "-- {}\n-- {}\n-- {}\n-- {}\n\n{}",
        messages.data_file_title(),
        messages.database_line(database),
        messages.max_rows_line(max_rows),
        messages.exported_at_line(timestamp),
        FOREIGN_KEYS_OFF
    )
}

fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Runs one export against a [`DumpSource`]
pub struct Exporter<'a, S> {
    config: &'a ExportConfig,
    source: &'a mut S,
    messages: Messages,
}

impl<'a, S: DumpSource> Exporter<'a, S> {
    pub fn new(config: &'a ExportConfig, source: &'a mut S) -> Self {
        Self {
            config,
            source,
            messages: Messages::new(config.language),
        }
    }

    /// Export every entry of the configured database.
    ///
    /// Writes `schema.sql` and `data.sql` into the output directory and,
    /// when compression is on, bundles both into `export.zip` afterwards.
    pub async fn run(&mut self) -> Result<ExportSummary, ExportError> {
        let config = self.config;
        let messages = self.messages;

        tracing::info!("{}", messages.export_start(&config.database));

        fs::create_dir_all(&config.output)
            .map_err(|e| ExportError::filesystem(&config.output, "create output directory", e))?;

        let entries = catalog::list_entries(self.source, &config.database).await?;
        tracing::info!("{}", messages.found_entries(entries.len()));

        let schema_path = config.schema_path();
        let data_path = config.data_path();
        let timestamp = now_timestamp();

        let mut schema_file = create_sink(&schema_path)?;
        write_text(
            &mut schema_file,
            &schema_path,
            &schema_header(&messages, &config.database, &timestamp),
            "write header to",
        )?;

        let mut data_file = create_sink(&data_path)?;
        write_text(
            &mut data_file,
            &data_path,
            &data_header(&messages, &config.database, config.max_rows, &timestamp),
            "write header to",
        )?;

        let options = DataOptions {
            max_rows: config.max_rows,
            strict_views: config.strict_views,
        };

        let mut reports = Vec::with_capacity(entries.len());
        for entry in &entries {
            let report = self
                .export_entry(entry, &mut schema_file, &mut data_file, &options)
                .await?;
            reports.push(report);
        }

        write_text(&mut schema_file, &schema_path, FOREIGN_KEYS_ON, "write footer to")?;
        write_text(&mut data_file, &data_path, FOREIGN_KEYS_ON, "write footer to")?;
        close_sink(schema_file, &schema_path)?;
        close_sink(data_file, &data_path)?;

        let archive_path = if config.compress {
            let zip_path = config.archive_path();
            tracing::info!("{}", messages.creating_archive(&zip_path));
            archive::bundle(&[&schema_path, &data_path], &zip_path)?;
            Some(zip_path)
        } else {
            None
        };

        tracing::info!("{}", messages.export_complete());

        Ok(ExportSummary {
            entries: reports,
            schema_path,
            data_path,
            archive_path,
        })
    }

    async fn export_entry<W: Write>(
        &mut self,
        entry: &CatalogEntry,
        schema_sink: &mut W,
        data_sink: &mut W,
        options: &DataOptions,
    ) -> Result<EntryReport, ExportError> {
        let messages = self.messages;
        tracing::info!("{}", messages.entry_start(&entry.name));

        emit_schema(self.source, entry, schema_sink, &messages).await?;

        let columns = catalog::columns(self.source, &self.config.database, entry).await?;
        let rows = emit_data(self.source, entry, &columns, data_sink, options, &messages).await?;

        tracing::info!("{}", messages.entry_rows(rows, entry.kind, &entry.name));

        Ok(EntryReport {
            name: entry.name.clone(),
            kind: entry.kind,
            rows,
        })
    }
}

fn create_sink(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ExportError::filesystem(path, "create", e))
}

fn write_text(
    sink: &mut BufWriter<File>,
    path: &Path,
    text: &str,
    action: &'static str,
) -> Result<(), ExportError> {
    sink.write_all(text.as_bytes())
        .map_err(|e| ExportError::filesystem(path, action, e))
}

fn close_sink(sink: BufWriter<File>, path: &Path) -> Result<(), ExportError> {
    let file = sink
        .into_inner()
        .map_err(|e| ExportError::filesystem(path, "flush", e.into_error()))?;
    file.sync_all()
        .map_err(|e| ExportError::filesystem(path, "sync", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump::literal::SqlLiteral;
    use crate::i18n::Language;
    use crate::source::memory::MemorySource;
    use tempfile::tempdir;
    use zip::ZipArchive;

    fn config_for(output: &Path) -> ExportConfig {
        ExportConfig {
            database: "shop".to_string(),
            output: output.to_path_buf(),
            ..Default::default()
        }
    }

    fn shop_source() -> MemorySource {
        MemorySource::new()
            .table(
                "t",
                &["id", "name"],
                "CREATE TABLE `t` (\n  `id` int NOT NULL AUTO_INCREMENT,\n  `name` varchar(20)\n) ENGINE=InnoDB AUTO_INCREMENT=3",
                vec![
                    vec![SqlLiteral::raw(1), SqlLiteral::text("a")],
                    vec![SqlLiteral::raw(2), SqlLiteral::Null],
                ],
            )
            .view(
                "v",
                &["id"],
                "CREATE ALGORITHM=UNDEFINED VIEW `v` AS select `t`.`id` AS `id` from `t`",
                vec![vec![SqlLiteral::raw(1)], vec![SqlLiteral::raw(2)]],
            )
    }

    #[test]
    fn test_headers() {
        let messages = Messages::new(Language::En);
        assert_eq!(
            schema_header(&messages, "shop", "2024-05-01 12:00:00"),
            "-- MySQL export: table structures\n-- Database: shop\n-- Export time: 2024-05-01 12:00:00\n\nSET FOREIGN_KEY_CHECKS=0;\n\n"
        );
        let header = data_header(&messages, "shop", 250, "2024-05-01 12:00:00");
        assert!(header.contains("-- At most 250 rows exported per table\n"));
        assert!(header.ends_with("SET FOREIGN_KEY_CHECKS=0;\n\n"));
    }

    #[tokio::test]
    async fn test_end_to_end_with_archive() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out");
        let config = config_for(&output);
        let mut source = shop_source();

        let summary = Exporter::new(&config, &mut source).run().await.unwrap();

        assert!(output.join("schema.sql").exists());
        assert!(output.join("data.sql").exists());
        assert_eq!(summary.archive_path, Some(output.join("export.zip")));
        assert_eq!(
            summary.entries,
            vec![
                EntryReport {
                    name: "t".to_string(),
                    kind: EntryKind::Table,
                    rows: 2
                },
                EntryReport {
                    name: "v".to_string(),
                    kind: EntryKind::View,
                    rows: 2
                },
            ]
        );
        assert_eq!(summary.total_rows(), 4);

        let archive = ZipArchive::new(File::open(output.join("export.zip")).unwrap()).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(names, vec!["data.sql", "schema.sql"]);
    }

    #[tokio::test]
    async fn test_generated_files_content() {
        let dir = tempdir().unwrap();
        let config = ExportConfig {
            compress: false,
            ..config_for(dir.path())
        };
        let mut source = shop_source();

        let summary = Exporter::new(&config, &mut source).run().await.unwrap();
        assert!(summary.archive_path.is_none());
        assert!(!dir.path().join("export.zip").exists());

        let schema = fs::read_to_string(dir.path().join("schema.sql")).unwrap();
        assert!(schema.starts_with("-- MySQL export: table structures\n-- Database: shop\n"));
        assert!(schema.contains("SET FOREIGN_KEY_CHECKS=0;\n\n-- Table structure for `t`\nDROP TABLE IF EXISTS `t`;\n"));
        assert!(schema.contains("ENGINE=InnoDB AUTO_INCREMENT=1;\n\n"));
        assert!(schema.contains("-- View structure for `v`\nDROP VIEW IF EXISTS `v`;\nCREATE ALGORITHM"));
        assert!(schema.ends_with("\nSET FOREIGN_KEY_CHECKS=1;\n"));

        let data = fs::read_to_string(dir.path().join("data.sql")).unwrap();
        assert!(data.contains("-- At most 1000 rows exported per table\n"));
        assert!(data.contains(
            "LOCK TABLES `t` WRITE;\nINSERT INTO `t` (`id`, `name`) VALUES (1, 'a'),\n(2, NULL);\nUNLOCK TABLES;\n"
        ));
        assert!(data.contains("-- Data for view `v`\n-- Note: View data is for reference only and will not be imported\nINSERT INTO `v` (`id`) VALUES (1),\n(2);\n"));
        assert!(!data.contains("LOCK TABLES `v`"));
        assert!(data.ends_with("\nSET FOREIGN_KEY_CHECKS=1;\n"));
    }

    #[tokio::test]
    async fn test_view_failure_does_not_abort_run() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source = shop_source().fail_query("v");

        let summary = Exporter::new(&config, &mut source).run().await.unwrap();

        let view = summary.entries.iter().find(|e| e.name == "v").unwrap();
        assert_eq!(view.rows, 0);
        assert!(summary.archive_path.is_some());
    }

    #[tokio::test]
    async fn test_table_failure_aborts_without_archive() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source = shop_source().fail_read_after("t", 1);

        let err = Exporter::new(&config, &mut source).run().await.unwrap_err();

        assert!(matches!(err, ExportError::DataRead { kind: EntryKind::Table, .. }));
        assert!(!dir.path().join("export.zip").exists());
    }

    #[tokio::test]
    async fn test_catalog_failure_creates_no_files() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source = MemorySource::new().fail_catalog();

        let err = Exporter::new(&config, &mut source).run().await.unwrap_err();

        assert!(matches!(err, ExportError::Catalog { .. }));
        assert!(!dir.path().join("schema.sql").exists());
        assert!(!dir.path().join("data.sql").exists());
    }

    #[tokio::test]
    async fn test_empty_database() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        let mut source = MemorySource::new();

        let summary = Exporter::new(&config, &mut source).run().await.unwrap();
        assert!(summary.entries.is_empty());

        let data = fs::read_to_string(dir.path().join("data.sql")).unwrap();
        assert!(!data.contains("INSERT"));
        assert!(data.ends_with("SET FOREIGN_KEY_CHECKS=0;\n\n\nSET FOREIGN_KEY_CHECKS=1;\n"));
    }

    #[tokio::test]
    async fn test_chinese_headers() {
        let dir = tempdir().unwrap();
        let config = ExportConfig {
            language: Language::Zh,
            compress: false,
            ..config_for(dir.path())
        };
        let mut source = shop_source();

        Exporter::new(&config, &mut source).run().await.unwrap();

        let schema = fs::read_to_string(dir.path().join("schema.sql")).unwrap();
        assert!(schema.starts_with("-- MySQL导出 表结构导出\n-- 数据库: shop\n-- 导出时间: "));
        assert!(schema.contains("-- 表结构 `t`\n"));
    }
}
