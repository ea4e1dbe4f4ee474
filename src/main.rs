// ABOUTME: CLI entry point for mysql-exporter
// ABOUTME: Parses flags, prompts for the password and runs one export

use anyhow::Context;
use clap::{ArgAction, Parser};
use dialoguer::Password;
use mysql_exporter::config::{self, ConfigOverrides, ExportConfig, Profile};
use mysql_exporter::export::Exporter;
use mysql_exporter::i18n::{Language, Messages};
use mysql_exporter::mysql::MySqlSource;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mysql-exporter", version)]
#[command(about = "MySQL database export tool", long_about = "\
Exports the table structures (including indexes) of a MySQL database and a
bounded number of rows per table into schema.sql and data.sql, optionally
bundled as export.zip. The files can be imported into another MySQL server.")]
struct Cli {
    /// MySQL server address [default: localhost]
    #[arg(long)]
    host: Option<String>,
    /// MySQL server port [default: 3306]
    #[arg(long)]
    port: Option<u16>,
    /// MySQL username [default: root]
    #[arg(long)]
    user: Option<String>,
    /// MySQL password (prompted for when empty)
    #[arg(long)]
    password: Option<String>,
    /// Database name to export
    #[arg(long)]
    database: Option<String>,
    /// Maximum number of rows to export per table [default: 1000]
    #[arg(long)]
    rows: Option<u64>,
    /// Output directory path [default: ./output]
    #[arg(long)]
    output: Option<PathBuf>,
    /// Whether to compress output files into export.zip [default: true]
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    compress: Option<bool>,
    /// Message language (defaults to $LANG)
    #[arg(long, value_enum)]
    lang: Option<Language>,
    /// Abort when a view's data cannot be read instead of skipping it
    #[arg(long)]
    strict_views: bool,
    /// TOML profile with [connection] and [export] defaults
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            rows: self.rows,
            output: self.output.clone(),
            compress: self.compress,
            language: self.lang,
            strict_views: self.strict_views,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let profile = match &cli.config {
        Some(path) => config::load_profile(path)?,
        None => Profile::default(),
    };
    let locale = std::env::var("LANG").ok();
    let resolved = ExportConfig::resolve(profile, cli.overrides(), locale.as_deref());
    resolved.validate()?;

    let config = if resolved.password.is_empty() {
        let messages = Messages::new(resolved.language);
        let password = Password::new()
            .with_prompt(messages.password_prompt())
            .allow_empty_password(true)
            .interact()
            .context("Failed to read password")?;
        ExportConfig {
            password,
            ..resolved
        }
    } else {
        resolved
    };

    let mut source = MySqlSource::connect(&config).await?;
    let result = Exporter::new(&config, &mut source).run().await;
    source.disconnect().await;

    let summary = result?;
    tracing::debug!(
        "Exported {} rows from {} entries",
        summary.total_rows(),
        summary.entries.len()
    );

    Ok(())
}
