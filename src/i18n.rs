// ABOUTME: Localized operator messages and generated-file comments
// ABOUTME: Language is resolved once at startup and passed around explicitly

use crate::catalog::EntryKind;
use serde::Deserialize;
use std::path::Path;

/// Output language for progress messages and SQL comments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    /// Pick a language from a POSIX locale string such as `$LANG`.
    ///
    /// Chinese only when the locale starts with `zh`; English otherwise,
    /// including when no locale is set.
    pub fn from_locale(locale: Option<&str>) -> Self {
        match locale {
            Some(value) if value.to_ascii_lowercase().starts_with("zh") => Language::Zh,
            _ => Language::En,
        }
    }
}

/// Message catalog for one language
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    language: Language,
}

impl Messages {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn password_prompt(&self) -> &'static str {
        match self.language {
            Language::En => "Enter MySQL password",
            Language::Zh => "请输入MySQL密码",
        }
    }

    pub fn entity(&self, kind: EntryKind) -> &'static str {
        match (self.language, kind) {
            (Language::En, EntryKind::Table) => "table",
            (Language::En, EntryKind::View) => "view",
            (Language::Zh, EntryKind::Table) => "表",
            (Language::Zh, EntryKind::View) => "视图",
        }
    }

    // Comments inside the generated files

    pub fn structure_label(&self, kind: EntryKind) -> &'static str {
        match (self.language, kind) {
            (Language::En, EntryKind::Table) => "Table structure for",
            (Language::En, EntryKind::View) => "View structure for",
            (Language::Zh, EntryKind::Table) => "表结构",
            (Language::Zh, EntryKind::View) => "视图结构",
        }
    }

    pub fn data_label(&self, kind: EntryKind) -> &'static str {
        match (self.language, kind) {
            (Language::En, EntryKind::Table) => "Data for table",
            (Language::En, EntryKind::View) => "Data for view",
            (Language::Zh, EntryKind::Table) => "表数据",
            (Language::Zh, EntryKind::View) => "视图数据",
        }
    }

    pub fn view_data_note(&self) -> &'static str {
        match self.language {
            Language::En => "Note: View data is for reference only and will not be imported",
            Language::Zh => "注意：视图数据仅供参考，不会被导入",
        }
    }

    pub fn schema_file_title(&self) -> &'static str {
        match self.language {
            Language::En => "MySQL export: table structures",
            Language::Zh => "MySQL导出 表结构导出",
        }
    }

    pub fn data_file_title(&self) -> &'static str {
        match self.language {
            Language::En => "MySQL export: table data",
            Language::Zh => "MySQL导出 数据导出",
        }
    }

    pub fn database_line(&self, database: &str) -> String {
        match self.language {
            Language::En => format!("Database: {}", database),
            Language::Zh => format!("数据库: {}", database),
        }
    }

    pub fn max_rows_line(&self, max_rows: u64) -> String {
        match self.language {
            Language::En => format!("At most {} rows exported per table", max_rows),
            Language::Zh => format!("每张表最多导出 {} 行数据", max_rows),
        }
    }

    pub fn exported_at_line(&self, timestamp: &str) -> String {
        match self.language {
            Language::En => format!("Export time: {}", timestamp),
            Language::Zh => format!("导出时间: {}", timestamp),
        }
    }

    // Operator progress

    pub fn export_start(&self, database: &str) -> String {
        match self.language {
            Language::En => format!("Starting export of database {}...", database),
            Language::Zh => format!("开始导出数据库 {}...", database),
        }
    }

    pub fn found_entries(&self, count: usize) -> String {
        match self.language {
            Language::En => format!("Found {} tables", count),
            Language::Zh => format!("找到 {} 张表", count),
        }
    }

    pub fn entry_start(&self, name: &str) -> String {
        match self.language {
            Language::En => format!("Exporting table {}...", name),
            Language::Zh => format!("导出表 {}...", name),
        }
    }

    pub fn entry_rows(&self, rows: u64, kind: EntryKind, name: &str) -> String {
        let entity = self.entity(kind);
        match self.language {
            Language::En => format!("  Exported {} rows from {} {}", rows, entity, name),
            Language::Zh => format!("  导出了{} {} 的 {} 行数据", entity, name, rows),
        }
    }

    pub fn creating_archive(&self, path: &Path) -> String {
        match self.language {
            Language::En => format!("Creating zip file {}...", path.display()),
            Language::Zh => format!("创建压缩文件 {}...", path.display()),
        }
    }

    pub fn export_complete(&self) -> &'static str {
        match self.language {
            Language::En => "Export completed!",
            Language::Zh => "导出完成!",
        }
    }
}
