// ABOUTME: Library module for mysql-exporter
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod archive;
pub mod catalog;
pub mod config;
pub mod dump;
pub mod error;
pub mod export;
pub mod i18n;
pub mod mysql;
pub mod source;
