//! Output file persistence
//!
//! Writes generated documents under the configured output directories,
//! creating them on demand.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::OutputConfig;
use crate::error::Result;

/// Write the batch-variant markdown document (`TABLE-<name>.md`)
pub fn write_batch_doc(config: &OutputConfig, table: &str, content: &str) -> Result<PathBuf> {
    write_under(&config.docs_dir, &format!("TABLE-{}.md", table), content)
}

/// Write the single-table markdown document (`<name>.md`)
pub fn write_table_doc(config: &OutputConfig, table: &str, content: &str) -> Result<PathBuf> {
    write_under(&config.docs_dir, &format!("{}.md", table), content)
}

/// Write the SQL definition file (`<name>.sql`)
pub fn write_sql_definition(config: &OutputConfig, table: &str, content: &str) -> Result<PathBuf> {
    write_under(&config.sql_dir, &format!("{}.sql", table), content)
}

fn write_under(dir: &str, file_name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let path = Path::new(dir).join(file_name);
    fs::write(&path, content)?;

    Ok(path)
}
