//! schema_docs: generates markdown and SQL documentation for PostgreSQL tables
//!
//! schema_docs connects to a hosted PostgreSQL database, introspects each
//! table's metadata (columns, constraints, indexes, triggers, row-level
//! security) from the system catalogs and renders one documentation file per
//! table, either as markdown or as a CREATE TABLE definition.

pub mod config;
pub mod db;
pub mod error;
pub mod metadata;
pub mod output;
pub mod render;
pub mod utils;

#[cfg(test)]
mod test;

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use metadata::fetcher::{Introspect, PgIntrospector};
pub use metadata::types::TableMetadata;
pub use render::markdown::DocOptions;

use std::path::PathBuf;

use sqlx::PgPool;

use crate::metadata::fetcher::fetch_table_metadata;

/// The main client: fetches table metadata and drives document generation
pub struct DocClient {
    config: Config,
    pool: PgPool,
}

impl DocClient {
    /// Create a new client from configuration
    pub async fn new(config: Config) -> Result<Self> {
        let pool = db::connection::connect(&config.database).await?;

        Ok(Self { config, pool })
    }

    fn introspector(&self) -> PgIntrospector {
        PgIntrospector::new(self.pool.clone(), self.config.database.schema_name())
    }

    /// Fetch the full metadata bundle for one table
    pub async fn table_metadata(&self, table: &str) -> Result<TableMetadata> {
        fetch_table_metadata(&self.introspector(), table).await
    }

    /// Generate and write the markdown document for a single table
    pub async fn document_table(&self, table: &str, options: &DocOptions) -> Result<PathBuf> {
        tracing::info!(table, "Generating table documentation");

        let meta = self.table_metadata(table).await?;
        let doc = render::markdown::assemble(&meta, options);
        let path = output::write_table_doc(&self.config.output, table, &doc)?;

        tracing::info!(table, path = %path.display(), "Documentation written");
        Ok(path)
    }

    /// Generate markdown documentation for every base table in the schema.
    ///
    /// Tables are processed sequentially; a failure on one table is logged and
    /// skipped so the batch continues. Returns the paths that were written.
    pub async fn document_all(&self) -> Result<Vec<PathBuf>> {
        let tables = self.introspector().list_tables().await?;
        tracing::info!(count = tables.len(), "Tables found");

        let options = DocOptions::batch();
        let mut written = Vec::new();
        for table in &tables {
            match self.batch_document(table, &options).await {
                Ok(path) => {
                    tracing::info!(table = %table, path = %path.display(), "Documentation written");
                    written.push(path);
                }
                Err(error) => {
                    tracing::error!(table = %table, %error, "Documentation generation failed, table skipped");
                }
            }
        }

        tracing::info!(
            written = written.len(),
            directory = %self.config.output.docs_dir,
            "Documentation batch finished"
        );
        Ok(written)
    }

    async fn batch_document(&self, table: &str, options: &DocOptions) -> Result<PathBuf> {
        let meta = self.table_metadata(table).await?;
        let doc = render::markdown::assemble(&meta, options);

        output::write_batch_doc(&self.config.output, table, &doc)
    }

    /// Generate the SQL definition text for one table
    pub async fn sql_for_table(&self, table: &str) -> Result<String> {
        tracing::info!(table, "Generating SQL definition");

        let meta = self.table_metadata(table).await?;
        Ok(render::sql::create_table_sql(&meta))
    }

    /// Generate SQL definition files for every base table in the schema.
    ///
    /// Same skip-and-continue behavior as `document_all`.
    pub async fn sql_all(&self) -> Result<Vec<PathBuf>> {
        let tables = self.introspector().list_tables().await?;
        tracing::info!(count = tables.len(), "Tables found");

        let mut written = Vec::new();
        for table in &tables {
            match self.batch_sql(table).await {
                Ok(path) => {
                    tracing::info!(table = %table, path = %path.display(), "SQL definition written");
                    written.push(path);
                }
                Err(error) => {
                    tracing::error!(table = %table, %error, "SQL generation failed, table skipped");
                }
            }
        }

        tracing::info!(
            written = written.len(),
            directory = %self.config.output.sql_dir,
            "SQL definition batch finished"
        );
        Ok(written)
    }

    async fn batch_sql(&self, table: &str) -> Result<PathBuf> {
        let meta = self.table_metadata(table).await?;
        let sql = render::sql::create_table_sql(&meta);

        output::write_sql_definition(&self.config.output, table, &sql)
    }
}
