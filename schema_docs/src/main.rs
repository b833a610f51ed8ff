//! Command-line interface for schema_docs

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use schema_docs::render::markdown::DocOptions;
use schema_docs::utils::logging;
use schema_docs::{config, DocClient};

#[derive(Parser)]
#[command(
    name = "schema_docs",
    version,
    about = "Generates markdown and SQL documentation for PostgreSQL tables"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the markdown documentation for a single table
    Table {
        /// Table name
        name: String,

        /// Status shown in the document header
        #[arg(long, default_value = "actif")]
        status: String,

        /// Table type shown in the document header
        #[arg(long, default_value = "stratégique")]
        kind: String,
    },

    /// Generate SQL CREATE TABLE definitions
    Sql {
        /// Table name (omit with --all)
        name: Option<String>,

        /// Output file; prints to stdout when omitted
        output: Option<String>,

        /// Generate definition files for every table
        #[arg(long)]
        all: bool,
    },

    /// Generate markdown documentation for every table (default)
    All,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    let client = DocClient::new(config).await?;

    match cli.command.unwrap_or(Command::All) {
        Command::Table { name, status, kind } => {
            client
                .document_table(&name, &DocOptions { status, kind })
                .await?;
        }
        Command::Sql { name, output, all } => {
            if all {
                client.sql_all().await?;
            } else {
                let name = name.ok_or_else(|| anyhow!("table name required (or pass --all)"))?;
                let sql = client.sql_for_table(&name).await?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, &sql)?;
                        tracing::info!(table = %name, path = %path, "SQL definition written");
                    }
                    None => println!("{}", sql),
                }
            }
        }
        Command::All => {
            client.document_all().await?;
        }
    }

    Ok(())
}
