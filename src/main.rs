//! # Tablet Log CLI (`tablet-log`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tablet-log init` | Create the sheet tables and write the header row |
//! | `tablet-log headers` | Write the header row if row 1 is blank |
//! | `tablet-log serve` | Start the HTTP intake endpoint |
//! | `tablet-log submit --field k=v ...` | Push one submission through the pipeline |
//!
//! ## Examples
//!
//! ```bash
//! tablet-log --config ./config/tablet-log.toml init
//! tablet-log --config ./config/tablet-log.toml serve
//! tablet-log submit --field name=test --field grade=1A --field type=borrow \
//!     --field qty=1 --field "remark=Test submission"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tablet_log::config::{self, Config};
use tablet_log::sqlite_store::SqliteRowStore;
use tablet_log::{db, migrate, server};
use tablet_log_core::handler::IngestionHandler;
use tablet_log_core::init::ensure_headers;
use tablet_log_core::models::{Status, Submission};

/// Tablet Log: form-intake endpoint for the tablet borrow/return log.
#[derive(Parser)]
#[command(
    name = "tablet-log",
    about = "Tablet Log: form-intake endpoint for the tablet borrow/return and issue-report log",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/tablet-log.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the sheet tables and write the header row.
    ///
    /// Idempotent: an existing sheet and header are left untouched.
    Init,

    /// Write the header row if row 1 of the sheet is blank.
    Headers,

    /// Start the HTTP intake endpoint on `[server].bind`.
    Serve,

    /// Run one submission through validation and storage and print the
    /// resulting status token.
    Submit {
        /// Submission fields as `key=value` pairs.
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
    },
}

/// Parse a `key=value` pair for `--field` arguments.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

async fn open_store(cfg: &Config) -> anyhow::Result<SqliteRowStore> {
    let pool = db::connect(cfg).await?;
    Ok(SqliteRowStore::new(pool, cfg.sheet.name.clone()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;
    init_tracing(&cfg.logging.filter);

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            let store = open_store(&cfg).await?;
            let written =
                ensure_headers(&store, cfg.sheet.schema, cfg.sheet.bold_header).await?;
            println!("Sheet '{}' initialized.", cfg.sheet.name);
            if written {
                println!("  header row written");
            }
        }
        Commands::Headers => {
            let store = open_store(&cfg).await?;
            match ensure_headers(&store, cfg.sheet.schema, cfg.sheet.bold_header).await {
                Ok(true) => println!("Header row written."),
                Ok(false) => println!("Header row already present."),
                Err(e) => tracing::error!(error = %e, "failed to initialize sheet headers"),
            }
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Submit { fields } => {
            let store = open_store(&cfg).await?;
            let handler = IngestionHandler::new(cfg.intake_rules()?, Arc::new(store));
            let submission = Submission::from_pairs(fields);
            let status = handler.handle(&submission).await;
            println!("{}", status);
            if status != Status::Ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
