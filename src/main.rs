//! # nl-sql-gateway
//!
//! Answers natural-language questions about the `customers` table.
//!
//! ```bash
//! # Serve POST /query on 127.0.0.1:5000
//! export LLM_API_KEY="sk-..."
//! nl-sql-gateway serve --database customers.db
//!
//! # One-off question
//! nl-sql-gateway ask "Show all sci-fi readers" -f json
//!
//! # Check a statement against the firewall without a model
//! nl-sql-gateway check "SELECT * FROM customers"
//! ```
//!
//! # Exit Codes
//!
//! - `0` - Success
//! - `1` - Startup failure or error envelope from `ask`
//! - `2` - Statement rejected by `check`

use std::process;

use clap::Parser;
use nl_sql_gateway::{
    app::{run_ask, run_check, run_serve},
    cli::{Cli, Commands},
    config::Config,
    error::AppResult
};
use tokio::main;
use tracing_subscriber::EnvFilter;

#[main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Serve { .. }));
    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn init_tracing(serving: bool) {
    let default_level = if serving { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> AppResult<i32> {
    match cli.command {
        Commands::Serve {
            llm,
            bind
        } => run_serve(Config::load()?, llm, bind).await,
        Commands::Ask {
            message,
            llm,
            output_format,
            no_color
        } => run_ask(Config::load()?, llm, message, output_format, !no_color).await,
        Commands::Check {
            sql,
            no_color
        } => Ok(run_check(&sql, !no_color))
    }
}
