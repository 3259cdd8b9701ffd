//! `folio` command line entry point.

use anyhow::Result;
use clap::Parser;
use folio_cli::{cli::Cli, commands};
use folio_runtime::{init_logging, ConsoleTarget, LoggingOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so piped stdout stays clean.
    let _guard = init_logging(
        &LoggingOptions::new("folio")
            .with_console(ConsoleTarget::Stderr)
            .with_env_log_dir(),
    )?;

    let cli = Cli::parse();
    commands::run(cli).await
}
