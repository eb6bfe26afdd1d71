// src/main.rs

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_path } => commands::cmd_init(db_path.as_deref()).await,
        Commands::Refresh {
            db_path,
            if_due,
            interval_hours,
            timeout,
        } => commands::cmd_refresh(db_path.as_deref(), if_due, interval_hours, timeout).await,
        Commands::Apply {
            file,
            db_path,
            force,
        } => commands::cmd_apply(&file, db_path.as_deref(), force).await,
        Commands::Export {
            db_path,
            output,
            encrypt,
        } => commands::cmd_export(db_path.as_deref(), output.as_deref(), encrypt).await,
        Commands::Sanitize { db_path } => commands::cmd_sanitize(db_path.as_deref()).await,
        Commands::Status { db_path } => commands::cmd_status(db_path.as_deref()).await,
        Commands::SetUrl {
            url,
            db_path,
            password,
            encrypted,
            auto_update,
        } => {
            commands::cmd_set_url(&url, db_path.as_deref(), password, encrypted, auto_update).await
        }
        Commands::Encrypt {
            file,
            password,
            output,
        } => commands::cmd_encrypt(&file, &password, output.as_deref()),
        Commands::Decrypt {
            file,
            password,
            output,
        } => commands::cmd_decrypt(&file, &password, output.as_deref()),
    }
}
