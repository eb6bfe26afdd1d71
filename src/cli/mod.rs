// src/cli/mod.rs
//! CLI definitions for searchsync
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "searchsync")]
#[command(version)]
#[command(about = "Keep a search-provider configuration in sync with a remote document", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the state database and fill it with the bundled defaults
    Init {
        /// Path to the database file (default: $SEARCHSYNC_DB or the data directory)
        #[arg(short, long)]
        db_path: Option<String>,
    },

    /// Fetch the configured document and merge it into the stored state
    Refresh {
        /// Path to the database file
        #[arg(short, long)]
        db_path: Option<String>,

        /// Only refresh when auto-update is on and the last attempt is old enough
        #[arg(long)]
        if_due: bool,

        /// Minimum hours between automatic refreshes (with --if-due)
        #[arg(long, default_value = "24")]
        interval_hours: u64,

        /// HTTP timeout in seconds (default: none)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Merge a local document file into the stored state
    Apply {
        /// Document file (plain JSON or an encrypted envelope)
        file: String,

        /// Path to the database file
        #[arg(short, long)]
        db_path: Option<String>,

        /// Treat every section policy as override
        #[arg(long)]
        force: bool,
    },

    /// Write the stored configuration as a document
    Export {
        /// Path to the database file
        #[arg(short, long)]
        db_path: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Encrypt with the configured password
        #[arg(long)]
        encrypt: bool,
    },

    /// Fill missing configuration from the bundled defaults
    Sanitize {
        /// Path to the database file
        #[arg(short, long)]
        db_path: Option<String>,
    },

    /// Show the configuration source and last synchronization
    Status {
        /// Path to the database file
        #[arg(short, long)]
        db_path: Option<String>,
    },

    /// Set the configuration URL and encryption settings
    SetUrl {
        /// Configuration document URL (http or https)
        url: String,

        /// Path to the database file
        #[arg(short, long)]
        db_path: Option<String>,

        /// Password for encrypted documents (implies --encrypted)
        #[arg(long)]
        password: Option<String>,

        /// Mark the document as encrypted
        #[arg(long)]
        encrypted: bool,

        /// Enable or disable scheduled refreshes
        #[arg(long)]
        auto_update: Option<bool>,
    },

    /// Encrypt a file into the salted envelope
    Encrypt {
        /// Plaintext file
        file: String,

        /// Passphrase
        #[arg(short, long)]
        password: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Decrypt a salted envelope file
    Decrypt {
        /// Encrypted file
        file: String,

        /// Passphrase
        #[arg(short, long)]
        password: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}
