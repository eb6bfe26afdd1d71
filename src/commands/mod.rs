// src/commands/mod.rs
//! Command handlers for the searchsync CLI

mod crypt;
mod sync;

pub use crypt::{cmd_decrypt, cmd_encrypt};
pub use sync::{
    cmd_apply, cmd_export, cmd_init, cmd_refresh, cmd_sanitize, cmd_set_url, cmd_status,
};

use anyhow::Result;
use searchsync::{SqliteStore, paths};
use std::path::PathBuf;

/// Open the state database named on the command line (or the default one)
pub(crate) fn open_store(db_path: Option<&str>) -> Result<(SqliteStore, PathBuf)> {
    let path = paths::resolve_db_path(db_path);
    let store = SqliteStore::open(&path)?;
    Ok((store, path))
}

/// Write `text` to `output`, or to stdout when no file is given
pub(crate) fn write_output(text: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
            println!("Wrote {}", path);
        }
        None => println!("{}", text),
    }
    Ok(())
}
