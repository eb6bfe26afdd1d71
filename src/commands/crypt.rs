// src/commands/crypt.rs
//! Standalone envelope encryption commands

use super::write_output;
use anyhow::{Context, Result};
use searchsync::cipher;

/// Encrypt a file into the salted envelope
pub fn cmd_encrypt(file: &str, password: &str, output: Option<&str>) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file))?;
    let encoded = cipher::encrypt(&text, password)?;
    write_output(&encoded, output)
}

/// Decrypt a salted envelope file
pub fn cmd_decrypt(file: &str, password: &str, output: Option<&str>) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file))?;
    let plain = cipher::decrypt(&text, password)?;
    write_output(&plain, output)
}
