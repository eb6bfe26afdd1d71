// src/error.rs

//! Error types shared across the synchronization engine

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the cipher, the store and the synchronization pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration URL is not an absolute http(s) URL
    #[error("invalid configuration URL: {0}")]
    InvalidConfigurationUrl(String),

    /// Encryption is enabled but no password is configured
    #[error("encryption is enabled but no encryption key is configured")]
    MissingEncryptionKey,

    /// Transport failure or non-2xx response
    #[error("invalid URL/response")]
    NetworkError(String),

    /// Wrong password, bad padding or a corrupt envelope
    #[error("decryption failed: {0}")]
    DecryptionError(String),

    /// Ciphertext is not a whole number of AES blocks
    #[error("decryption failed: ciphertext length {0} is not a multiple of the block size")]
    InvalidCiphertextLength(usize),

    /// Fetched text is not a configuration document
    #[error("malformed configuration document: {0}")]
    MalformedDocument(String),

    /// Persistent store failure
    #[error("store error: {0}")]
    StoreError(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("initialization error: {0}")]
    InitError(String),
}

impl Error {
    /// Whether this error came out of the cipher layer
    pub fn is_decryption(&self) -> bool {
        matches!(
            self,
            Error::DecryptionError(_) | Error::InvalidCiphertextLength(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_message_is_fixed() {
        let err = Error::NetworkError("HTTP 404".to_string());
        assert_eq!(err.to_string(), "invalid URL/response");
    }

    #[test]
    fn test_decryption_errors_are_distinguishable() {
        assert!(Error::DecryptionError("bad padding".into()).is_decryption());
        assert!(Error::InvalidCiphertextLength(17).is_decryption());
        assert!(!Error::MissingEncryptionKey.is_decryption());
        assert!(!Error::NetworkError(String::new()).is_decryption());
    }
}
