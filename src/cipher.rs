// src/cipher.rs

//! OpenSSL-compatible password encryption for configuration files
//!
//! Encrypted documents use the envelope written by `openssl enc -aes-256-cbc -md md5`:
//!
//! ```text
//! base64( "Salted__" | salt[8] | AES-CBC(PKCS#7(plaintext)) )
//! ```
//!
//! The key and IV come from `EVP_BytesToKey` with MD5 and a single iteration:
//! `D0 = MD5(P | S)`, `Di = MD5(D(i-1) | P | S)`, three rounds, giving 48 bytes
//! split into a 32-byte key and a 16-byte IV.

use aes::Aes256;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use md5::{Digest, Md5};
use rand::RngCore;

use crate::error::{Error, Result};

/// Envelope marker preceding the salt
pub const SALT_MARKER: &[u8; 8] = b"Salted__";

/// Salt length in bytes
pub const SALT_LEN: usize = 8;

/// AES block size in bytes
const BLOCK_LEN: usize = 16;

/// Fixed number of MD5 rounds (32-byte key + 16-byte IV)
const KDF_ROUNDS: usize = 3;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;

/// Key and IV derived from a password and salt
struct DerivedKey {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

/// Derive key material the way `EVP_BytesToKey(md5, count = 1)` does
fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> DerivedKey {
    // Hashed as UTF-8 bytes
    let password = password.as_bytes();

    let mut material = Vec::with_capacity(KDF_ROUNDS * 16);
    let mut previous: Vec<u8> = Vec::new();
    for _ in 0..KDF_ROUNDS {
        let mut hasher = Md5::new();
        hasher.update(&previous);
        hasher.update(password);
        hasher.update(salt);
        previous = hasher.finalize().to_vec();
        material.extend_from_slice(&previous);
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&material[..KEY_LEN]);
    iv.copy_from_slice(&material[KEY_LEN..KEY_LEN + IV_LEN]);
    DerivedKey { key, iv }
}

/// Generate a random salt
pub fn random_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Encrypt `plaintext` with a fresh random salt
pub fn encrypt(plaintext: &str, password: &str) -> Result<String> {
    encrypt_with_salt(plaintext, password, &random_salt())
}

/// Encrypt `plaintext` with a caller-supplied salt
///
/// Deterministic for a fixed salt, which is what the cross-tool test vectors rely on.
pub fn encrypt_with_salt(plaintext: &str, password: &str, salt: &[u8; SALT_LEN]) -> Result<String> {
    let derived = derive_key(password, salt);
    let cipher = Aes256CbcEnc::new_from_slices(&derived.key, &derived.iv)
        .map_err(|e| Error::InitError(format!("Failed to initialize cipher: {e}")))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    let mut envelope = Vec::with_capacity(SALT_MARKER.len() + SALT_LEN + ciphertext.len());
    envelope.extend_from_slice(SALT_MARKER);
    envelope.extend_from_slice(salt);
    envelope.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(envelope))
}

/// Decrypt a base64 envelope produced by [`encrypt`] or by the legacy tool
///
/// Whitespace inside the base64 text is ignored, so line-wrapped output from
/// `openssl enc -a` decodes as well.
pub fn decrypt(encoded: &str, password: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let envelope = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::DecryptionError(format!("invalid base64: {e}")))?;

    let header_len = SALT_MARKER.len() + SALT_LEN;
    if envelope.len() < header_len || &envelope[..SALT_MARKER.len()] != SALT_MARKER {
        return Err(Error::DecryptionError(
            "missing Salted__ header".to_string(),
        ));
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&envelope[SALT_MARKER.len()..header_len]);
    let ciphertext = &envelope[header_len..];

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(Error::InvalidCiphertextLength(ciphertext.len()));
    }

    let derived = derive_key(password, &salt);
    let cipher = Aes256CbcDec::new_from_slices(&derived.key, &derived.iv)
        .map_err(|e| Error::InitError(format!("Failed to initialize cipher: {e}")))?;
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| Error::DecryptionError("wrong password or corrupt data".to_string()))?;

    String::from_utf8(plaintext)
        .map_err(|_| Error::DecryptionError("wrong password or corrupt data".to_string()))
}

/// Quick check for the base64 form of the `Salted__` marker
pub fn looks_encrypted(text: &str) -> bool {
    text.trim_start().starts_with("U2FsdGVkX1")
}
