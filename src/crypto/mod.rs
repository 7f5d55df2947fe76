//! AES-256-CTR encryption, key/IV derivation and frame checksums for .scc
//! containers.
//!
//! Key derivation: password bytes, zero-padded or truncated to 32 bytes.
//! Fixed IV:       [`FIXED_IV_SEED`], zero-padded or truncated to 16 bytes.
//! Encryption:     AES-256-CTR (big-endian 128-bit counter), length preserving.
//! Checksum:       CRC-32 (IEEE) of the plaintext chunk.
//!
//! The fixed key/IV pair protects only the header name and each frame's own
//! IV.  Chunk payloads are encrypted under the fixed key and a fresh per-frame
//! IV.  There is no authentication tag: integrity is the checksum's job.

use aes::Aes256;
use ctr::cipher::{KeyIvInit, StreamCipher};
use thiserror::Error;
use zeroize::Zeroize;

/// Byte length of the derived key.
pub const KEY_LEN: usize = 32;
/// Byte length of every IV (fixed and per-frame).
pub const IV_LEN: usize = 16;
/// Application string the fixed IV is derived from.
pub const FIXED_IV_SEED: &str = "sccrypt/frame-iv";

type Aes256Ctr = ctr::Ctr128BE<Aes256>;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid key or IV length")]
    InvalidLength,
    #[error("Keystream exhausted")]
    KeystreamExhausted,
    #[error("Decryption failed: wrong password or corrupted data")]
    DecryptionFailed,
}

// ── Key material ─────────────────────────────────────────────────────────────

/// A password-derived 256-bit key.  Zeroized on drop.
pub struct SecretKey {
    bytes: [u8; KEY_LEN],
}

impl SecretKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey([REDACTED])")
    }
}

/// Right-pad `content` with zeros, or truncate it, to exactly `N` bytes.
pub fn pad_or_truncate<const N: usize>(content: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    let n = content.len().min(N);
    out[..n].copy_from_slice(&content[..n]);
    out
}

/// Derive the container key from a password.
///
/// Not a KDF: no salt, no stretching.  Kept byte-for-byte so existing
/// containers stay readable.
pub fn derive_key(password: &str) -> SecretKey {
    SecretKey { bytes: pad_or_truncate::<KEY_LEN>(password.as_bytes()) }
}

/// The constant IV protecting header names and frame IVs.
pub fn fixed_iv() -> [u8; IV_LEN] {
    pad_or_truncate::<IV_LEN>(FIXED_IV_SEED.as_bytes())
}

// ── Cipher ───────────────────────────────────────────────────────────────────

/// Encrypt `plaintext` under `key` and `iv`.  Output length equals input length.
pub fn encrypt(plaintext: &[u8], key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> Result<Vec<u8>, CryptoError> {
    apply_keystream(plaintext, key, iv)
}

/// Inverse of [`encrypt`].
pub fn decrypt(ciphertext: &[u8], key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> Result<Vec<u8>, CryptoError> {
    apply_keystream(ciphertext, key, iv)
}

fn apply_keystream(input: &[u8], key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> Result<Vec<u8>, CryptoError> {
    let mut cipher = Aes256Ctr::new_from_slices(key, iv)
        .map_err(|_| CryptoError::InvalidLength)?;
    let mut out = input.to_vec();
    cipher
        .try_apply_keystream(&mut out)
        .map_err(|_| CryptoError::KeystreamExhausted)?;
    Ok(out)
}

// ── Checksum ─────────────────────────────────────────────────────────────────

/// CRC-32 of a plaintext chunk.
#[inline]
pub fn checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}
