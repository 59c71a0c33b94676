//! Salt and nonce generation from the operating system random source

use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{ErrorCategory, ErrorKind, LockerError, Result};
use crate::{NONCE_SIZE, SALT_SIZE};

/// Generate a fresh 32-byte key derivation salt.
pub fn generate_salt() -> Result<[u8; SALT_SIZE]> {
    random_bytes("salt")
}

/// Generate a fresh 12-byte AES-GCM nonce.
pub fn generate_nonce() -> Result<[u8; NONCE_SIZE]> {
    random_bytes("nonce")
}

// OsRng holds no state, so concurrent callers need no serialization.
fn random_bytes<const N: usize>(what: &str) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
        LockerError::with_kind_and_source(
            ErrorCategory::Io,
            ErrorKind::EntropyUnavailable,
            format!("failed to generate {}: {}", what, e),
            e,
        )
    })?;
    Ok(bytes)
}
