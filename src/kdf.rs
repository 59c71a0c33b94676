//! Key derivation: PBKDF2-HMAC-SHA256 password → 256-bit key

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::config::validate_iterations;
use crate::error::{ErrorCategory, ErrorKind, LockerError, Result};
use crate::{DEFAULT_ITERATIONS, KEY_SIZE, SALT_SIZE};

/// A 256-bit AES key derived from a password.
///
/// Lives only for the duration of one encrypt/decrypt call and is zeroized
/// on drop.
pub struct DerivedKey {
    bytes: [u8; KEY_SIZE],
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Derive a key from a password and a 32-byte salt using the default work factor.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<DerivedKey> {
    derive_key_with_iterations(password, salt, DEFAULT_ITERATIONS)
}

/// Derive a key from a password and a 32-byte salt.
///
/// Deterministic: the same password, salt and iteration count always yield
/// the same key. Fails only for a salt of the wrong length or an iteration
/// count outside the supported range.
pub fn derive_key_with_iterations(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<DerivedKey> {
    if salt.len() != SALT_SIZE {
        return Err(LockerError::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::InvalidSaltLength,
            format!(
                "invalid salt length: {} (expected {})",
                salt.len(),
                SALT_SIZE
            ),
        ));
    }
    validate_iterations(iterations)?;

    let mut bytes = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut bytes);
    Ok(DerivedKey { bytes })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SALT: [u8; SALT_SIZE] = [0x42; SALT_SIZE];

    #[test]
    fn test_known_answer() {
        let key = derive_key(b"testpassword", &TEST_SALT).unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "570c6b34a1e07bbecbc914b6d0b6ff798b78179f6f1c6a6fb8507817cb011873"
        );
    }

    #[test]
    fn test_deterministic() {
        let key1 = derive_key(b"testpassword", &TEST_SALT).unwrap();
        let key2 = derive_key(b"testpassword", &TEST_SALT).unwrap();
        assert_eq!(key1.as_bytes(), key2.as_bytes(), "KDF must be deterministic");
    }

    #[test]
    fn test_different_passwords() {
        let key1 = derive_key(b"testpassword", &TEST_SALT).unwrap();
        let key2 = derive_key(b"differentpassword", &TEST_SALT).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_salts() {
        let key1 = derive_key(b"same-password", &[1u8; SALT_SIZE]).unwrap();
        let key2 = derive_key(b"same-password", &[2u8; SALT_SIZE]).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_iterations_change_key() {
        let key1 = derive_key_with_iterations(b"pw", &TEST_SALT, 100_000).unwrap();
        let key2 = derive_key_with_iterations(b"pw", &TEST_SALT, 100_001).unwrap();
        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_wrong_salt_length() {
        for len in [0, 16, SALT_SIZE - 1, SALT_SIZE + 1] {
            let err = derive_key(b"pw", &vec![0u8; len]).expect_err("expected salt rejection");
            assert_eq!(err.kind, Some(ErrorKind::InvalidSaltLength));
            assert_eq!(err.category, ErrorCategory::InputValidation);
        }
    }

    #[test]
    fn test_debug_redacts_key() {
        let key = derive_key(b"pw", &TEST_SALT).unwrap();
        let rendered = format!("{:?}", key);
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains(&hex::encode(&key.as_bytes()[..4])));
    }
}
