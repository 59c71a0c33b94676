//! Encryption parameters as a persistable record
//!
//! The engine never talks to a database. It hands callers an
//! [`EncryptionMetadata`] with plain string and integer fields that a
//! repository can store next to the ciphertext, and can turn a stored record
//! back into the salt, nonce and [`EngineConfig`] needed for decryption.

use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, validate_iterations};
use crate::error::{ErrorCategory, ErrorKind, LockerError, Result};
use crate::secretcrypt::SealedBuffer;
use crate::{NONCE_SIZE, SALT_SIZE};

/// Identifier stored for AES-256-GCM sealed data
pub const ALGORITHM_AES_256_GCM: &str = "AES-256-GCM";

/// Identifier stored for PBKDF2-HMAC-SHA256 key derivation
pub const KDF_PBKDF2_SHA256: &str = "PBKDF2-SHA256";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionMetadata {
    pub algorithm: String,
    pub key_derivation: String,
    pub salt_hex: String,
    /// Present for whole-buffer artifacts only; streams carry a nonce per chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce_hex: Option<String>,
    pub iterations: u32,
}

impl EncryptionMetadata {
    /// Record for a whole-buffer artifact sealed with `iterations`.
    pub fn for_buffer(sealed: &SealedBuffer, iterations: u32) -> Self {
        Self {
            algorithm: ALGORITHM_AES_256_GCM.to_string(),
            key_derivation: KDF_PBKDF2_SHA256.to_string(),
            salt_hex: hex::encode(&sealed.salt),
            nonce_hex: Some(hex::encode(&sealed.nonce)),
            iterations,
        }
    }

    /// Record for a framed stream, whose salt is its first 32 bytes.
    pub fn for_stream(salt: &[u8; SALT_SIZE], iterations: u32) -> Self {
        Self {
            algorithm: ALGORITHM_AES_256_GCM.to_string(),
            key_derivation: KDF_PBKDF2_SHA256.to_string(),
            salt_hex: hex::encode(salt),
            nonce_hex: None,
            iterations,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.algorithm != ALGORITHM_AES_256_GCM {
            return Err(invalid(format!(
                "unsupported encryption algorithm: {:?}",
                self.algorithm
            )));
        }
        if self.key_derivation != KDF_PBKDF2_SHA256 {
            return Err(invalid(format!(
                "unsupported key derivation: {:?}",
                self.key_derivation
            )));
        }
        self.salt_bytes()?;
        self.nonce_bytes()?;
        validate_iterations(self.iterations).map_err(|e| {
            LockerError::with_kind_and_source(
                ErrorCategory::InputValidation,
                ErrorKind::MetadataInvalid,
                format!("invalid iteration count: {}", self.iterations),
                e,
            )
        })
    }

    pub fn salt_bytes(&self) -> Result<[u8; SALT_SIZE]> {
        decode_fixed(&self.salt_hex, "salt")
    }

    pub fn nonce_bytes(&self) -> Result<Option<[u8; NONCE_SIZE]>> {
        self.nonce_hex
            .as_deref()
            .map(|nonce_hex| decode_fixed(nonce_hex, "nonce"))
            .transpose()
    }

    /// Configuration that reproduces the key used at encryption time.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        self.validate()?;
        Ok(EngineConfig::default().with_iterations(self.iterations))
    }

    /// Rebuild the whole-buffer artifact from this record and stored ciphertext.
    pub fn to_sealed_buffer(&self, ciphertext: Vec<u8>) -> Result<SealedBuffer> {
        self.validate()?;
        let nonce = self.nonce_bytes()?.ok_or_else(|| {
            invalid("record has no nonce; it describes a stream, not a sealed buffer")
        })?;
        Ok(SealedBuffer {
            salt: self.salt_bytes()?.to_vec(),
            nonce: nonce.to_vec(),
            ciphertext,
        })
    }
}

fn decode_fixed<const N: usize>(encoded: &str, what: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(encoded).map_err(|e| {
        LockerError::with_kind_and_source(
            ErrorCategory::InputValidation,
            ErrorKind::MetadataInvalid,
            format!("invalid {} hex: {}", what, e),
            e,
        )
    })?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| invalid(format!("invalid {} length: {} (expected {})", what, len, N)))
}

fn invalid(msg: impl Into<String>) -> LockerError {
    LockerError::with_kind(
        ErrorCategory::InputValidation,
        ErrorKind::MetadataInvalid,
        msg,
    )
}
