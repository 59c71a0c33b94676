//! Whole-buffer encryption/decryption using PBKDF2-SHA256 + AES-256-GCM
//!
//! This module seals a single in-memory plaintext using:
//! - PBKDF2-HMAC-SHA256 for key derivation from the password
//! - AES-256-GCM for authenticated encryption (no associated data)
//!
//! The artifact consists of:
//! - salt: 32 bytes
//! - nonce: 12 bytes
//! - ciphertext: plaintext length + 16-byte GCM tag
//!
//! [`SealedBuffer::to_bytes`] concatenates the three fields in that order.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{ErrorCategory, ErrorKind, LockerError, Result};
use crate::kdf::{DerivedKey, derive_key_with_iterations};
use crate::random::{generate_nonce, generate_salt};
use crate::{NONCE_SIZE, SALT_SIZE};

/// Result of whole-buffer encryption. Immutable once produced.
///
/// Serializes as `{"salt": "...", "nonce": "...", "ciphertext": "..."}` with
/// standard base64 byte fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBuffer {
    #[serde(with = "base64_bytes")]
    pub salt: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
}

impl SealedBuffer {
    /// Binary layout: salt(32) + nonce(12) + ciphertext(variable)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut output =
            Vec::with_capacity(self.salt.len() + self.nonce.len() + self.ciphertext.len());
        output.extend_from_slice(&self.salt);
        output.extend_from_slice(&self.nonce);
        output.extend_from_slice(&self.ciphertext);
        output
    }

    /// Parse the binary layout produced by [`SealedBuffer::to_bytes`].
    ///
    /// An empty ciphertext is accepted here and rejected by [`decrypt`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < SALT_SIZE {
            return Err(LockerError::with_kind(
                ErrorCategory::Framing,
                ErrorKind::SaltReadFailed,
                "input likely truncated while reading salt",
            ));
        }
        let (salt, rest) = data.split_at(SALT_SIZE);

        if rest.len() < NONCE_SIZE {
            return Err(LockerError::with_kind(
                ErrorCategory::Framing,
                ErrorKind::CorruptNonce,
                "input likely truncated while reading nonce",
            ));
        }
        let (nonce, ciphertext) = rest.split_at(NONCE_SIZE);

        Ok(Self {
            salt: salt.to_vec(),
            nonce: nonce.to_vec(),
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// Encrypt plaintext with a password using a random salt and nonce.
pub fn encrypt(password: &[u8], plaintext: &[u8], config: &EngineConfig) -> Result<SealedBuffer> {
    check_encrypt_input(password, plaintext)?;

    let salt = generate_salt()?;
    let nonce = generate_nonce()?;

    encrypt_deterministic(password, plaintext, &salt, &nonce, config)
}

/// Encrypt plaintext with a password using the provided salt and nonce.
///
/// This function is ONLY for testing purposes to generate deterministic output.
/// NEVER use this in production - always use `encrypt()` which generates random salt/nonce.
pub fn encrypt_deterministic(
    password: &[u8],
    plaintext: &[u8],
    salt: &[u8; SALT_SIZE],
    nonce: &[u8; NONCE_SIZE],
    config: &EngineConfig,
) -> Result<SealedBuffer> {
    check_encrypt_input(password, plaintext)?;

    let key = derive_key_with_iterations(password, salt, config.iterations)?;
    let ciphertext = seal(&new_cipher(&key), nonce, plaintext)?;

    Ok(SealedBuffer {
        salt: salt.to_vec(),
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

/// Decrypt an artifact with a password.
///
/// The artifact shape is validated before any key derivation. Every
/// authentication failure is reported as the same opaque error.
pub fn decrypt(password: &[u8], sealed: &SealedBuffer, config: &EngineConfig) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Err(LockerError::empty_password());
    }
    if sealed.salt.len() != SALT_SIZE {
        return Err(LockerError::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::InvalidSaltLength,
            format!(
                "invalid salt length: {} (expected {})",
                sealed.salt.len(),
                SALT_SIZE
            ),
        ));
    }
    if sealed.nonce.len() != NONCE_SIZE {
        return Err(LockerError::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::InvalidNonceLength,
            format!(
                "invalid nonce length: {} (expected {})",
                sealed.nonce.len(),
                NONCE_SIZE
            ),
        ));
    }
    if sealed.ciphertext.is_empty() {
        return Err(LockerError::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::EmptyCiphertext,
            "ciphertext is empty",
        ));
    }

    let key = derive_key_with_iterations(password, &sealed.salt, config.iterations)?;
    open(&new_cipher(&key), &sealed.nonce, &sealed.ciphertext)
}

fn check_encrypt_input(password: &[u8], plaintext: &[u8]) -> Result<()> {
    if plaintext.is_empty() {
        return Err(LockerError::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::EmptyPlaintext,
            "cannot encrypt empty plaintext",
        ));
    }
    if password.is_empty() {
        return Err(LockerError::empty_password());
    }
    Ok(())
}

pub(crate) fn new_cipher(key: &DerivedKey) -> Aes256Gcm {
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}

/// AEAD-seal one unit of plaintext. Output is plaintext length + 16-byte tag.
pub(crate) fn seal(
    cipher: &Aes256Gcm,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| {
            LockerError::with_kind(
                ErrorCategory::Internal,
                ErrorKind::InternalInvariant,
                "AES-GCM encryption failed",
            )
        })
}

/// AEAD-open one unit of ciphertext. `nonce` must be exactly 12 bytes.
pub(crate) fn open(cipher: &Aes256Gcm, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| LockerError::decryption_failed())
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}
