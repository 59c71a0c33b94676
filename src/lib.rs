//! DataLocker - password-based authenticated encryption
//!
//! Plaintext is sealed with AES-256-GCM under a key derived from a password
//! with PBKDF2-HMAC-SHA256. Two codecs share the same key schedule:
//!
//! - [`secretcrypt`] seals one in-memory buffer into a [`SealedBuffer`]
//!   (salt, nonce, ciphertext).
//! - [`stream`] seals an unbounded byte stream as a sequence of
//!   independently authenticated chunks:
//!
//! ```text
//! [salt: 32 bytes]
//! repeat until EOF:
//!   [nonce: 12 bytes]
//!   [chunk_len: 4 bytes, big-endian]
//!   [sealed_chunk: chunk_len bytes]
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod file_ops;
pub mod kdf;
pub mod metadata;
pub mod passphrase;
pub mod random;
pub mod secretcrypt;
pub mod stream;
pub mod varmor;

pub use config::EngineConfig;
pub use engine::CryptoEngine;
pub use error::{ErrorCategory, ErrorKind, LockerError, Result};
pub use kdf::{DerivedKey, derive_key};
pub use metadata::EncryptionMetadata;
pub use random::{generate_nonce, generate_salt};
pub use secretcrypt::SealedBuffer;
pub use stream::{StreamSummary, decrypt_stream, encrypt_stream};

/// Size of a derived AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of a key derivation salt in bytes
pub const SALT_SIZE: usize = 32;

/// Size of an AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;

/// Size of an AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Plaintext bytes per stream chunk (1 MiB)
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Size of the big-endian sealed chunk length prefix
pub const CHUNK_LEN_SIZE: usize = 4;

/// Largest sealed chunk the length prefix can describe
pub const MAX_SEALED_CHUNK_LEN: usize = u32::MAX as usize;

/// Largest plaintext chunk whose sealed form still fits the length prefix
pub const MAX_CHUNK_SIZE: usize = MAX_SEALED_CHUNK_LEN - TAG_SIZE;

/// PBKDF2 iteration count used unless configured otherwise
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Lowest accepted PBKDF2 iteration count
pub const MIN_ITERATIONS: u32 = 100_000;

/// Highest accepted PBKDF2 iteration count
pub const MAX_ITERATIONS: u32 = 1_000_000;
