use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// Broad classification of a failure, always present on every error.
///
/// Callers use the category to decide between fixing input, reporting a
/// wrong password, retrying I/O, or treating the container as corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCategory {
    /// The caller supplied input that was rejected before any cryptographic
    /// work was attempted. Always safely retryable with corrected input.
    InputValidation,

    /// Authenticated decryption failed. Deliberately covers wrong
    /// passwords, tampered ciphertext and corruption alike.
    Authentication,

    /// A read, write or entropy-source failure. Propagated as-is.
    Io,

    /// The stream or artifact container is malformed (truncated salt,
    /// nonce, length or chunk, or an oversize chunk).
    Framing,

    /// Unexpected state reached within datalocker logic.
    Internal,
}

/// Fine-grained condition flags for consumers that want to branch on error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Whole-buffer encryption was asked to encrypt zero bytes.
    EmptyPlaintext,
    /// No password was supplied.
    EmptyPassword,
    /// A salt was not exactly 32 bytes.
    InvalidSaltLength,
    /// A nonce was not exactly 12 bytes.
    InvalidNonceLength,
    /// An artifact carried no ciphertext.
    EmptyCiphertext,
    /// The key derivation work factor is outside the supported range.
    InvalidIterations,
    /// The configured stream chunk size is zero.
    InvalidChunkSize,
    /// Authentication failed due to an incorrect password or tampering
    /// or corruption.
    DecryptionFailed,
    /// The operating system random source failed.
    EntropyUnavailable,
    /// The stream ended before the 32-byte salt header was complete.
    SaltReadFailed,
    /// The stream ended partway through a chunk nonce.
    CorruptNonce,
    /// The stream ended partway through a chunk length or chunk body.
    TruncatedChunk,
    /// A sealed chunk does not fit the 32-bit length prefix.
    ChunkTooLarge,
    /// The armored representation is malformed (prefix or length).
    ArmoringInvalid,
    /// Base64 decoding of the armored payload failed.
    ArmoringDecode,
    /// Input claimed to be datalocker armor but used a future/unsupported version.
    ArmoringFromFuture,
    /// An encryption metadata record failed validation.
    MetadataInvalid,
    /// Passphrase could not be obtained from the configured reader.
    PassphraseUnavailable,
    /// Interaction with the filesystem, stdin/stdout, or other I/O failed.
    Io,
    /// The AEAD primitive rejected an operation that cannot fail for valid
    /// key and nonce sizes.
    InternalInvariant,
}

#[derive(Debug, Error)]
#[error("{msg}")]
pub struct LockerError {
    /// Broad error category, always provided.
    pub category: ErrorCategory,
    /// Optional specific condition tag for consumers that need to
    /// branch their behavior. Any code consuming errors MUST handle
    /// the absence of a defined kind.
    pub kind: Option<ErrorKind>,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    msg: String,
}

impl LockerError {
    /// Creates a new error with a required category and display message.
    pub fn new(category: ErrorCategory, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: None,
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that also tags the failure with a kind.
    pub fn with_kind(category: ErrorCategory, kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: None,
            msg: msg.into(),
        }
    }

    /// Creates a new error that carries both a kind tag and the originating source error.
    pub fn with_kind_and_source(
        category: ErrorCategory,
        kind: ErrorKind,
        msg: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            category,
            kind: Some(kind),
            source: Some(Box::new(source)),
            msg: msg.into(),
        }
    }

    /// The single opaque authentication failure.
    ///
    /// Never carries a source: the AEAD error is dropped so that wrong
    /// passwords and corrupted data cannot be told apart.
    pub fn decryption_failed() -> Self {
        Self::with_kind(
            ErrorCategory::Authentication,
            ErrorKind::DecryptionFailed,
            "decryption failed: wrong password or corrupted data",
        )
    }

    pub(crate) fn empty_password() -> Self {
        Self::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::EmptyPassword,
            "a password is required",
        )
    }

    /// Wraps an I/O failure from a byte source or sink.
    pub(crate) fn io(msg: impl Into<String>, err: io::Error) -> Self {
        Self::with_kind_and_source(ErrorCategory::Io, ErrorKind::Io, msg, err)
    }

    /// The user-facing message carried by the error.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Returns the preserved source error if present.
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// True for the opaque wrong-password-or-tampering failure.
    pub fn is_decryption_failure(&self) -> bool {
        self.kind == Some(ErrorKind::DecryptionFailed)
    }

    /// Wraps the current error with a higher-level message while preserving the original as source.
    pub fn with_context(self, msg: impl Into<String>) -> Self {
        let category = self.category;
        let kind = self.kind;
        Self {
            category,
            kind,
            source: Some(Box::new(self)),
            msg: msg.into(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LockerError>;
