//! Versioned text armoring for sealed artifacts
//!
//! Whole-buffer artifacts are binary. To move them through text channels
//! they are armored as `datalocker1:{base64url-no-padding}`, which contains
//! no whitespace and is safe both in URLs and unquoted in a POSIX shell.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::error::{ErrorCategory, ErrorKind, LockerError, Result};
use crate::secretcrypt::SealedBuffer;

/// Shared by every armor version
const MAGIC_PREFIX: &str = "datalocker";

const V1_MAGIC: &str = "datalocker1:";

/// Armor raw bytes.
pub fn wrap(body: &[u8]) -> String {
    format!("{}{}", V1_MAGIC, URL_SAFE_NO_PAD.encode(body))
}

/// Strip the armor from `armored`, returning the original bytes.
///
/// Surrounding whitespace (such as the trailing newline an editor adds) is
/// ignored.
pub fn unwrap(armored: &str) -> Result<Vec<u8>> {
    let armored = armored.trim();
    if armored.len() < V1_MAGIC.len() && V1_MAGIC.starts_with(armored) {
        return Err(LockerError::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::ArmoringInvalid,
            "input size smaller than magic marker; likely truncated",
        ));
    }

    if let Some(encoded) = armored.strip_prefix(V1_MAGIC) {
        URL_SAFE_NO_PAD.decode(encoded).map_err(|e| {
            LockerError::with_kind_and_source(
                ErrorCategory::InputValidation,
                ErrorKind::ArmoringDecode,
                format!("base64 decoding failed: {}", e),
                e,
            )
        })
    } else if armored.starts_with(MAGIC_PREFIX) {
        Err(LockerError::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::ArmoringFromFuture,
            "input claims to be datalocker armor, but not a version we support",
        ))
    } else {
        Err(LockerError::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::ArmoringInvalid,
            "input unrecognized as datalocker armor",
        ))
    }
}

/// Armor a sealed buffer in its `salt || nonce || ciphertext` layout.
pub fn wrap_sealed(sealed: &SealedBuffer) -> String {
    wrap(&sealed.to_bytes())
}

pub fn unwrap_sealed(armored: &str) -> Result<SealedBuffer> {
    SealedBuffer::from_bytes(&unwrap(armored)?)
}
