//! Engine configuration
//!
//! The work factor and stream chunk size are fixed per artifact. Decryption
//! must use the iteration count that was used at encryption time, so callers
//! that vary it persist it alongside the ciphertext (see
//! [`crate::metadata::EncryptionMetadata`]).

use crate::error::{ErrorCategory, ErrorKind, LockerError, Result};
use crate::{CHUNK_SIZE, DEFAULT_ITERATIONS, MAX_CHUNK_SIZE, MAX_ITERATIONS, MIN_ITERATIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// PBKDF2-HMAC-SHA256 iteration count
    pub iterations: u32,
    /// Plaintext bytes sealed per stream chunk (the final chunk may be shorter)
    pub chunk_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            chunk_size: CHUNK_SIZE,
        }
    }
}

impl EngineConfig {
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Check that the configuration can be used for encryption or decryption.
    pub fn validate(&self) -> Result<()> {
        validate_iterations(self.iterations)?;
        if self.chunk_size == 0 {
            return Err(LockerError::with_kind(
                ErrorCategory::InputValidation,
                ErrorKind::InvalidChunkSize,
                "stream chunk size must be greater than zero",
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(LockerError::with_kind(
                ErrorCategory::InputValidation,
                ErrorKind::ChunkTooLarge,
                format!(
                    "stream chunk size {} exceeds maximum {}",
                    self.chunk_size, MAX_CHUNK_SIZE
                ),
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_iterations(iterations: u32) -> Result<()> {
    if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&iterations) {
        return Err(LockerError::with_kind(
            ErrorCategory::InputValidation,
            ErrorKind::InvalidIterations,
            format!(
                "iteration count {} outside supported range {}..={}",
                iterations, MIN_ITERATIONS, MAX_ITERATIONS
            ),
        ));
    }
    Ok(())
}
