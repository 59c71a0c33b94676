//! Chunked stream encryption/decryption
//!
//! One salt and one derived key per stream; one fresh random nonce per
//! chunk. Each chunk is sealed independently, so a reader can authenticate
//! and emit chunk N before chunk N+1 has arrived.
//!
//! The wire format is:
//! - salt: 32 bytes, written once
//! - repeated until end of input:
//!   - nonce: 12 bytes
//!   - length: 4 bytes (big-endian u32, length of the sealed chunk)
//!   - sealed chunk: `length` bytes (ciphertext + 16-byte GCM tag)
//!
//! There is no end marker. A stream is complete when the input ends exactly
//! at a chunk boundary. Output already written when an error occurs is left
//! in the sink; callers must discard it.

use std::io::{self, Read, Write};

use zeroize::Zeroizing;

use crate::config::EngineConfig;
use crate::error::{ErrorCategory, ErrorKind, LockerError, Result};
use crate::kdf::derive_key_with_iterations;
use crate::random::{generate_nonce, generate_salt};
use crate::secretcrypt::{new_cipher, open, seal};
use crate::{CHUNK_LEN_SIZE, NONCE_SIZE, SALT_SIZE};

/// Counters describing one completed stream operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamSummary {
    /// Number of chunk records written or read
    pub chunks: u64,
    /// Plaintext bytes consumed (encrypt) or produced (decrypt)
    pub plaintext_bytes: u64,
    /// Framed bytes produced (encrypt) or consumed (decrypt), salt included
    pub framed_bytes: u64,
}

/// Encrypt everything readable from `input` into `output`.
///
/// An empty password is rejected before `input` is touched. An empty input
/// produces just the 32-byte salt.
pub fn encrypt_stream<R, W>(
    input: &mut R,
    output: &mut W,
    password: &[u8],
    config: &EngineConfig,
) -> Result<StreamSummary>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if password.is_empty() {
        return Err(LockerError::empty_password());
    }
    config.validate()?;

    let salt = generate_salt()?;
    let key = derive_key_with_iterations(password, &salt, config.iterations)?;
    let cipher = new_cipher(&key);

    output
        .write_all(&salt)
        .map_err(|e| LockerError::io("failed to write salt", e))?;

    let mut summary = StreamSummary {
        framed_bytes: SALT_SIZE as u64,
        ..StreamSummary::default()
    };
    let mut buffer = Zeroizing::new(vec![0u8; config.chunk_size]);

    loop {
        let n = fill_chunk(input, &mut buffer)?;
        if n == 0 {
            break;
        }

        let nonce = generate_nonce()?;
        let sealed = seal(&cipher, &nonce, &buffer[..n])?;
        let sealed_len = sealed_chunk_len(sealed.len())?;

        output
            .write_all(&nonce)
            .map_err(|e| LockerError::io("failed to write chunk nonce", e))?;
        output
            .write_all(&sealed_len.to_be_bytes())
            .map_err(|e| LockerError::io("failed to write chunk length", e))?;
        output
            .write_all(&sealed)
            .map_err(|e| LockerError::io("failed to write sealed chunk", e))?;
        output
            .flush()
            .map_err(|e| LockerError::io("failed to flush output", e))?;

        summary.chunks += 1;
        summary.plaintext_bytes += n as u64;
        summary.framed_bytes += (NONCE_SIZE + CHUNK_LEN_SIZE + sealed.len()) as u64;

        // A short fill means the input already reported end-of-data.
        if n < buffer.len() {
            break;
        }
    }

    Ok(summary)
}

/// Decrypt a stream produced by [`encrypt_stream`] from `input` into `output`.
///
/// Each chunk is authenticated and written before the next one is read, so
/// at most one chunk of plaintext is held in memory.
pub fn decrypt_stream<R, W>(
    input: &mut R,
    output: &mut W,
    password: &[u8],
    config: &EngineConfig,
) -> Result<StreamSummary>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if password.is_empty() {
        return Err(LockerError::empty_password());
    }
    config.validate()?;

    let mut salt = [0u8; SALT_SIZE];
    let n = read_full(input, &mut salt).map_err(|e| LockerError::io("failed to read salt", e))?;
    if n < SALT_SIZE {
        return Err(LockerError::with_kind(
            ErrorCategory::Framing,
            ErrorKind::SaltReadFailed,
            format!(
                "failed to read salt: stream truncated after {} of {} bytes",
                n, SALT_SIZE
            ),
        ));
    }

    let key = derive_key_with_iterations(password, &salt, config.iterations)?;
    let cipher = new_cipher(&key);

    let mut summary = StreamSummary {
        framed_bytes: SALT_SIZE as u64,
        ..StreamSummary::default()
    };
    let mut sealed = Vec::new();

    loop {
        let mut nonce = [0u8; NONCE_SIZE];
        let n = read_full(input, &mut nonce)
            .map_err(|e| LockerError::io("failed to read chunk nonce", e))?;
        if n == 0 {
            break;
        }
        if n < NONCE_SIZE {
            return Err(LockerError::with_kind(
                ErrorCategory::Framing,
                ErrorKind::CorruptNonce,
                format!(
                    "corrupt stream: chunk {} has a partial nonce of {} bytes",
                    summary.chunks, n
                ),
            ));
        }

        let mut len_bytes = [0u8; CHUNK_LEN_SIZE];
        let n = read_full(input, &mut len_bytes)
            .map_err(|e| LockerError::io("failed to read chunk length", e))?;
        if n < CHUNK_LEN_SIZE {
            return Err(truncated_chunk(summary.chunks, "length"));
        }
        let sealed_len = u32::from_be_bytes(len_bytes) as u64;

        // Grow the buffer as data arrives rather than trusting the length up-front.
        sealed.clear();
        let n = (&mut *input)
            .take(sealed_len)
            .read_to_end(&mut sealed)
            .map_err(|e| LockerError::io("failed to read sealed chunk", e))?;
        if (n as u64) < sealed_len {
            return Err(truncated_chunk(summary.chunks, "body"));
        }

        let plaintext = Zeroizing::new(open(&cipher, &nonce, &sealed)?);
        output
            .write_all(&plaintext)
            .map_err(|e| LockerError::io("failed to write decrypted chunk", e))?;
        output
            .flush()
            .map_err(|e| LockerError::io("failed to flush output", e))?;

        summary.chunks += 1;
        summary.plaintext_bytes += plaintext.len() as u64;
        summary.framed_bytes += (NONCE_SIZE + CHUNK_LEN_SIZE) as u64 + sealed_len;
    }

    Ok(summary)
}

/// Convert a sealed chunk length to its 32-bit length prefix.
fn sealed_chunk_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        LockerError::with_kind(
            ErrorCategory::Framing,
            ErrorKind::ChunkTooLarge,
            format!("sealed chunk too large: {} bytes", len),
        )
    })
}

fn truncated_chunk(index: u64, part: &str) -> LockerError {
    LockerError::with_kind(
        ErrorCategory::Framing,
        ErrorKind::TruncatedChunk,
        format!("truncated stream: chunk {} {} is incomplete", index, part),
    )
}

/// Fill `buf` from `input`, stopping early only at end-of-data.
fn fill_chunk<R: Read + ?Sized>(input: &mut R, buf: &mut [u8]) -> Result<usize> {
    read_full(input, buf).map_err(|e| LockerError::io("failed to read input", e))
}

/// Read until `buf` is full or the input ends. Returns the number of bytes read.
fn read_full<R: Read + ?Sized>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
