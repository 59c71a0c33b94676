//! File-level encryption, decryption and in-place update
//!
//! Files go through the stream codec (`encrypt_file`, `decrypt_file`,
//! `update_file`) or the whole-buffer codec plus armor (`seal_file`,
//! `open_file`). Output is always written to a temporary file next to the
//! destination and renamed into place, so the destination holds either its
//! previous contents or the complete new output, never a partial write.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::config::EngineConfig;
use crate::error::{ErrorCategory, ErrorKind, LockerError, Result};
use crate::passphrase::PassphraseReader;
use crate::secretcrypt;
use crate::stream::{self, StreamSummary};
use crate::varmor;

/// Stream-encrypt `input_path` into `output_path`.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
    config: &EngineConfig,
) -> Result<StreamSummary> {
    let mut input = open_input(input_path)?;
    let passphrase = passphrase_reader.read_passphrase()?;

    let summary = write_atomically(output_path, |output| {
        stream::encrypt_stream(&mut input, output, &passphrase, config)
    })
    .map_err(|e| e.with_context("encryption failed"))?;

    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        chunks = summary.chunks,
        bytes = summary.plaintext_bytes,
        "encrypted file"
    );
    Ok(summary)
}

/// Stream-decrypt `input_path` into `output_path`.
///
/// Nothing is left at `output_path` if any chunk fails to authenticate.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
    config: &EngineConfig,
) -> Result<StreamSummary> {
    let mut input = open_input(input_path)?;
    let passphrase = passphrase_reader.read_passphrase()?;

    let summary = write_atomically(output_path, |output| {
        stream::decrypt_stream(&mut input, output, &passphrase, config)
    })
    .map_err(|e| e.with_context("failed to decrypt"))?;

    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        chunks = summary.chunks,
        bytes = summary.plaintext_bytes,
        "decrypted file"
    );
    Ok(summary)
}

/// Replace the contents of the encrypted `crypt_path` with `plain_path`,
/// keeping the passphrase.
///
/// The existing file is fully decrypted (into a sink) first, so a mistyped
/// passphrase is rejected instead of silently re-keying the file.
pub fn update_file(
    plain_path: &Path,
    crypt_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
    config: &EngineConfig,
) -> Result<StreamSummary> {
    let mut existing = open_input(crypt_path)?;
    let passphrase = passphrase_reader.read_passphrase()?;

    stream::decrypt_stream(&mut existing, &mut io::sink(), &passphrase, config)
        .map_err(|e| e.with_context("failed to decrypt"))?;
    drop(existing);
    debug!(path = %crypt_path.display(), "existing file verified");

    let mut input = open_input(plain_path)?;
    let summary = write_atomically(crypt_path, |output| {
        stream::encrypt_stream(&mut input, output, &passphrase, config)
    })
    .map_err(|e| e.with_context("failed to encrypt"))?;

    info!(
        input = %plain_path.display(),
        output = %crypt_path.display(),
        chunks = summary.chunks,
        bytes = summary.plaintext_bytes,
        "updated file"
    );
    Ok(summary)
}

/// Encrypt `input_path` as one sealed buffer and write it armored.
pub fn seal_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
    config: &EngineConfig,
) -> Result<()> {
    let plaintext = fs::read(input_path)
        .map(Zeroizing::new)
        .map_err(|e| read_error(input_path, e))?;
    let passphrase = passphrase_reader.read_passphrase()?;
    let sealed = secretcrypt::encrypt(&passphrase, &plaintext, config)
        .map_err(|e| e.with_context("encryption failed"))?;
    let armored = varmor::wrap_sealed(&sealed);

    write_atomically(output_path, |output| {
        output
            .write_all(armored.as_bytes())
            .map_err(|e| LockerError::io("failed to write armored output", e))
    })?;

    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        bytes = plaintext.len(),
        "sealed file"
    );
    Ok(())
}

/// Decrypt an armored sealed buffer produced by [`seal_file`].
pub fn open_file(
    input_path: &Path,
    output_path: &Path,
    passphrase_reader: &mut dyn PassphraseReader,
    config: &EngineConfig,
) -> Result<()> {
    let armored_bytes = fs::read(input_path).map_err(|e| read_error(input_path, e))?;
    let armored = String::from_utf8(armored_bytes).map_err(|e| {
        LockerError::with_kind_and_source(
            ErrorCategory::InputValidation,
            ErrorKind::ArmoringInvalid,
            "input file is not valid UTF-8",
            e,
        )
    })?;
    let sealed =
        varmor::unwrap_sealed(&armored).map_err(|e| e.with_context("failed to unarmor"))?;
    let passphrase = passphrase_reader.read_passphrase()?;
    let plaintext = secretcrypt::decrypt(&passphrase, &sealed, config)
        .map(Zeroizing::new)
        .map_err(|e| e.with_context("failed to decrypt"))?;

    write_atomically(output_path, |output| {
        output
            .write_all(&plaintext)
            .map_err(|e| LockerError::io("failed to write plaintext", e))
    })?;

    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        bytes = plaintext.len(),
        "opened file"
    );
    Ok(())
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| read_error(path, e))
}

/// Run `write` against a temporary file beside `path`, then move it into place.
///
/// The temporary file is flushed, synced and restricted to mode 0o600 before
/// the rename. On error it is dropped, which deletes it.
fn write_atomically<T, F>(path: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<T>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
        LockerError::io(format!("failed to create tempfile in {}", dir.display()), e)
    })?;
    debug!(temp = %temp_file.path().display(), target = %path.display(), "writing tempfile");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        temp_file
            .as_file()
            .set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|e| LockerError::io("failed to set tempfile permissions", e))?;
    }

    let value = {
        let mut writer = BufWriter::new(temp_file.as_file_mut());
        let value = write(&mut writer)?;
        writer
            .flush()
            .map_err(|e| LockerError::io("failed to flush tempfile", e))?;
        value
    };
    // Sync before the rename so the target never points at unwritten data.
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| LockerError::io("failed to sync file prior to rename", e))?;

    temp_file.persist(path).map_err(|e| {
        LockerError::with_kind_and_source(
            ErrorCategory::Io,
            ErrorKind::Io,
            format!("failed to rename to target file {}", path.display()),
            e,
        )
    })?;
    Ok(value)
}

fn read_error(path: &Path, err: io::Error) -> LockerError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::InputValidation
    } else {
        ErrorCategory::Io
    };
    LockerError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}
