//! Passphrase sources for the file operations and the CLI
//!
//! Passphrases are arbitrary bytes, never assumed to be UTF-8. Every source
//! hands them out wrapped in `Zeroizing` so each copy is wiped on drop.

use std::io::{self, IsTerminal, Read, Write};

use zeroize::Zeroizing;

use crate::error::{ErrorCategory, ErrorKind, LockerError, Result};

pub trait PassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

/// A passphrase known up-front, e.g. supplied by an embedding application.
pub struct ConstantPassphraseReader {
    passphrase: Zeroizing<Vec<u8>>,
}

impl ConstantPassphraseReader {
    pub fn new(passphrase: impl Into<Vec<u8>>) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.into()),
        }
    }
}

impl PassphraseReader for ConstantPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        Ok(self.passphrase.clone())
    }
}

/// Reads everything from a byte source, such as stdin with `--passphrase-stdin`.
///
/// The bytes are taken verbatim: a trailing newline is part of the passphrase.
pub struct ReaderPassphraseReader<R> {
    reader: R,
}

impl<R: Read> ReaderPassphraseReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> PassphraseReader for ReaderPassphraseReader<R> {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader
            .read_to_end(&mut data)
            .map_err(|e| LockerError::io(format!("error reading passphrase: {}", e), e))?;
        Ok(data)
    }
}

/// Prompts on stderr and reads from the terminal without echo.
///
/// Terminal input is limited to UTF-8 by rpassword; non-UTF-8 passphrases
/// have to come through [`ReaderPassphraseReader`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPassphraseReader;

impl PassphraseReader for TerminalPassphraseReader {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(LockerError::with_kind(
                ErrorCategory::InputValidation,
                ErrorKind::PassphraseUnavailable,
                "cannot read passphrase from terminal: stdin is not a terminal \
                 (use --passphrase-stdin)",
            ));
        }

        {
            let mut stderr = io::stderr().lock();
            stderr
                .write_all(b"Passphrase (datalocker): ")
                .and_then(|()| stderr.flush())
                .map_err(|e| LockerError::io(format!("failed to write prompt: {}", e), e))?;
        }

        let passphrase = rpassword::read_password().map_err(|e| {
            LockerError::with_kind_and_source(
                ErrorCategory::Io,
                ErrorKind::PassphraseUnavailable,
                format!("failure reading passphrase: {}", e),
                e,
            )
        })?;
        Ok(Zeroizing::new(passphrase.into_bytes()))
    }
}

/// Asks `upstream` at most once and replays the answer afterwards.
///
/// Failures are not cached, so a later call asks again.
pub struct CachingPassphraseReader<P> {
    upstream: P,
    cached: Option<Zeroizing<Vec<u8>>>,
}

impl<P: PassphraseReader> CachingPassphraseReader<P> {
    pub fn new(upstream: P) -> Self {
        Self {
            upstream,
            cached: None,
        }
    }
}

impl<P: PassphraseReader> PassphraseReader for CachingPassphraseReader<P> {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if let Some(cached) = &self.cached {
            return Ok(cached.clone());
        }
        let passphrase = self.upstream.read_passphrase()?;
        self.cached = Some(passphrase.clone());
        Ok(passphrase)
    }
}

impl<P: PassphraseReader + ?Sized> PassphraseReader for Box<P> {
    fn read_passphrase(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        (**self).read_passphrase()
    }
}
