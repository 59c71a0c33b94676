//! The crypto engine: every operation bound to one immutable configuration
//!
//! The engine holds no mutable state. Each call derives its own key and
//! draws its own salt and nonces, so one engine can be shared freely across
//! threads.

use std::io::{Read, Write};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::kdf::{DerivedKey, derive_key_with_iterations};
use crate::random;
use crate::secretcrypt::{self, SealedBuffer};
use crate::stream::{self, StreamSummary};
use crate::{NONCE_SIZE, SALT_SIZE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CryptoEngine {
    config: EngineConfig,
}

impl CryptoEngine {
    /// Engine with the default work factor and chunk size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a caller-chosen configuration, validated up-front.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn derive_key(&self, password: &[u8], salt: &[u8]) -> Result<DerivedKey> {
        derive_key_with_iterations(password, salt, self.config.iterations)
    }

    pub fn generate_salt(&self) -> Result<[u8; SALT_SIZE]> {
        random::generate_salt()
    }

    pub fn generate_nonce(&self) -> Result<[u8; NONCE_SIZE]> {
        random::generate_nonce()
    }

    pub fn encrypt(&self, plaintext: &[u8], password: &[u8]) -> Result<SealedBuffer> {
        secretcrypt::encrypt(password, plaintext, &self.config)
    }

    pub fn decrypt(&self, sealed: &SealedBuffer, password: &[u8]) -> Result<Vec<u8>> {
        secretcrypt::decrypt(password, sealed, &self.config)
    }

    pub fn encrypt_stream<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
        password: &[u8],
    ) -> Result<StreamSummary>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        stream::encrypt_stream(input, output, password, &self.config)
    }

    pub fn decrypt_stream<R, W>(
        &self,
        input: &mut R,
        output: &mut W,
        password: &[u8],
    ) -> Result<StreamSummary>
    where
        R: Read + ?Sized,
        W: Write + ?Sized,
    {
        stream::decrypt_stream(input, output, password, &self.config)
    }
}
