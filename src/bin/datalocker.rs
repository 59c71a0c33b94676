//! DataLocker CLI - passphrase-based file encryption
//!
//! Command-line front end for the AES-256-GCM engine with PBKDF2-SHA256
//! key derivation.

use std::error::Error as StdError;
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use datalocker::passphrase::{PassphraseReader, ReaderPassphraseReader, TerminalPassphraseReader};
use datalocker::{CHUNK_SIZE, DEFAULT_ITERATIONS, EngineConfig, LockerError, file_ops};

#[derive(Parser)]
#[command(name = "datalocker")]
#[command(version)]
#[command(about = "Passphrase-based file encryption.", long_about = None)]
struct Cli {
    /// Read passphrase from stdin instead of from terminal
    #[arg(long, global = true)]
    passphrase_stdin: bool,

    /// PBKDF2 iteration count (must match the value used to encrypt)
    #[arg(long, global = true, env = "DATALOCKER_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
    iterations: u32,

    /// Plaintext bytes per stream chunk when encrypting
    #[arg(long, global = true, env = "DATALOCKER_CHUNK_SIZE", default_value_t = CHUNK_SIZE)]
    chunk_size: usize,

    /// Log progress to stderr (-v for info, -vv for debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file as a chunked stream
    #[command(alias = "e")]
    Encrypt {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the encrypted stream to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt a chunked stream file
    #[command(alias = "d")]
    Decrypt {
        /// Path to the file whose contents is to be decrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the file to write the unencrypted text to
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Update an encrypted file with new content, while validating
    /// that the passphrase is not accidentally changed.
    #[command(alias = "u")]
    Update {
        /// Path to the file whose contents is to be encrypted
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Path to the existing encrypted file to replace
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Encrypt a file in one piece and write it as armored text
    #[command(alias = "s")]
    Seal {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Decrypt armored text produced by `seal`
    #[command(alias = "o")]
    Open {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", error_chain(&e));
        process::exit(1);
    }
}

fn run(cli: Cli) -> datalocker::Result<()> {
    let config = EngineConfig::default()
        .with_iterations(cli.iterations)
        .with_chunk_size(cli.chunk_size);
    config.validate()?;

    let mut reader = get_passphrase_reader(cli.passphrase_stdin);
    let reader = &mut *reader;
    match cli.command {
        Commands::Encrypt { input, output } => {
            file_ops::encrypt_file(&input, &output, reader, &config).map(drop)
        }
        Commands::Decrypt { input, output } => {
            file_ops::decrypt_file(&input, &output, reader, &config).map(drop)
        }
        Commands::Update { input, output } => {
            file_ops::update_file(&input, &output, reader, &config).map(drop)
        }
        Commands::Seal { input, output } => file_ops::seal_file(&input, &output, reader, &config),
        Commands::Open { input, output } => file_ops::open_file(&input, &output, reader, &config),
    }
}

fn get_passphrase_reader(use_stdin: bool) -> Box<dyn PassphraseReader> {
    if use_stdin {
        Box::new(ReaderPassphraseReader::new(std::io::stdin()))
    } else {
        Box::new(TerminalPassphraseReader)
    }
}

// Logs go to stderr; RUST_LOG overrides the -v level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn error_chain(err: &LockerError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
