//! CLI integration tests
//!
//! Runs the `datalocker` binary end-to-end with the passphrase on stdin.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Run datalocker with passphrase from stdin
fn run_datalocker(args: &[&str], passphrase: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_datalocker"))
        .arg("--passphrase-stdin")
        .args(args)
        .env_remove("DATALOCKER_ITERATIONS")
        .env_remove("DATALOCKER_CHUNK_SIZE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn datalocker");

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        // The command may exit before reading stdin (e.g. file not found).
        let _ = stdin.write_all(passphrase.as_bytes());
    }

    child.wait_with_output().expect("failed to wait for datalocker")
}

/// Run one subcommand over `input` and `output` paths.
fn run_command(command: &str, input: &Path, output: &Path, passphrase: &str) -> Output {
    run_datalocker(
        &[
            command,
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        passphrase,
    )
}

fn assert_success(output: &Output, what: &str) {
    assert!(
        output.status.success(),
        "{} failed: {}",
        what,
        String::from_utf8_lossy(&output.stderr)
    );
}

fn testdata_path(filename: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("testdata");
    path.push(filename);
    path
}

#[test]
fn test_decrypt_known_stream() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("hello-decrypted.txt");

    let result = run_command("decrypt", &testdata_path("hello.txt.locker"), &output, "test");
    assert_success(&result, "decrypt");

    let decrypted = fs::read_to_string(&output).unwrap();
    let expected = fs::read_to_string(testdata_path("hello.txt")).unwrap();
    assert_eq!(decrypted, expected);
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext_path = testdata_path("hello.txt");
    let encrypted_path = temp_dir.path().join("hello.txt.locker");
    let decrypted_path = temp_dir.path().join("hello-decrypted.txt");

    let result = run_command("encrypt", &plaintext_path, &encrypted_path, "test");
    assert_success(&result, "encrypt");
    // salt + one chunk header + 19 bytes + tag
    assert_eq!(fs::metadata(&encrypted_path).unwrap().len(), 32 + 16 + 19 + 16);

    let result = run_command("d", &encrypted_path, &decrypted_path, "test");
    assert_success(&result, "decrypt");

    assert_eq!(
        fs::read(&plaintext_path).unwrap(),
        fs::read(&decrypted_path).unwrap()
    );
}

#[test]
fn test_chunk_size_flag() {
    let temp_dir = TempDir::new().unwrap();
    let encrypted = temp_dir.path().join("alphanumeric.txt.locker");
    let decrypted = temp_dir.path().join("alphanumeric.txt");

    let result = run_datalocker(
        &[
            "--chunk-size",
            "16",
            "encrypt",
            "-i",
            testdata_path("alphanumeric.txt").to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "encrypt");
    assert_eq!(fs::metadata(&encrypted).unwrap().len(), 164);

    let result = run_command("decrypt", &encrypted, &decrypted, "test");
    assert_success(&result, "decrypt");
    assert_eq!(fs::read(&decrypted).unwrap(), b"0123456789abcdefghijklmnopqrstuvwxyz");
}

#[test]
fn test_iterations_must_match() {
    let temp_dir = TempDir::new().unwrap();
    let encrypted = temp_dir.path().join("hello.txt.locker");
    let decrypted = temp_dir.path().join("hello.txt");

    let result = run_datalocker(
        &[
            "--iterations",
            "150000",
            "e",
            "-i",
            testdata_path("hello.txt").to_str().unwrap(),
            "-o",
            encrypted.to_str().unwrap(),
        ],
        "test",
    );
    assert_success(&result, "encrypt");

    let result = run_command("decrypt", &encrypted, &decrypted, "test");
    assert!(!result.status.success());
    assert!(!decrypted.exists());
}

#[test]
fn test_iterations_below_minimum_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let result = run_datalocker(
        &[
            "--iterations",
            "1000",
            "encrypt",
            "-i",
            testdata_path("hello.txt").to_str().unwrap(),
            "-o",
            temp_dir.path().join("out.locker").to_str().unwrap(),
        ],
        "test",
    );

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.starts_with("Error: "), "got: {}", stderr);
    assert!(stderr.contains("iteration"), "got: {}", stderr);
}

#[test]
fn test_chunk_size_above_maximum_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.locker");
    let result = run_datalocker(
        &[
            "--chunk-size",
            &usize::MAX.to_string(),
            "encrypt",
            "-i",
            testdata_path("hello.txt").to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ],
        "test",
    );

    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.starts_with("Error: "), "got: {}", stderr);
    assert!(stderr.contains("chunk size"), "got: {}", stderr);
    assert!(!output.exists());
}

#[test]
fn test_update_operation() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext1 = temp_dir.path().join("plaintext1.txt");
    let plaintext2 = temp_dir.path().join("plaintext2.txt");
    let encrypted = temp_dir.path().join("encrypted.locker");
    let decrypted = temp_dir.path().join("decrypted.txt");

    fs::write(&plaintext1, "Original content").unwrap();
    assert_success(&run_command("encrypt", &plaintext1, &encrypted, "test"), "encrypt");

    fs::write(&plaintext2, "Updated content").unwrap();
    assert_success(&run_command("u", &plaintext2, &encrypted, "test"), "update");

    assert_success(&run_command("decrypt", &encrypted, &decrypted, "test"), "decrypt");
    assert_eq!(fs::read_to_string(&decrypted).unwrap(), "Updated content");
}

#[test]
fn test_update_with_wrong_passphrase_fails() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext1 = temp_dir.path().join("plaintext1.txt");
    let plaintext2 = temp_dir.path().join("plaintext2.txt");
    let encrypted = temp_dir.path().join("encrypted.locker");

    fs::write(&plaintext1, "Original").unwrap();
    assert_success(
        &run_command("encrypt", &plaintext1, &encrypted, "correct_password"),
        "encrypt",
    );
    let before = fs::read(&encrypted).unwrap();

    fs::write(&plaintext2, "Updated").unwrap();
    let result = run_command("update", &plaintext2, &encrypted, "wrong_password");

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("wrong password or corrupted data"),
        "Expected decryption failure message, got: {}",
        stderr
    );
    assert_eq!(fs::read(&encrypted).unwrap(), before);
}

#[test]
fn test_seal_open_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let sealed = temp_dir.path().join("hello.txt.armored");
    let opened = temp_dir.path().join("hello-opened.txt");

    assert_success(
        &run_command("seal", &testdata_path("hello.txt"), &sealed, "test"),
        "seal",
    );
    let armored = fs::read_to_string(&sealed).unwrap();
    assert!(armored.starts_with("datalocker1:"), "got: {}", armored);

    assert_success(&run_command("o", &sealed, &opened, "test"), "open");
    assert_eq!(
        fs::read(&opened).unwrap(),
        fs::read(testdata_path("hello.txt")).unwrap()
    );
}

#[test]
fn test_open_with_wrong_passphrase_fails() {
    let temp_dir = TempDir::new().unwrap();
    let sealed = temp_dir.path().join("hello.txt.armored");
    let opened = temp_dir.path().join("hello-opened.txt");

    assert_success(
        &run_command("s", &testdata_path("hello.txt"), &sealed, "right"),
        "seal",
    );
    let result = run_command("open", &sealed, &opened, "wrong");

    assert_eq!(result.status.code(), Some(1));
    assert!(!opened.exists());
}

#[test]
fn test_decrypt_nonexistent_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let nonexistent = temp_dir.path().join("nonexistent.locker");
    let output = temp_dir.path().join("output.txt");

    let result = run_command("decrypt", &nonexistent, &output, "test");

    assert!(!result.status.success());
    assert!(!output.exists());
}

#[test]
fn test_empty_passphrase_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.locker");

    let result = run_command("encrypt", &testdata_path("hello.txt"), &output, "");

    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("password is required"));
    assert!(!output.exists());
}

#[test]
fn test_large_file_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let plaintext = temp_dir.path().join("large.bin");
    let encrypted = temp_dir.path().join("large.bin.locker");
    let decrypted = temp_dir.path().join("large-decrypted.bin");

    // Two full chunks and a partial third
    let large_content: Vec<u8> = (0..2 * 1024 * 1024 + 100).map(|i| i as u8).collect();
    fs::write(&plaintext, &large_content).unwrap();

    assert_success(&run_command("encrypt", &plaintext, &encrypted, "test"), "encrypt");
    assert_eq!(
        fs::metadata(&encrypted).unwrap().len(),
        32 + 3 * (12 + 4 + 16) + large_content.len() as u64
    );

    assert_success(&run_command("decrypt", &encrypted, &decrypted, "test"), "decrypt");
    assert_eq!(fs::read(&decrypted).unwrap(), large_content);
}
