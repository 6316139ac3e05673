#![allow(dead_code)]
use std::path::PathBuf;

use std::sync::Once;

static LOGGER_INIT: Once = Once::new();

// Rust runs the tests concurrently, so unless we synchronize logging access
// it will crash when attempting to run `cargo test` with some logging facilities.
#[cfg(test)]
pub fn ensure_env_logger_initialized() {
    use std::io::Write;

    LOGGER_INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_default_env();
        builder
            .format(|buf, record| writeln!(buf, "[{}] - {}", record.level(), record.args()))
            .is_test(true)
            .init();
    });
}

pub fn samples_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("samples")
        .canonicalize()
        .unwrap()
}

/// Header plus two directory entries and a checksum, 32 bytes.
pub fn header_pattern() -> PathBuf {
    samples_dir().join("header.hexpat")
}

/// The data `header_pattern` describes, as hex text.
pub fn header_hex() -> PathBuf {
    samples_dir().join("header.hex")
}

/// Mixes supported fields with statements the pattern language does not know.
pub fn unsupported_pattern() -> PathBuf {
    samples_dir().join("unsupported.hexpat")
}

/// A 512 byte boot sector with one partition entry and the `55 AA` signature.
pub fn mbr_sample() -> PathBuf {
    samples_dir().join("mbr.bin")
}

pub fn read_text(path: PathBuf) -> String {
    std::fs::read_to_string(path).unwrap()
}
