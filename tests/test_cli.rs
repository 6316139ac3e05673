mod fixtures;

use fixtures::*;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::process::Command;
use tempfile::tempdir;

fn hexlayout_dump() -> Command {
    Command::new(assert_cmd::cargo_bin!("hexlayout_dump"))
}

#[test]
fn it_dumps_a_plain_file() {
    let sample = mbr_sample();

    let mut cmd = hexlayout_dump();
    cmd.arg(sample.to_str().unwrap());

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("0x00000000: FA  33  C0  8E"))
        .stdout(predicate::str::contains("0x000001f0: "))
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn it_respects_directory_output() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("nested").join("test.out");

    let sample = mbr_sample();

    let mut cmd = hexlayout_dump();
    cmd.args(["--mbr", "-f", &f.to_string_lossy(), sample.to_str().unwrap()]);

    assert!(
        cmd.output().unwrap().stdout.is_empty(),
        "Expected output to be printed to file, but was printed to stdout"
    );

    let mut expected = vec![];

    File::open(&f).unwrap().read_to_end(&mut expected).unwrap();
    assert!(!expected.is_empty(), "Expected output to be printed to file")
}

#[test]
fn test_it_refuses_to_overwrite_directory() {
    let d = tempdir().unwrap();

    let sample = mbr_sample();
    let mut cmd = hexlayout_dump();
    cmd.args(["-f", &d.path().to_string_lossy(), sample.to_str().unwrap()]);

    cmd.assert().failure().code(1);
}

#[test]
fn test_it_overwrites_file_anyways_if_passed_flag() {
    let d = tempdir().unwrap();
    let f = d.as_ref().join("test.out");

    let mut file = File::create(&f).unwrap();
    file.write_all(b"I'm a file!").unwrap();

    let sample = mbr_sample();
    let mut cmd = hexlayout_dump();
    cmd.args([
        "-f",
        &f.to_string_lossy(),
        "--no-confirm-overwrite",
        sample.to_str().unwrap(),
    ]);

    cmd.assert().success();

    let written = fs::read_to_string(&f).unwrap();
    assert!(written.starts_with("0x00000000: "), "Expected the dump to replace the file");
}

#[test]
fn it_supports_stdin_input_with_dash() {
    let sample = mbr_sample();

    let out_file = hexlayout_dump()
        .args(["--mbr", "-o", "json", sample.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(out_file.status.success(), "expected file-input run to succeed");

    let mut cmd_stdin = hexlayout_dump();
    cmd_stdin.args(["--mbr", "-o", "json", "-"]);
    cmd_stdin.stdin(File::open(&sample).unwrap());
    let out_stdin = cmd_stdin.output().unwrap();

    assert!(out_stdin.status.success(), "expected stdin-input run to succeed");
    assert_eq!(
        out_stdin.stdout, out_file.stdout,
        "stdin and file input should produce identical output"
    );
}

#[test]
fn it_highlights_hex_input_with_a_pattern() {
    let mut cmd = hexlayout_dump();
    cmd.args([
        "--hex",
        "-p",
        header_pattern().to_str().unwrap(),
        "-o",
        "json",
        header_hex().to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"Header.magic\""))
        .stdout(predicate::str::contains("\"label\": \"main.checksum\""));
}

#[test]
fn it_renders_html() {
    let mut cmd = hexlayout_dump();
    cmd.args([
        "--hex",
        "-p",
        header_pattern().to_str().unwrap(),
        "-o",
        "html",
        header_hex().to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("<div class=\"hexlayout-highlighted\">"))
        .stdout(predicate::str::contains("Header.version (u16)"))
        .stdout(predicate::str::ends_with("</style>"));
}

#[test]
fn it_colors_ansi_output() {
    let mut cmd = hexlayout_dump();
    cmd.args(["--mbr", "-o", "ansi", mbr_sample().to_str().unwrap()]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\x1b[48;2;255;182;193m"));
}

#[test]
fn it_uses_offset_as_display_base() {
    let mut cmd = hexlayout_dump();
    cmd.args([
        "--offset",
        "496",
        "--length",
        "16",
        mbr_sample().to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("0x000001f0: "))
        .stdout(predicate::str::contains("55  AA"));
}

#[test]
fn it_selects_a_root_structure() {
    let mut cmd = hexlayout_dump();
    cmd.args([
        "--hex",
        "-p",
        header_pattern().to_str().unwrap(),
        "-r",
        "Entry",
        "-o",
        "json",
        header_hex().to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"Entry.offset\""))
        .stdout(predicate::str::contains("Header.magic").not());
}

#[test]
fn it_warns_about_skipped_statements() {
    let mut cmd = hexlayout_dump();
    cmd.args([
        "-p",
        unsupported_pattern().to_str().unwrap(),
        mbr_sample().to_str().unwrap(),
    ]);

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("warning:"));
}

#[test]
fn it_rejects_pattern_together_with_mbr() {
    let mut cmd = hexlayout_dump();
    cmd.args([
        "--mbr",
        "-p",
        header_pattern().to_str().unwrap(),
        mbr_sample().to_str().unwrap(),
    ]);

    cmd.assert().failure();
}

#[test]
fn it_fails_on_a_missing_input() {
    let d = tempdir().unwrap();
    let missing = d.path().join("missing.bin");

    let mut cmd = hexlayout_dump();
    cmd.arg(missing.to_str().unwrap());

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to open file"));
}
