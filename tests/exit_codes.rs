use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use zip::write::SimpleFileOptions;

fn deobf_index() -> String {
    std::env::var("CARGO_BIN_EXE_deobf-index").unwrap_or_else(|_| {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("target");
        path.push("debug");
        path.push("deobf-index");
        if cfg!(windows) {
            path.set_extension("exe");
        }
        path.to_string_lossy().to_string()
    })
}

#[test]
fn deobf_index_exits_non_zero_on_missing_input() {
    let output = Command::new(deobf_index())
        .arg("--input")
        .arg("missing.jar")
        .arg("--quiet")
        .output()
        .expect("run deobf-index");

    assert!(!output.status.success());
}

#[test]
fn undecodable_entries_are_reported_not_fatal() {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let jar_path = temp_dir.path().join("input.jar");
    let file = fs::File::create(&jar_path).expect("create jar");
    let mut writer = zip::ZipWriter::new(file);
    writer
        .start_file("bad.class", SimpleFileOptions::default())
        .expect("start entry");
    writer.write_all(b"nope").expect("write entry");
    writer.finish().expect("finish jar");

    let output = Command::new(deobf_index())
        .arg("--input")
        .arg(&jar_path)
        .arg("--format")
        .arg("sarif")
        .arg("--quiet")
        .output()
        .expect("run deobf-index");

    assert!(output.status.success());
    let sarif: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("parse SARIF output");
    let results = sarif["runs"][0]["results"]
        .as_array()
        .expect("results array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["ruleId"], "DECODE_FAILURE");
    assert_eq!(
        results[0]["locations"][0]["physicalLocation"]["artifactLocation"]["uri"],
        "bad.class"
    );
}
