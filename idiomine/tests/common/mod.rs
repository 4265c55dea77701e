use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::{Path, PathBuf};

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).unwrap()
}

pub fn idiomine() -> assert_cmd::Command {
    cargo_bin_cmd!("idiomine")
}

/// Write revision entries `(id, prev, updated)` as newline-delimited JSON.
pub fn write_revisions(path: &Path, entries: &[(&str, &str, &str)]) {
    let lines: Vec<String> = entries
        .iter()
        .map(|(id, prev, updated)| {
            serde_json::json!({"id": id, "prev_file": prev, "updated_file": updated}).to_string()
        })
        .collect();
    fs::write(path, lines.join("\n") + "\n").unwrap();
}
