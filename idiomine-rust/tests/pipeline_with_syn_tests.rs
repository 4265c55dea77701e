//! End-to-end mining tests driving the language-neutral pipeline with the
//! syn-based frontend.

use idiomine_core::config::Config;
use idiomine_core::pipeline::Miner;
use idiomine_core::record::{ChangeRecord, RevisionEntry};
use idiomine_rust::RustFrontend;

// ── Helpers ───────────────────────────────────────────────────────────────

const PREV: &str = "fn main() {\n    let a = 1;\n    let b = a + 1;\n    let c = b;\n}\n";

fn entry(prev: &str, updated: &str) -> RevisionEntry {
    RevisionEntry {
        id: "rev".into(),
        prev_file: prev.into(),
        updated_file: updated.into(),
        message: Some("Use subtraction".into()),
    }
}

fn mine(prev: &str, updated: &str) -> Vec<ChangeRecord> {
    let frontend = RustFrontend::new();
    let miner = Miner::new(&frontend, Config::default());
    miner.process_revision(&entry(prev, updated)).unwrap()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// ── Record assembly ───────────────────────────────────────────────────────

#[test]
fn operator_change_yields_one_record() {
    let records = mine(PREV, &PREV.replace("a + 1", "a - 1"));
    assert_eq!(records.len(), 1);
    let record = &records[0];

    assert_eq!(record.id, "rev_0");
    assert_eq!(record.prev_code_chunk, "let VAR0 = VAR1 + 1;");
    assert_eq!(record.updated_code_chunk, "let VAR0 = VAR1 - 1;");
    assert_eq!(
        record.prev_code_chunk_tokens,
        strings(&["let", "VAR0", "=", "VAR1", "+", "1", ";"])
    );
    assert_eq!(
        record.updated_code_chunk_tokens,
        strings(&["let", "VAR0", "=", "VAR1", "-", "1", ";"])
    );
    assert_eq!(
        record.preceding_context,
        strings(&["fn", "main", "(", ")", "{", "let", "VAR1", "=", "1", ";"])
    );
    assert_eq!(
        record.succeeding_context,
        strings(&["let", "VAR2", "=", "VAR0", ";", "}"])
    );
    assert!(record.commit_message.is_none());
}

#[test]
fn exported_tree_carries_token_positions() {
    let records = mine(PREV, &PREV.replace("a + 1", "a - 1"));
    let ast = &records[0].prev_code_ast;
    assert_eq!(ast["Constructor"], "Block");
    let local = &ast["Fields"]["stmts"][0];
    assert_eq!(local["Constructor"], "LocalStmt");
    assert_eq!(local["Fields"]["let_token"]["Value"], "let");
    assert_eq!(local["Fields"]["let_token"]["Position"], 0);
    let op = &local["Fields"]["init"]["Fields"]["op"];
    assert_eq!(op["Value"], "+");
    assert_eq!(op["Position"], 4);
    assert!(local["Fields"]["diverge"].is_null());
}

#[test]
fn literal_only_change_yields_nothing() {
    let prev = "fn main() {\n    let a = 2;\n    let b = a;\n}\n";
    let records = mine(prev, &prev.replace('2', "9"));
    assert!(records.is_empty());
}

#[test]
fn renaming_a_local_yields_nothing() {
    let updated = PREV.replace('b', "total");
    assert!(mine(PREV, &updated).is_empty());
}

#[test]
fn item_level_changes_are_not_mined() {
    let prev = "struct S {\n    a: u8,\n}\n";
    let updated = "struct S {\n    a: u16,\n}\n";
    assert!(mine(prev, updated).is_empty());
}

#[test]
fn commit_message_is_opt_in() {
    let frontend = RustFrontend::new();
    let config = Config {
        include_commit_message: true,
        ..Config::default()
    };
    let miner = Miner::new(&frontend, config);
    let records = miner
        .process_revision(&entry(PREV, &PREV.replace("a + 1", "a * 1")))
        .unwrap();
    assert_eq!(records[0].commit_message.as_deref(), Some("Use subtraction"));
}

#[test]
fn unparseable_revision_is_an_error() {
    let frontend = RustFrontend::new();
    let miner = Miner::new(&frontend, Config::default());
    let err = miner
        .process_revision(&entry("fn main( {", PREV))
        .unwrap_err();
    assert!(err.to_string().contains("prev"), "{err}");
}

#[test]
fn run_writes_one_json_line_per_record() {
    let frontend = RustFrontend::new();
    let miner = Miner::new(&frontend, Config::default());
    let line = serde_json::json!({
        "id": "r1",
        "prev_file": PREV,
        "updated_file": PREV.replace("a + 1", "a - 1"),
    });
    let input = format!("{line}\n{line}\n");
    let mut out = Vec::new();
    let summary = miner.run(input.as_bytes(), &mut out).unwrap();
    assert_eq!(summary.revisions, 2);
    assert_eq!(summary.records, 2);
    let text = String::from_utf8(out).unwrap();
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first["Id"], "r1_0");
    assert_eq!(first["PrevCodeChunk"], "let VAR0 = VAR1 + 1;");
    assert!(first.get("CommitMessage").is_none());
}
