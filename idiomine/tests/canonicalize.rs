mod common;

use common::{fixture_path, idiomine};
use predicates::prelude::*;

#[test]
fn canonicalize_renames_and_abstracts() {
    idiomine()
        .arg("canonicalize")
        .arg(fixture_path("scores.rs"))
        .assert()
        .success()
        .stdout(predicate::str::contains("fn total(VAR0: &[u32]) -> u32 {"))
        .stdout(predicate::str::contains("let mut VAR1 = 0;"))
        .stdout(predicate::str::contains("for VAR2 in VAR0 {"))
        .stdout(predicate::str::contains("VAR1 += VAR2 * LITERAL;"));
}

#[test]
fn canonicalize_drops_uses_and_attributes() {
    idiomine()
        .arg("canonicalize")
        .arg(fixture_path("scores.rs"))
        .assert()
        .success()
        .stdout(predicate::str::contains("use ").not())
        .stdout(predicate::str::contains("allow").not())
        .stdout(predicate::str::contains("Sums").not());
}

#[test]
fn canonicalize_reports_syntax_errors() {
    let tmp = tempfile::TempDir::new().unwrap();
    let file = tmp.path().join("broken.rs");
    std::fs::write(&file, "fn f( {").unwrap();
    idiomine()
        .arg("canonicalize")
        .arg(&file)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("rust frontend failed"));
}
