//! End-to-end CLI smoke tests covering spec.md §8 scenarios 5-8 through
//! the compiled binary rather than the library API directly.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn make_fixture() -> assert_fs::TempDir {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("src/lib.rs")
        .write_str("// demo lib\npub fn alpha() {}\nmod inner { pub fn beta() {} }\n")
        .expect("write lib.rs");
    tmp.child("utils/helper.rs")
        .write_str("// helper utils\npub fn gamma() {}\n")
        .expect("write helper.rs");
    tmp.child("README.md").write_str("# Demo\n\nSome prose.\n").expect("write readme");
    tmp
}

#[test]
fn assemble_emits_parseable_plain_artifact() {
    let fixture = make_fixture();
    let mut cmd = Command::cargo_bin("ctxpack").unwrap();
    cmd.arg("assemble").arg(fixture.path()).assert().success().stdout(
        predicate::str::contains("--- File: ")
            .and(predicate::str::contains("alpha"))
            .and(predicate::str::contains("gamma")),
    );
}

#[test]
fn assemble_skeleton_preset_drops_bodies() {
    let fixture = make_fixture();
    let mut cmd = Command::cargo_bin("ctxpack").unwrap();
    cmd.arg("assemble")
        .arg(fixture.path())
        .arg("--preset")
        .arg("skeleton")
        .assert()
        .success()
        .stdout(predicate::str::contains("fn alpha").and(predicate::str::contains("{}").not()));
}

#[test]
fn optimize_strips_comments_in_place() {
    let fixture = assert_fs::TempDir::new().unwrap();
    let file = fixture.child("a.rs");
    file.write_str("fn a() {} // trailing\n").unwrap();

    let mut cmd = Command::cargo_bin("ctxpack").unwrap();
    cmd.arg("optimize")
        .arg(file.path())
        .arg("--preset")
        .arg("aggressive")
        .arg("--in-place")
        .assert()
        .success();

    file.assert(predicate::str::contains("trailing").not());
}

#[test]
fn split_file_strategy_respects_budget() {
    let fixture = assert_fs::TempDir::new().unwrap();
    let artifact = fixture.child("artifact.txt");
    let body_a = "a".repeat(160);
    let body_b = "b".repeat(280);
    artifact
        .write_str(&format!("--- File: a.txt ---\n{body_a}\n\n--- File: b.txt ---\n{body_b}\n\n"))
        .unwrap();

    let mut cmd = Command::cargo_bin("ctxpack").unwrap();
    let output = cmd
        .arg("split")
        .arg(artifact.path())
        .arg("--strategy")
        .arg("file")
        .arg("--max-tokens")
        .arg("80")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("chunk boundary"));
}

#[test]
fn diff_split_keeps_hunks_whole_and_repeats_header() {
    let fixture = assert_fs::TempDir::new().unwrap();
    let diff_file = fixture.child("change.diff");

    let mut diff = String::from("diff --git a/f.rs b/f.rs\n--- a/f.rs\n+++ b/f.rs\n");
    for i in 0..5 {
        diff.push_str(&format!("@@ -{i},5 +{i},6 @@\n"));
        for j in 0..10 {
            diff.push_str(&format!("+line {i}-{j}\n"));
        }
    }
    diff_file.write_str(&diff).unwrap();

    let mut cmd = Command::cargo_bin("ctxpack").unwrap();
    let output =
        cmd.arg("diff-split").arg(diff_file.path()).arg("--max-lines").arg("20").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let header_count = stdout.matches("diff --git a/f.rs b/f.rs").count();
    assert!(header_count >= 2);
}

#[test]
fn stream_pages_through_large_project() {
    let tmp = assert_fs::TempDir::new().unwrap();
    for i in 0..40 {
        let mut body = String::new();
        for j in 0..50 {
            body.push_str(&format!("pub fn f_{i}_{j}() {{}}\n"));
        }
        tmp.child(format!("src/unit_{i}.rs")).write_str(&body).unwrap();
    }

    let mut cmd = Command::cargo_bin("ctxpack").unwrap();
    cmd.arg("stream")
        .arg(tmp.path())
        .arg("--start-line")
        .arg("0")
        .arg("--line-count")
        .arg("10")
        .assert()
        .success();
}
