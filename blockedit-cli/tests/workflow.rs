use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use assert_cmd::cargo::{self};
use predicates::str::contains;
use serde_json::{Value, json};

fn scratch(name: &str, contents: Option<Value>) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("blockedit-cli-{name}-{nanos}.json"));
    if let Some(value) = contents {
        fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }
    path
}

fn read(path: &PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn site() -> Value {
    json!({
        "headerNav": [
            {"label": "Platform", "href": "/platform", "subItems": [{"label": "X", "href": "/x"}]},
            {"label": "Pricing", "href": "/pricing"}
        ],
        "blocks": [{"type": "hero", "headline": "Hire faster"}],
        "footer": []
    })
}

#[test]
fn add_creates_a_missing_document() {
    let path = scratch("create", None);
    cargo::cargo_bin_cmd!("blockedit")
        .arg("--document")
        .arg(&path)
        .args(["add", "nav"])
        .assert()
        .success();
    assert_eq!(read(&path), json!({"headerNav": [{"label": "New link", "href": "/"}]}));
    let _ = fs::remove_file(path);
}

#[test]
fn move_then_show_reflects_new_order() {
    let path = scratch("move", Some(site()));
    cargo::cargo_bin_cmd!("blockedit")
        .arg("-d")
        .arg(&path)
        .args(["move", "nav", "1", "0"])
        .assert()
        .success();
    assert_eq!(read(&path)["headerNav"][0]["label"], "Pricing");

    cargo::cargo_bin_cmd!("blockedit")
        .arg("-d")
        .arg(&path)
        .args(["show", "--expand"])
        .assert()
        .success()
        .stdout(contains("  ▾ Pricing → /pricing"))
        .stdout(contains("      • X → /x"));
    let _ = fs::remove_file(path);
}

#[test]
fn nested_update_keeps_siblings() {
    let path = scratch("nested", Some(site()));
    cargo::cargo_bin_cmd!("blockedit")
        .arg("-d")
        .arg(&path)
        .args(["update", "nav/0/subItems", "0", r#"{"description": "Search"}"#])
        .assert()
        .success();
    let doc = read(&path);
    assert_eq!(
        doc["headerNav"][0]["subItems"][0],
        json!({"label": "X", "href": "/x", "description": "Search"})
    );
    assert_eq!(doc["headerNav"][1], site()["headerNav"][1]);
    let _ = fs::remove_file(path);
}

#[test]
fn invalid_links_are_not_written() {
    let path = scratch("invalid", Some(site()));
    cargo::cargo_bin_cmd!("blockedit")
        .arg("-d")
        .arg(&path)
        .args(["update", "nav", "0", r#"{"href": "not a link"}"#])
        .assert()
        .failure()
        .stderr(contains("/headerNav/0/href"));
    assert_eq!(read(&path), site());
    let _ = fs::remove_file(path);
}

#[test]
fn out_of_range_delete_changes_nothing() {
    let path = scratch("noop", Some(site()));
    cargo::cargo_bin_cmd!("blockedit")
        .arg("-d")
        .arg(&path)
        .args(["delete", "footer", "3"])
        .assert()
        .success()
        .stderr(contains("nothing to change in footer"));
    assert_eq!(read(&path), site());
    let _ = fs::remove_file(path);
}

#[test]
fn block_kind_adds_a_typed_block_to_stdout() {
    let path = scratch("kind", Some(site()));
    cargo::cargo_bin_cmd!("blockedit")
        .arg("-d")
        .arg(&path)
        .args(["-o", "-", "--no-pretty", "add", "blocks", "--kind", "faq"])
        .assert()
        .success()
        .stdout(contains(r#""type":"faq""#));
    assert_eq!(read(&path), site(), "stdout output leaves the file alone");
    let _ = fs::remove_file(path);
}

#[test]
fn validate_reports_schema_errors() {
    let path = scratch("validate", Some(json!({"footer": [{"links": []}]})));
    cargo::cargo_bin_cmd!("blockedit")
        .arg("-d")
        .arg(&path)
        .arg("validate")
        .assert()
        .failure()
        .stderr(contains("/footer/0"));
    let _ = fs::remove_file(path);
}

#[test]
fn operations_are_logged_when_requested() {
    let path = scratch("logged", Some(site()));
    cargo::cargo_bin_cmd!("blockedit")
        .env("RUST_LOG", "info")
        .arg("-d")
        .arg(&path)
        .args(["delete", "footer", "3"])
        .assert()
        .success()
        .stderr(contains("loaded site document"))
        .stderr(contains("operation left the list unchanged"));

    cargo::cargo_bin_cmd!("blockedit")
        .env("RUST_LOG", "info")
        .arg("-d")
        .arg(&path)
        .args(["move", "nav", "1", "0"])
        .assert()
        .success()
        .stderr(contains("site document saved"));
    let _ = fs::remove_file(path);
}
