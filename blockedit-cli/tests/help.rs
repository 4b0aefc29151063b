use assert_cmd::cargo::{self};
use predicates::str::contains;

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!("blockedit");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("blockedit"))
        .stdout(contains("move"));
}

#[test]
fn lists_key_bindings() {
    let mut cmd = cargo::cargo_bin_cmd!("blockedit");
    cmd.arg("keys")
        .assert()
        .success()
        .stdout(contains("space/enter -> pick up / drop row"));
}

#[test]
fn prints_the_site_schema() {
    let mut cmd = cargo::cargo_bin_cmd!("blockedit");
    cmd.arg("schema")
        .assert()
        .success()
        .stdout(contains("headerNav"))
        .stdout(contains("FooterSection"));
}

#[test]
fn key_help_points_at_the_edit_command() {
    let mut cmd = cargo::cargo_bin_cmd!("blockedit");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("edit"))
        .stdout(contains("List the key bindings used by `edit`"));
}

#[test]
fn edit_refuses_to_save_to_stdout() {
    let mut cmd = cargo::cargo_bin_cmd!("blockedit");
    cmd.args(["-d", "missing-site.json", "-o", "-", "--force", "edit", "nav"])
        .assert()
        .failure()
        .stderr(contains("cannot save to stdout"));
}
