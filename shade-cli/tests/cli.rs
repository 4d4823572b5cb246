use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;

fn sample_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("shade-parser")
        .join("samples")
        .join(relative)
}

#[test]
fn prints_treeviz_by_default() {
    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(sample_path("programs/01-lighting.shade"));

    let output_pred = predicate::str::starts_with("⧉ Module")
        .and(predicate::str::contains("01-lighting.shade"))
        .and(predicate::str::contains("AliasDeclaration"));

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn prints_tokens() {
    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(sample_path("programs/01-lighting.shade"))
        .arg("--format")
        .arg("tokens");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2:1 Alias(\"alias\")"))
        .stdout(predicate::str::contains("LineComment").not());
}

#[test]
fn keeps_comments_on_request() {
    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(sample_path("programs/01-lighting.shade"))
        .args(["--format", "tokens", "--keep-comments"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("1:1 LineComment("));
}

#[test]
fn prints_structure_data_as_json() {
    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(sample_path("declarations/01-structs-and-aliases.shade"))
        .args(["-f", "json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"Module\""))
        .stdout(predicate::str::contains("\"StructDeclaration\""));
}

#[test]
fn prints_type_report() {
    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(sample_path("programs/02-reduce.shade"))
        .args(["--format", "types"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("declarations:"))
        .stdout(predicate::str::contains("types:"));
}

#[test]
fn reports_errors_with_source_context() {
    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(sample_path("errors/01-unknown-type.shade"));

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown type `Mass`"))
        .stderr(predicate::str::contains(">>   4 |     mass: Mass,"));
}

#[test]
fn reads_config_file() {
    let mut config = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(config, "[output]\nformat = \"yaml\"").unwrap();

    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(sample_path("statements/01-control-flow.shade"))
        .arg("--config")
        .arg(config.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("type: Module"));
}

#[test]
fn flags_override_config_file() {
    let mut config = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
    writeln!(config, "[output]\nformat = \"yaml\"").unwrap();

    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(sample_path("statements/01-control-flow.shade"))
        .arg("--config")
        .arg(config.path())
        .args(["--format", "treeviz"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("⧉ Module"));
}

#[test]
fn rejects_unknown_format() {
    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(sample_path("programs/01-lighting.shade"))
        .args(["--format", "html"]);

    cmd.assert().failure().code(2);
}

#[test]
fn reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cargo_bin_cmd!("shade");
    cmd.arg(dir.path().join("absent.shade"));

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Cannot read"));
}
