//! Integration tests for the Facetry CLI commands.
//!
//! Commands are driven through `cli::execute` with parsed arguments; files
//! live in temporary directories.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;
use facetry::cli::{Cli, Source, execute, load_catalog, load_config};
use facetry_core::MetamodelError;
use facetry_core::export::decode_canonical;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/customer.toml")
}

fn run(args: &[&str]) -> Result<(), MetamodelError> {
    let catalog = fixture();
    let mut argv = vec!["facetry", "-q", "-C", catalog.to_str().unwrap()];
    argv.extend_from_slice(args);
    execute(Cli::try_parse_from(argv).unwrap())
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const TWO_HOME_PAGES: &str = r#"
[[types]]
name = "Left"

[[types.methods]]
name = "open"
returns = "string"
annotations = [{ name = "HomePage" }]

[[types]]
name = "Right"

[[types.methods]]
name = "open"
returns = "string"
annotations = [{ name = "HomePage" }]
"#;

// =============================================================================
// LOADING
// =============================================================================

#[test]
fn test_fixture_catalog_loads() {
    let catalog = load_catalog(&fixture()).unwrap();
    assert_eq!(catalog.len(), 3);
}

#[test]
fn test_json_catalog_loads() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "catalog.json",
        r#"{"types":[{"name":"Customer","methods":[{"name":"getName","returns":"string"}]}]}"#,
    );
    let catalog = load_catalog(&path).unwrap();
    assert_eq!(catalog.len(), 1);
}

#[test]
fn test_missing_catalog_is_io_error() {
    let result = load_catalog(Path::new("/definitely/not/here.toml"));
    assert!(matches!(result, Err(MetamodelError::IoError(_))));
}

#[test]
fn test_config_defaults_without_file() {
    let config = load_config(None).unwrap();
    assert!(config.validation.fatal);
}

// =============================================================================
// COMMANDS
// =============================================================================

#[test]
fn test_validate_fixture_is_clean() {
    run(&["validate"]).unwrap();
    run(&["--json-mode", "validate"]).unwrap();
}

#[test]
fn test_validate_reports_failures() {
    let dir = TempDir::new().unwrap();
    let catalog = write(&dir, "bad.toml", TWO_HOME_PAGES);
    let cli = Cli::try_parse_from(["facetry", "-q", "-C", catalog.to_str().unwrap(), "validate"])
        .unwrap();
    let result = execute(cli);
    assert!(matches!(result, Err(MetamodelError::Validation(f)) if f.len() == 2));
}

#[test]
fn test_disabled_validator_via_config() {
    let dir = TempDir::new().unwrap();
    let catalog = write(&dir, "bad.toml", TWO_HOME_PAGES);
    let config = write(
        &dir,
        "facetry.toml",
        "[validation]\ndisabled_validators = [\"unique_home_page\"]\n",
    );
    let source = Source {
        catalog: catalog.as_path(),
        config: Some(config.as_path()),
    };
    facetry::cli::cmd_validate(&source, false).unwrap();
}

#[test]
fn test_inspect_known_and_unknown_types() {
    run(&["inspect", "Customer"]).unwrap();
    run(&["--json-mode", "inspect", "Order"]).unwrap();
    assert!(matches!(
        run(&["inspect", "Nope"]),
        Err(MetamodelError::UnknownType(_))
    ));
}

#[test]
fn test_status_is_default_command() {
    run(&[]).unwrap();
    run(&["--json-mode", "status"]).unwrap();
}

#[test]
fn test_export_then_verify() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("model.fmmx");
    let output_str = output.to_str().unwrap();

    run(&["export", "-o", output_str]).unwrap();
    let data = std::fs::read(&output).unwrap();
    let snapshot = decode_canonical(&data).unwrap();
    assert!(snapshot.specification("Customer").is_some());

    run(&["verify", "-i", output_str]).unwrap();
}

#[test]
fn test_verify_rejects_foreign_export() {
    let dir = TempDir::new().unwrap();
    let other = write(&dir, "other.toml", "[[types]]\nname = \"Lonely\"\n");
    let output = dir.path().join("other.fmmx");

    let export = Cli::try_parse_from([
        "facetry",
        "-q",
        "-C",
        other.to_str().unwrap(),
        "export",
        "-o",
        output.to_str().unwrap(),
    ])
    .unwrap();
    execute(export).unwrap();

    assert!(run(&["verify", "-i", output.to_str().unwrap()]).is_err());
}

#[test]
fn test_json_export_and_unknown_format() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("model.json");
    run(&["export", "-o", output.to_str().unwrap(), "-t", "json"]).unwrap();

    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
    let names: Vec<&str> = value["specifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["type_name"].as_str().unwrap())
        .collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);

    let bad = dir.path().join("model.bin");
    assert!(run(&["export", "-o", bad.to_str().unwrap(), "-t", "xml"]).is_err());
}

#[test]
fn test_hash_runs_in_both_modes() {
    run(&["hash"]).unwrap();
    run(&["--json-mode", "hash"]).unwrap();
}
