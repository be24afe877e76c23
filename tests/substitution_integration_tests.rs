//! Integration tests for the substitution and rollback engines
//!
//! These tests verify:
//! - Substitute-then-rollback restores the original bytes
//! - A second substitution run is a no-op
//! - Missing and disallowed variables never produce partial writes
//! - Per-variable count aggregation
//! - Non-UTF-8 content passes through byte for byte
//! - A failed backup write leaves the target untouched

use camino::Utf8PathBuf;
use envstamp::models::{OperationError, OperationOutcome, SubstitutionConfig};
use envstamp::services::{AllowList, SubstitutionService, backup_path, rollback};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn create_test_dir() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, dir)
}

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const BUNDLE: &str = "!function(){var a=process.env.API_URL,b=process.env.DEBUG;\r\nfetch(process.env.API_URL+\"/v1\")}();\n";

#[tokio::test]
async fn test_substitute_then_rollback_restores_original_bytes() {
    let (_temp_dir, dir) = create_test_dir();
    let file = dir.join("main.abc123.js");
    fs::write(&file, BUNDLE).unwrap();

    let service = SubstitutionService::new(SubstitutionConfig::default()).unwrap();
    let outcome = service
        .substitute(&file, &env(&[("API_URL", "https://api"), ("DEBUG", "true")]))
        .await;
    assert!(matches!(outcome, OperationOutcome::Replaced { total: 3, .. }));
    assert_ne!(fs::read_to_string(&file).unwrap(), BUNDLE);
    assert!(backup_path(&file).exists());

    assert!(matches!(rollback(&file).await, OperationOutcome::RolledBack));
    assert_eq!(fs::read(&file).unwrap(), BUNDLE.as_bytes());
    assert!(!backup_path(&file).exists());
}

#[tokio::test]
async fn test_second_substitution_is_untouched() {
    let (_temp_dir, dir) = create_test_dir();
    let file = dir.join("main.js");
    fs::write(&file, BUNDLE).unwrap();
    let vars = env(&[("API_URL", "https://api"), ("DEBUG", "true")]);

    let service = SubstitutionService::new(SubstitutionConfig::default()).unwrap();
    service.substitute(&file, &vars).await;

    let content_after_first = fs::read(&file).unwrap();
    let backup_after_first = fs::read(backup_path(&file)).unwrap();

    let outcome = service.substitute(&file, &vars).await;
    assert!(matches!(outcome, OperationOutcome::Untouched));
    assert_eq!(fs::read(&file).unwrap(), content_after_first);
    assert_eq!(fs::read(backup_path(&file)).unwrap(), backup_after_first);
}

#[tokio::test]
async fn test_missing_variable_fails_without_writing() {
    let (_temp_dir, dir) = create_test_dir();
    let file = dir.join("main.js");
    fs::write(&file, "console.log(process.env.FOO)").unwrap();

    let service = SubstitutionService::new(SubstitutionConfig::default()).unwrap();
    let outcome = service.substitute(&file, &env(&[])).await;

    assert!(matches!(
        outcome,
        OperationOutcome::Failed {
            error: OperationError::VariableNotSet { .. }
        }
    ));
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "console.log(process.env.FOO)"
    );
    assert!(!backup_path(&file).exists());
}

#[tokio::test]
async fn test_allow_missing_writes_literal_and_backup() {
    let (_temp_dir, dir) = create_test_dir();
    let file = dir.join("main.js");
    fs::write(&file, "console.log(process.env.FOO)").unwrap();

    let service = SubstitutionService::new(SubstitutionConfig {
        allow_missing: true,
        ..Default::default()
    })
    .unwrap();
    let outcome = service.substitute(&file, &env(&[])).await;

    assert!(matches!(outcome, OperationOutcome::Replaced { total: 1, .. }));
    assert_eq!(fs::read_to_string(&file).unwrap(), "console.log(undefined)");
    assert_eq!(
        fs::read_to_string(backup_path(&file)).unwrap(),
        "console.log(process.env.FOO)"
    );
}

#[tokio::test]
async fn test_count_aggregation() {
    let (_temp_dir, dir) = create_test_dir();
    let file = dir.join("main.js");
    fs::write(
        &file,
        "process.env.API_URL;process.env.API_URL;process.env.DEBUG;process.env.API_URL",
    )
    .unwrap();

    let service = SubstitutionService::new(SubstitutionConfig {
        allow_list: AllowList::parse("API_URL,DEBUG").unwrap(),
        ..Default::default()
    })
    .unwrap();
    let outcome = service
        .substitute(&file, &env(&[("API_URL", "u"), ("DEBUG", "1")]))
        .await;

    match outcome {
        OperationOutcome::Replaced { counts, total, .. } => {
            assert_eq!(total, 4);
            assert_eq!(counts.len(), 2);
            assert_eq!(counts["API_URL"], 3);
            assert_eq!(counts["DEBUG"], 1);
        }
        other => panic!("expected Replaced, got {other}"),
    }
}

#[tokio::test]
async fn test_disallowed_reference_with_ignore_other_only() {
    let (_temp_dir, dir) = create_test_dir();
    let file = dir.join("main.js");
    fs::write(&file, "process.env.NODE_ENV").unwrap();

    let service = SubstitutionService::new(SubstitutionConfig {
        allow_list: AllowList::parse("REACT_APP_*").unwrap(),
        ignore_other: true,
        ..Default::default()
    })
    .unwrap();

    assert!(matches!(
        service.substitute(&file, &env(&[("NODE_ENV", "production")])).await,
        OperationOutcome::Untouched
    ));
    assert!(!backup_path(&file).exists());
}

#[tokio::test]
async fn test_binary_file_without_references_is_untouched() {
    let (_temp_dir, dir) = create_test_dir();
    let file = dir.join("logo.png");
    let png: &[u8] = &[0x89, b'P', b'N', b'G', 0xff, 0xfe, 0x00];
    fs::write(&file, png).unwrap();

    let service = SubstitutionService::new(SubstitutionConfig::default()).unwrap();
    let outcome = service.substitute(&file, &env(&[])).await;

    assert!(matches!(outcome, OperationOutcome::Untouched));
    assert_eq!(fs::read(&file).unwrap(), png);
    assert!(!backup_path(&file).exists());
}

#[tokio::test]
async fn test_invalid_bytes_around_reference_are_preserved() {
    let (_temp_dir, dir) = create_test_dir();
    let file = dir.join("legacy.js");
    let original: &[u8] = b"x=process.env.A;\xff/*\xe9t\xe9*/";
    fs::write(&file, original).unwrap();

    let service = SubstitutionService::new(SubstitutionConfig::default()).unwrap();
    let outcome = service.substitute(&file, &env(&[("A", "a")])).await;

    assert!(matches!(outcome, OperationOutcome::Replaced { total: 1, .. }));
    assert_eq!(fs::read(&file).unwrap(), b"x=\"a\";\xff/*\xe9t\xe9*/");
    assert_eq!(fs::read(backup_path(&file)).unwrap(), original);

    assert!(matches!(rollback(&file).await, OperationOutcome::RolledBack));
    assert_eq!(fs::read(&file).unwrap(), original);
}

#[tokio::test]
async fn test_failed_backup_write_leaves_target_untouched() {
    let (_temp_dir, dir) = create_test_dir();
    let file = dir.join("main.js");
    fs::write(&file, "process.env.A").unwrap();
    // A directory at the backup path makes the backup write fail
    fs::create_dir(backup_path(&file)).unwrap();

    let service = SubstitutionService::new(SubstitutionConfig::default()).unwrap();
    let outcome = service.substitute(&file, &env(&[("A", "a")])).await;

    match outcome {
        OperationOutcome::Failed {
            error: OperationError::Io { path, .. },
        } => assert_eq!(path, backup_path(&file)),
        other => panic!("expected Failed(Io), got {other}"),
    }
    assert_eq!(fs::read(&file).unwrap(), b"process.env.A");
}
