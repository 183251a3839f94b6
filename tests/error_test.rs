//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use chrono::{Duration, Utc};
use screenshot_triage::error::TriageError;
use screenshot_triage::scanner;
use screenshot_triage::store::ItemStore;
use std::path::Path;
use tempfile::tempdir;
use uuid::Uuid;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"));
    assert!(result.is_err());

    let err = result.unwrap_err();
    assert!(matches!(err, TriageError::FolderNotFound(_)));
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");

    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let result = scanner::scan_folder(dir.path()).unwrap();
    assert!(result.is_empty());
}

/// 壊れたストアファイル
#[test]
fn test_corrupt_store() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("items.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = ItemStore::open(&path);
    assert!(matches!(result, Err(TriageError::JsonParse(_))));
}

/// 存在しないIDへの操作は NotFound
#[test]
fn test_unknown_id_is_not_found() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut store = ItemStore::open(&dir.path().join("items.json")).unwrap();
    let now = Utc::now();

    let id = Uuid::new_v4();
    let err: TriageError = store.items_mut().dismiss(id, now).unwrap_err().into();
    assert!(matches!(err, TriageError::Core(triage_common::Error::NotFound(_))));
    assert!(err.to_string().contains(&id.to_string()));

    assert!(store.items_mut().defer(id, Duration::minutes(5), now).is_err());
    assert!(store.items().resolve_id("abc").is_err());
}

/// エラーメッセージ
#[test]
fn test_error_messages() {
    let err = TriageError::OcrTimeout(10);
    assert!(err.to_string().contains("10"));

    let err = TriageError::NoImagesFound("uploads".into());
    assert!(err.to_string().contains("uploads"));

    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: TriageError = io_error.into();
    assert!(matches!(err, TriageError::Io(_)));
}
