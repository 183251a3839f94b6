//! ストア永続化テスト
//!
//! 取り込み結果と状態遷移がJSONファイルを通して保持されることを検証

mod common;

use chrono::{Duration, Utc};
use common::{write_png, ScriptedOcr};
use rand::rngs::StdRng;
use rand::SeedableRng;
use screenshot_triage::ingest::{IngestOptions, Ingestor};
use screenshot_triage::scanner;
use screenshot_triage::store::ItemStore;
use triage_common::{SignalAnalyzer, TextContent};
use tempfile::tempdir;

/// 空のストア
#[test]
fn test_open_missing_store_is_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = ItemStore::open(&dir.path().join("items.json")).expect("open failed");
    assert!(store.items().is_empty());
}

/// 取り込み → 保存 → 再読み込み
#[tokio::test]
async fn test_ingest_save_and_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    let shots = dir.path().join("shots");
    std::fs::create_dir(&shots).unwrap();
    write_png(&shots, "bill.png", 20);
    write_png(&shots, "empty.png", 200);

    let store_path = dir.path().join("data").join("items.json");
    let mut store = ItemStore::open(&store_path).unwrap();

    let ocr = ScriptedOcr::default().with("bill.png", "Reminder: pay the electricity bill before Friday");
    let analyzer = SignalAnalyzer::default();
    let ingestor = Ingestor::new(&ocr, &analyzer, IngestOptions::default());
    let mut rng = StdRng::seed_from_u64(3);
    let now = Utc::now();

    let images = scanner::scan_folder(&shots).unwrap();
    ingestor
        .ingest(images, store.items_mut(), &mut rng, now)
        .await
        .expect("ingest failed");

    let order: Vec<_> = store.items().active(now).iter().map(|i| i.id).collect();
    let empty_id = store
        .items()
        .items()
        .iter()
        .find(|i| i.file_name == "empty.png")
        .map(|i| i.id)
        .unwrap();
    store.items_mut().defer(empty_id, Duration::minutes(30), now).unwrap();
    store.save().expect("save failed");

    let reloaded = ItemStore::open(&store_path).expect("reload failed");
    assert_eq!(reloaded.items().len(), 2);
    for (saved, loaded) in store.items().items().iter().zip(reloaded.items().items()) {
        assert_eq!(saved.id, loaded.id);
        assert_eq!(saved.text, loaded.text);
        assert_eq!(saved.path, loaded.path);
        assert!((saved.priority_score - loaded.priority_score).abs() < 1e-12);
    }

    let empty = reloaded.items().get(empty_id).unwrap();
    assert_eq!(empty.text, TextContent::NoTextDetected);
    assert!(!empty.fingerprint.is_empty());
    assert!(empty.is_deferred_at(now));

    let reloaded_order: Vec<_> = reloaded
        .items()
        .active(now + Duration::hours(1))
        .iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(reloaded_order, order);
}

/// 再スキャンでは保存済みの画像を取り込まない
#[tokio::test]
async fn test_rescan_after_reload_skips_known_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_png(dir.path(), "a.png", 70);
    let store_path = dir.path().join("items.json");

    let ocr = ScriptedOcr::default();
    let analyzer = SignalAnalyzer::keyword_only();
    let ingestor = Ingestor::new(&ocr, &analyzer, IngestOptions::default());
    let mut rng = StdRng::seed_from_u64(4);

    let mut store = ItemStore::open(&store_path).unwrap();
    let images = scanner::scan_folder(dir.path()).unwrap();
    ingestor.ingest(images, store.items_mut(), &mut rng, Utc::now()).await.unwrap();
    store.save().unwrap();

    // 同じ内容の別名ファイルを追加
    std::fs::copy(dir.path().join("a.png"), dir.path().join("a-copy.png")).unwrap();

    let mut store = ItemStore::open(&store_path).unwrap();
    let images = scanner::scan_folder(dir.path()).unwrap();
    let report = ingestor
        .ingest(images, store.items_mut(), &mut rng, Utc::now())
        .await
        .unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(report.skipped_duplicates, 2);
    assert_eq!(store.items().len(), 1);
}

/// 全削除は保存後も空
#[test]
fn test_purge_persists() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store_path = dir.path().join("items.json");

    let mut store = ItemStore::open(&store_path).unwrap();
    let now = Utc::now();
    store
        .items_mut()
        .insert(triage_common::Item::new(
            "a.png",
            "/shots/a.png",
            TextContent::NoTextDetected,
            0.3,
            0.3,
            0.4,
            now,
        ))
        .unwrap();
    store.save().unwrap();

    let mut store = ItemStore::open(&store_path).unwrap();
    assert_eq!(store.items_mut().purge().len(), 1);
    store.save().unwrap();

    assert!(ItemStore::open(&store_path).unwrap().items().is_empty());
}
