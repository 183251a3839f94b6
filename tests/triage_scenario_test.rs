//! 取り込みから一覧表示までのシナリオテスト
//!
//! スクリーンショット5枚（緊急テキスト3枚・テキストなし2枚）を1バッチで取り込み、
//! 一覧の順位と優先度の範囲を検証する。

mod common;

use chrono::{Duration, Utc};
use common::{write_png, ScriptedOcr};
use rand::rngs::StdRng;
use rand::SeedableRng;
use screenshot_triage::ingest::{IngestOptions, Ingestor};
use screenshot_triage::scanner;
use std::collections::HashSet;
use triage_common::{ItemCollection, SignalAnalyzer, TextContent};
use tempfile::tempdir;

const URGENT_TEXT: &str = "URGENT: submit by today";

fn scenario_ocr() -> ScriptedOcr {
    ScriptedOcr::default()
        .with("urgent1.png", URGENT_TEXT)
        .with("urgent2.png", URGENT_TEXT)
        .with("urgent3.png", URGENT_TEXT)
        .with("blank2.png", "   \n")
}

/// 緊急テキスト3枚はテキストなし2枚より必ず上位
#[tokio::test]
async fn test_five_screenshot_scenario() {
    let dir = tempdir().expect("Failed to create temp dir");
    for (i, name) in ["urgent1.png", "urgent2.png", "urgent3.png", "blank1.png", "blank2.png"]
        .iter()
        .enumerate()
    {
        write_png(dir.path(), name, (i as u8 + 1) * 40);
    }

    let ocr = scenario_ocr();
    let analyzer = SignalAnalyzer::default();
    let ingestor = Ingestor::new(&ocr, &analyzer, IngestOptions::default());

    for seed in 0..20 {
        let images = scanner::scan_folder(dir.path()).expect("scan failed");
        assert_eq!(images.len(), 5);

        let mut items = ItemCollection::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let now = Utc::now();
        let report = ingestor
            .ingest(images, &mut items, &mut rng, now)
            .await
            .expect("ingest failed");

        assert_eq!(report.processed, 5);
        assert_eq!(report.fallback, 0);

        let active = items.active(now);
        assert_eq!(active.len(), 5);
        for (rank, item) in active.iter().enumerate() {
            assert!(
                (0.1..=0.9).contains(&item.priority_score),
                "seed {}: {} = {}",
                seed,
                item.file_name,
                item.priority_score
            );
            if rank < 3 {
                assert!(item.text.has_text(), "seed {}: rank {} is {}", seed, rank, item.file_name);
                assert_eq!(item.urgency_score, 1.0);
            } else {
                assert_eq!(item.text, TextContent::NoTextDetected);
                assert!((0.2..0.4).contains(&item.urgency_score));
                assert!((0.2..0.4).contains(&item.action_score));
            }
        }
        assert!(active[2].priority_score > active[3].priority_score);
    }
}

/// 全件非表示 → 全件復元で同じID集合がアクティブに戻る
#[tokio::test]
async fn test_dismiss_all_then_restore_all() {
    let dir = tempdir().expect("Failed to create temp dir");
    for i in 0..4u8 {
        write_png(dir.path(), &format!("shot{}.png", i), i * 50 + 10);
    }

    let ocr = ScriptedOcr::default().with("shot0.png", "pay rent tomorrow");
    let analyzer = SignalAnalyzer::default();
    let ingestor = Ingestor::new(&ocr, &analyzer, IngestOptions::default());
    let mut items = ItemCollection::new();
    let mut rng = StdRng::seed_from_u64(1);
    let now = Utc::now();

    let images = scanner::scan_folder(dir.path()).unwrap();
    ingestor.ingest(images, &mut items, &mut rng, now).await.unwrap();

    let before: HashSet<_> = items.active(now).iter().map(|i| i.id).collect();
    let deferred = items.items()[1].id;
    items.defer(deferred, Duration::hours(24), now).unwrap();

    assert_eq!(items.dismiss_all(now), 4);
    assert!(items.active(now).is_empty());

    assert_eq!(items.restore_all(now), 4);
    let after: HashSet<_> = items.active(now).iter().map(|i| i.id).collect();
    assert_eq!(before, after);
}

/// 延期中の項目は時刻の経過で一覧に戻る
#[tokio::test]
async fn test_deferred_item_returns_after_window() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_png(dir.path(), "a.png", 10);
    write_png(dir.path(), "b.png", 90);

    let ocr = ScriptedOcr::default()
        .with("a.png", "meeting at 10:30 this week")
        .with("b.png", "lunch menu");
    let analyzer = SignalAnalyzer::default();
    let ingestor = Ingestor::new(&ocr, &analyzer, IngestOptions::default());
    let mut items = ItemCollection::new();
    let mut rng = StdRng::seed_from_u64(2);
    let now = Utc::now();

    let images = scanner::scan_folder(dir.path()).unwrap();
    ingestor.ingest(images, &mut items, &mut rng, now).await.unwrap();

    let id = items.active(now)[0].id;
    items.defer(id, Duration::minutes(30), now).unwrap();

    assert!(items.active(now).iter().all(|i| i.id != id));
    assert!(items.active(now + Duration::minutes(29)).iter().all(|i| i.id != id));
    assert_eq!(items.active(now + Duration::minutes(30))[0].id, id);
}
