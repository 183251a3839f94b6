use chrono::{DateTime, Local, Utc};
use clap::Parser;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use screenshot_triage::{cli, config, error, ingest, ocr, scanner, store, upload};
use cli::{Cli, Commands};
use config::{defer_minutes, Config};
use error::{Result, TriageError};
use ingest::{IngestOptions, IngestReport, Ingestor};
use ocr::TesseractOcr;
use scanner::ImageInfo;
use store::ItemStore;
use triage_common::{score_item, truncate_text, Item, SignalAnalyzer, TextContent};

/// 一覧表示でのテキスト最大文字数
const LIST_TEXT_LENGTH: usize = 100;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = Config::load()?;
    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path.clone());

    match cli.command {
        Commands::Scan { folder } => {
            println!("🔍 screenshot-triage - 再スキャン\n");

            let folders = if folder.is_empty() {
                config.screenshot_folders.clone()
            } else {
                folder
            };

            println!("[1/3] 画像をスキャン中...");
            let images = scanner::scan_folders(&folders);
            println!("✔ {}枚の画像を検出\n", images.len());

            let mut store = ItemStore::open(&store_path)?;
            println!("[2/3] OCR・解析中...");
            let report = run_ingest(&config, images, &mut store).await?;
            print_report(&report);

            println!("[3/3] 保存中...");
            store.save()?;
            println!("✔ 保存: {}", store.path().display());
        }

        Commands::Upload { files } => {
            println!("📤 screenshot-triage - アップロード\n");

            println!("[1/3] ファイルを保存中...");
            let staged = upload::stage_uploads(&files, &config.uploads_folder)?;
            for warning in &staged.warnings {
                println!("  ⚠ {}", warning);
            }
            if staged.images.is_empty() {
                return Err(TriageError::NoImagesFound("有効な画像がありません".into()));
            }
            println!("✔ {}枚を保存\n", staged.images.len());

            let mut store = ItemStore::open(&store_path)?;
            println!("[2/3] OCR・解析中...");
            let report = run_ingest(&config, staged.images, &mut store).await?;
            print_report(&report);

            println!("[3/3] 保存中...");
            store.save()?;
            println!("✔ 保存: {}", store.path().display());
        }

        Commands::List { dismissed, deferred, limit } => {
            let store = ItemStore::open(&store_path)?;
            let now = Utc::now();
            let items = store.items();

            let shown = if dismissed {
                items.dismissed()
            } else if deferred {
                items.deferred(now)
            } else {
                items.active(now)
            };
            let limit = limit.unwrap_or(shown.len());

            if shown.is_empty() {
                println!("表示する項目はありません");
            }
            for item in shown.iter().take(limit) {
                print_item(item, now);
            }

            if !dismissed && !deferred && items.has_dismissed() {
                println!("\n非表示: {}件（`list --dismissed` で表示）", items.dismissed_count());
            }
        }

        Commands::Dismiss { id } => {
            let mut store = ItemStore::open(&store_path)?;
            let id = store.items().resolve_id(&id)?;
            store.items_mut().dismiss(id, Utc::now())?;
            store.save()?;
            println!("✔ 非表示にしました: {}", id);
        }

        Commands::Restore { id } => {
            let mut store = ItemStore::open(&store_path)?;
            let id = store.items().resolve_id(&id)?;
            store.items_mut().restore(id, Utc::now())?;
            store.save()?;
            println!("✔ 戻しました: {}", id);
        }

        Commands::Defer { id, minutes } => {
            let duration = match minutes {
                Some(m) => defer_minutes(m)?,
                None => config.default_defer()?,
            };

            let mut store = ItemStore::open(&store_path)?;
            let id = store.items().resolve_id(&id)?;
            let until = store.items_mut().defer(id, duration, Utc::now())?;
            store.save()?;
            println!(
                "✔ 延期しました: {} ({} まで)",
                id,
                until.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
        }

        Commands::DismissAll => {
            let mut store = ItemStore::open(&store_path)?;
            let count = store.items_mut().dismiss_all(Utc::now());
            store.save()?;
            println!("✔ {}件を非表示にしました", count);
        }

        Commands::RestoreAll => {
            let mut store = ItemStore::open(&store_path)?;
            let count = store.items_mut().restore_all(Utc::now());
            store.save()?;
            println!("✔ {}件を戻しました", count);
        }

        Commands::Rebalance => {
            let mut store = ItemStore::open(&store_path)?;
            let stats = store.items_mut().rebalance_active(Utc::now());
            store.save()?;
            println!("✔ {}件を再配置しました", stats.count);
            if stats.count > 0 {
                println!("  平均: {:.3} → {:.3}", stats.mean_before, stats.mean_after);
                println!("  範囲: {:.3} 〜 {:.3}", stats.min_after, stats.max_after);
            }
        }

        Commands::Analyze { text } => {
            let content = TextContent::from_ocr(&text);
            let TextContent::Extracted(body) = &content else {
                println!("{}", content);
                return Ok(());
            };

            let analyzer = SignalAnalyzer::new(config.analyzer);
            let scores = analyzer.analyze(body);
            println!("解析: {}", analyzer.kind());
            println!("  緊急度: {:.3}", scores.urgency);
            println!("  行動必要度: {:.3}", scores.action);
            println!("  生優先度: {:.3}", score_item(scores.urgency, scores.action));
        }

        Commands::Purge { yes, delete_files } => {
            let mut store = ItemStore::open(&store_path)?;
            let total = store.items().len();
            if total == 0 {
                println!("項目はありません");
                return Ok(());
            }

            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("{}件の項目をすべて削除しますか？", total))
                    .default(false)
                    .interact()
                    .map_err(|e| TriageError::Config(e.to_string()))?;
            if !confirmed {
                println!("中止しました");
                return Ok(());
            }

            let removed = store.items_mut().purge();
            store.save()?;
            println!("✔ {}件を削除しました", removed.len());

            if delete_files {
                let files = upload::remove_staged_files(&removed, &config.uploads_folder);
                println!("✔ アップロード画像を{}件削除しました", files);
            }
        }

        Commands::Cleanup => {
            let removed = upload::cleanup_expired_uploads(
                &config.uploads_folder,
                config.upload_expiry(),
                std::time::SystemTime::now(),
            )?;
            println!("✔ 期限切れのアップロード画像を{}件削除しました", removed);
        }

        Commands::Config { show, set } => {
            let mut config = config;

            if !set.is_empty() {
                for assignment in &set {
                    config.set(assignment)?;
                }
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || set.is_empty() {
                println!("設定:");
                println!("  スキャン対象: {}", join_paths(&config.screenshot_folders));
                println!("  アップロード先: {}", config.uploads_folder.display());
                println!("  ストア: {}", config.store_path.display());
                println!(
                    "  OCR: {} {} (タイムアウト {}秒)",
                    config.tesseract_command,
                    config.tesseract_args.join(" "),
                    config.ocr_timeout_secs
                );
                println!("  最大画像サイズ: {}px", config.max_image_size);
                println!("  延期時間: {}分", config.default_defer_minutes);
                println!("  解析: {}", config.analyzer);
                println!("  正規化: {}", config.normalization);
                println!("  アップロード保持: {}時間", config.upload_expiry_hours);
                println!("  バッチサイズ: {}", config.ingest_batch_size);
            }
        }
    }

    Ok(())
}

async fn run_ingest(config: &Config, images: Vec<ImageInfo>, store: &mut ItemStore) -> Result<IngestReport> {
    let ocr = TesseractOcr::from_config(config);
    let analyzer = SignalAnalyzer::new(config.analyzer);

    let progress = ProgressBar::new(images.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let ingestor = Ingestor::new(&ocr, &analyzer, IngestOptions::from_config(config)).with_progress(progress);
    let mut rng = StdRng::from_entropy();
    ingestor
        .ingest(images, store.items_mut(), &mut rng, Utc::now())
        .await
}

fn print_report(report: &IngestReport) {
    println!("✔ {}件を取り込み", report.processed);
    if report.fallback > 0 {
        println!("  処理失敗: {}件", report.fallback);
    }
    if report.skipped_duplicates > 0 {
        println!("  重複スキップ: {}件", report.skipped_duplicates);
    }
    for warning in &report.warnings {
        println!("  ⚠ {}", warning);
    }
    println!();
}

fn print_item(item: &Item, now: DateTime<Utc>) {
    let id = item.id.to_string();
    println!(
        "[{}] {:.2}  {}  (緊急度 {:.2} / 行動 {:.2}, {})",
        &id[..8],
        item.priority_score,
        item.file_name,
        item.urgency_score,
        item.action_score,
        item.state_at(now)
    );
    println!("    {}", truncate_text(item.text.as_str(), LIST_TEXT_LENGTH).replace('\n', " "));
}

fn join_paths(paths: &[std::path::PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
