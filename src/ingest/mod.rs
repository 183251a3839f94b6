//! 取り込みパイプライン
//!
//! ## 処理フロー
//! 1. フィンガープリント計算と重複除外（パス・内容）
//! 2. 画像検証・縮小 → OCR（`ingest_batch_size` 件ずつ並行）→ 信号解析 → 生優先度
//! 3. バッチ全体を閉じてから1回だけ正規化
//! 4. コレクションに追加
//!
//! 個々のファイルの失敗はセンチネル付きの記録か警告になり、バッチは止まらない。

mod job;

pub use job::{JobRegistry, JobState, JobStatus};

use crate::config::Config;
use crate::error::{Result, TriageError};
use crate::ocr::OcrEngine;
use crate::preprocess;
use crate::scanner::{self, ImageInfo};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use indicatif::ProgressBar;
use rand::Rng;
use std::collections::HashSet;
use std::path::Path;
use triage_common::{
    normalize_batch, score_item, BatchEntry, BatchNormalizationPolicy, Item, ItemCollection,
    NormalizationStats, SignalAnalyzer, TextContent,
};
use uuid::Uuid;

/// テキストなし項目の信号スコアの抽選範囲
pub const NO_TEXT_SIGNAL_RANGE: (f64, f64) = (0.2, 0.4);

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub policy: BatchNormalizationPolicy,
    pub batch_size: usize,
    pub max_image_size: u32,
}

impl IngestOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            policy: config.normalization,
            batch_size: config.ingest_batch_size,
            max_image_size: config.max_image_size,
        }
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// 取り込み結果
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub job_id: Option<Uuid>,
    /// 追加した件数（フォールバック記録を含む）
    pub processed: usize,
    pub fallback: usize,
    pub skipped_duplicates: usize,
    pub warnings: Vec<String>,
    pub item_ids: Vec<Uuid>,
    pub stats: Option<NormalizationStats>,
}

struct Processed {
    item: Item,
    fallback: bool,
    warning: Option<String>,
}

pub struct Ingestor<'a, E: OcrEngine> {
    ocr: &'a E,
    analyzer: &'a SignalAnalyzer,
    options: IngestOptions,
    registry: JobRegistry,
    progress: ProgressBar,
}

impl<'a, E: OcrEngine> Ingestor<'a, E> {
    pub fn new(ocr: &'a E, analyzer: &'a SignalAnalyzer, options: IngestOptions) -> Self {
        Self {
            ocr,
            analyzer,
            options,
            registry: JobRegistry::new(),
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// 画像群を1バッチとして取り込む
    pub async fn ingest<R: Rng + ?Sized>(
        &self,
        images: Vec<ImageInfo>,
        items: &mut ItemCollection,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        let candidates = dedupe(images, items, &mut report);
        let job_id = self.registry.start(candidates.len());
        report.job_id = Some(job_id);
        self.progress.set_length(candidates.len() as u64);

        // チャンク内のOCRは並行、スコア付けは入力順
        let mut processed = Vec::with_capacity(candidates.len());
        for chunk in candidates.chunks(self.options.batch_size.max(1)) {
            let texts = join_all(chunk.iter().map(|(image, _)| self.read_text(&image.path))).await;
            for ((image, fingerprint), text) in chunk.iter().zip(texts) {
                let outcome = self.process_one(image, fingerprint, text, rng, now);
                self.registry.advance(job_id, &image.file_name);
                self.progress.inc(1);
                processed.push(outcome);
            }
            log::debug!("chunk of {} images processed", chunk.len());
        }

        let mut batch = Vec::with_capacity(processed.len());
        for outcome in processed {
            if outcome.fallback {
                report.fallback += 1;
            }
            if let Some(warning) = outcome.warning {
                report.warnings.push(warning);
            }
            batch.push((outcome.item, outcome.fallback));
        }

        let result = self.normalize_and_store(batch, items, rng, now, &mut report);
        match &result {
            Ok(()) => self.registry.complete(job_id),
            Err(e) => self.registry.fail(job_id, e.to_string()),
        }
        self.progress.finish_and_clear();
        result?;

        log::info!(
            "ingested {} items ({} fallback, {} duplicates skipped)",
            report.processed,
            report.fallback,
            report.skipped_duplicates
        );
        Ok(report)
    }

    fn normalize_and_store<R: Rng + ?Sized>(
        &self,
        mut batch: Vec<(Item, bool)>,
        items: &mut ItemCollection,
        rng: &mut R,
        now: DateTime<Utc>,
        report: &mut IngestReport,
    ) -> Result<()> {
        let ids: Vec<Uuid> = batch.iter().map(|(item, _)| item.id).collect();

        match self.options.policy {
            BatchNormalizationPolicy::Stratified => {
                // フォールバック記録は固定スコアのまま
                let targets: Vec<&mut Item> = batch
                    .iter_mut()
                    .filter(|(_, fallback)| !fallback)
                    .map(|(item, _)| item)
                    .collect();
                let entries: Vec<BatchEntry> = targets
                    .iter()
                    .map(|item| BatchEntry::new(item.priority_score, item.text.has_text()))
                    .collect();
                let before: Vec<f64> = entries.iter().map(|e| e.raw).collect();
                let after = normalize_batch(&entries, rng);

                for (item, score) in targets.into_iter().zip(&after) {
                    item.priority_score = *score;
                }
                report.stats = Some(NormalizationStats::from_scores(&before, &after));
                items.extend(batch.into_iter().map(|(item, _)| item).collect())?;
            }
            BatchNormalizationPolicy::Population => {
                // 追加後のアクティブ集合全体で再配置
                items.extend(batch.into_iter().map(|(item, _)| item).collect())?;
                report.stats = Some(items.rebalance_active(now));
            }
        }

        report.processed = ids.len();
        report.item_ids = ids;
        Ok(())
    }

    fn process_one<R: Rng + ?Sized>(
        &self,
        image: &ImageInfo,
        fingerprint: &str,
        text: Result<(TextContent, Option<String>)>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Processed {
        let path = image.path_key();

        let (text, warning) = match text {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{}: {}", image.file_name, e);
                let text = match e {
                    TriageError::ImageLoad(_) => TextContent::ImageUnreadable,
                    _ => TextContent::ProcessingFailed,
                };
                let mut item = Item::fallback(&image.file_name, path, text, now);
                item.fingerprint = fingerprint.to_string();
                item.captured_at = image.date.clone();
                return Processed {
                    item,
                    fallback: true,
                    warning: Some(format!("{}: {}", image.file_name, e)),
                };
            }
        };

        let (urgency, action) = match &text {
            TextContent::Extracted(body) => {
                let scores = self.analyzer.analyze(body);
                (scores.urgency, scores.action)
            }
            _ => {
                let (low, high) = NO_TEXT_SIGNAL_RANGE;
                (rng.gen_range(low..high), rng.gen_range(low..high))
            }
        };

        let raw = score_item(urgency, action);
        log::debug!(
            "{}: urgency={:.2} action={:.2} raw={:.3}",
            image.file_name,
            urgency,
            action,
            raw
        );

        let mut item = Item::new(&image.file_name, path, text, urgency, action, raw, now);
        item.fingerprint = fingerprint.to_string();
        item.captured_at = image.date.clone();

        Processed {
            item,
            fallback: false,
            warning,
        }
    }

    /// 画像からテキストを得る（OCR失敗はセンチネル、画像不良はエラー）
    async fn read_text(&self, path: &Path) -> Result<(TextContent, Option<String>)> {
        let owned = path.to_path_buf();
        let max_size = self.options.max_image_size;
        let prepared = tokio::task::spawn_blocking(move || preprocess::prepare_image(&owned, max_size))
            .await
            .map_err(|e| TriageError::Io(std::io::Error::other(e)))??;

        match self.ocr.extract_text(prepared.path()).await {
            Ok(raw) => Ok((TextContent::from_ocr(&raw), None)),
            Err(e @ (TriageError::Ocr(_) | TriageError::OcrTimeout(_))) => {
                log::warn!("OCR failed for {}: {}", path.display(), e);
                Ok((TextContent::OcrFailed, Some(format!("{}: {}", path.display(), e))))
            }
            Err(e) => Err(e),
        }
    }
}

/// パス・内容が既存またはバッチ内で重複する画像を除外
fn dedupe(
    images: Vec<ImageInfo>,
    items: &ItemCollection,
    report: &mut IngestReport,
) -> Vec<(ImageInfo, String)> {
    let fingerprints = scanner::fingerprint_all(&images);
    let mut seen_paths = HashSet::new();
    let mut seen_prints = HashSet::new();
    let mut candidates = Vec::new();

    for (image, fingerprint) in images.into_iter().zip(fingerprints) {
        let path = image.path_key();
        if items.contains_path(&path) || !seen_paths.insert(path) {
            report.skipped_duplicates += 1;
            continue;
        }

        let fingerprint = match fingerprint {
            Ok(fp) => fp,
            Err(e) => {
                report.warnings.push(format!("{}: {}", image.file_name, e));
                String::new()
            }
        };
        if !fingerprint.is_empty()
            && (items.contains_fingerprint(&fingerprint) || !seen_prints.insert(fingerprint.clone()))
        {
            report.skipped_duplicates += 1;
            continue;
        }

        candidates.push((image, fingerprint));
    }

    candidates
}
