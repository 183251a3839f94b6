//! スクリーンショット項目の型定義
//!
//! CLIとストアで共有される型:
//! - TextContent: OCRテキスト、またはセンチネル（テキストなし・失敗）
//! - Item: 優先度付きのスクリーンショット記録
//! - ItemState: 表示上の状態（Active / Deferred / Dismissed）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// OCRでテキストが得られなかった場合のセンチネル
pub const NO_TEXT_SENTINEL: &str = "[No text detected]";
/// OCR実行自体が失敗・タイムアウトした場合のセンチネル
pub const OCR_FAILED_SENTINEL: &str = "[OCR failed]";
/// 画像として開けなかった場合のセンチネル
pub const IMAGE_UNREADABLE_SENTINEL: &str = "[Error: Could not process image]";
/// 処理中の想定外エラーで作られたフォールバック記録のセンチネル
pub const PROCESSING_FAILED_SENTINEL: &str = "[Error during processing]";

/// フォールバック記録の固定スコア
pub const FALLBACK_PRIORITY: f64 = 0.3;
pub const FALLBACK_URGENCY: f64 = 0.2;
pub const FALLBACK_ACTION: f64 = 0.2;

/// 抽出テキスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextContent {
    /// OCRで抽出された本文
    Extracted(String),
    NoTextDetected,
    OcrFailed,
    ImageUnreadable,
    ProcessingFailed,
}

impl TextContent {
    /// OCR結果から生成（空白のみなら NoTextDetected）
    pub fn from_ocr(raw: &str) -> Self {
        if raw.trim().is_empty() {
            TextContent::NoTextDetected
        } else {
            TextContent::Extracted(raw.to_string())
        }
    }

    /// 保存用文字列から復元
    ///
    /// センチネル文字列に一致しないものは本文として扱う。
    pub fn from_stored(value: &str) -> Self {
        match value {
            NO_TEXT_SENTINEL => TextContent::NoTextDetected,
            OCR_FAILED_SENTINEL => TextContent::OcrFailed,
            IMAGE_UNREADABLE_SENTINEL => TextContent::ImageUnreadable,
            PROCESSING_FAILED_SENTINEL => TextContent::ProcessingFailed,
            other => TextContent::from_ocr(other),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TextContent::Extracted(text) => text,
            TextContent::NoTextDetected => NO_TEXT_SENTINEL,
            TextContent::OcrFailed => OCR_FAILED_SENTINEL,
            TextContent::ImageUnreadable => IMAGE_UNREADABLE_SENTINEL,
            TextContent::ProcessingFailed => PROCESSING_FAILED_SENTINEL,
        }
    }

    /// 実テキストを持つか
    pub fn has_text(&self) -> bool {
        matches!(self, TextContent::Extracted(_))
    }

    /// フォールバック記録（固定スコア）に対応するセンチネルか
    pub fn is_failure_record(&self) -> bool {
        matches!(self, TextContent::ImageUnreadable | TextContent::ProcessingFailed)
    }
}

impl fmt::Display for TextContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 表示上の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemState {
    Active,
    Deferred,
    Dismissed,
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemState::Active => write!(f, "active"),
            ItemState::Deferred => write!(f, "deferred"),
            ItemState::Dismissed => write!(f, "dismissed"),
        }
    }
}

/// スクリーンショット記録
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub file_name: String,
    /// 画像ファイルのパス
    pub path: String,
    /// ファイル内容のSHA-256（再スキャン時の重複判定用）
    pub fingerprint: String,
    /// 撮影日時（EXIF DateTimeOriginal）
    pub captured_at: Option<String>,
    pub text: TextContent,
    pub urgency_score: f64,
    pub action_score: f64,
    /// 並び順のキー（正規化後の値）
    pub priority_score: f64,
    pub dismissed: bool,
    pub deferred_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// 新しい項目を作成
    ///
    /// urgency / action は [0, 1] に丸める。
    pub fn new(
        file_name: impl Into<String>,
        path: impl Into<String>,
        text: TextContent,
        urgency: f64,
        action: f64,
        priority: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            path: path.into(),
            fingerprint: String::new(),
            captured_at: None,
            text,
            urgency_score: urgency.clamp(0.0, 1.0),
            action_score: action.clamp(0.0, 1.0),
            priority_score: priority,
            dismissed: false,
            deferred_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 処理失敗時のフォールバック記録
    pub fn fallback(
        file_name: impl Into<String>,
        path: impl Into<String>,
        text: TextContent,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            file_name,
            path,
            text,
            FALLBACK_URGENCY,
            FALLBACK_ACTION,
            FALLBACK_PRIORITY,
            now,
        )
    }

    /// 延期期間中か
    pub fn is_deferred_at(&self, now: DateTime<Utc>) -> bool {
        self.deferred_until.is_some_and(|until| until > now)
    }

    /// 一覧に表示すべきか（非表示でなく、延期期間外）
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.dismissed && !self.is_deferred_at(now)
    }

    pub fn state_at(&self, now: DateTime<Utc>) -> ItemState {
        if self.dismissed {
            ItemState::Dismissed
        } else if self.is_deferred_at(now) {
            ItemState::Deferred
        } else {
            ItemState::Active
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// テキストを指定文字数で切り詰める（超過時は "..." を付与）
pub fn truncate_text(text: &str, length: usize) -> String {
    if text.chars().count() > length {
        let head: String = text.chars().take(length).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
