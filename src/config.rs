use crate::error::{Result, TriageError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use triage_common::{AnalyzerKind, BatchNormalizationPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 再スキャン対象のフォルダ
    pub screenshot_folders: Vec<PathBuf>,
    /// アップロードの一時保存先
    pub uploads_folder: PathBuf,
    pub store_path: PathBuf,
    pub tesseract_command: String,
    pub tesseract_args: Vec<String>,
    pub ocr_timeout_secs: u64,
    /// OCR前に縮小する最大辺（px）
    pub max_image_size: u32,
    pub default_defer_minutes: i64,
    pub analyzer: AnalyzerKind,
    pub normalization: BatchNormalizationPolicy,
    pub upload_expiry_hours: u64,
    pub ingest_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| TriageError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("screenshot-triage").join("config.json"))
    }

    fn default_config() -> Self {
        let store_path = dirs::data_local_dir()
            .map(|dir| dir.join("screenshot-triage").join("items.json"))
            .unwrap_or_else(|| PathBuf::from("triage-items.json"));

        Self {
            screenshot_folders: vec![PathBuf::from("screenshots"), PathBuf::from("documents")],
            uploads_folder: PathBuf::from("uploads"),
            store_path,
            tesseract_command: "tesseract".into(),
            tesseract_args: ["--oem", "3", "--psm", "6", "-l", "eng"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ocr_timeout_secs: 10,
            max_image_size: 1500,
            default_defer_minutes: 24 * 60,
            analyzer: AnalyzerKind::default(),
            normalization: BatchNormalizationPolicy::default(),
            upload_expiry_hours: 8,
            ingest_batch_size: 10,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.ocr_timeout_secs == 0 {
            return Err(TriageError::Config("ocr_timeout_secs は1以上にしてください".into()));
        }
        if self.ingest_batch_size == 0 {
            return Err(TriageError::Config("ingest_batch_size は1以上にしてください".into()));
        }
        if self.max_image_size == 0 {
            return Err(TriageError::Config("max_image_size は1以上にしてください".into()));
        }
        if self.default_defer_minutes <= 0 {
            return Err(TriageError::Config("default_defer_minutes は1以上にしてください".into()));
        }
        self.default_defer()?;
        Ok(())
    }

    /// `KEY=VALUE` 形式で1項目を更新
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| TriageError::Config(format!("KEY=VALUE 形式で指定してください: {}", assignment)))?;
        let key = key.trim();
        let value = value.trim();

        match key {
            "screenshot_folders" => {
                self.screenshot_folders = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
                    .collect();
            }
            "uploads_folder" => self.uploads_folder = PathBuf::from(value),
            "store_path" => self.store_path = PathBuf::from(value),
            "tesseract_command" => self.tesseract_command = value.to_string(),
            "tesseract_args" => {
                self.tesseract_args = value.split_whitespace().map(|s| s.to_string()).collect();
            }
            "ocr_timeout_secs" => self.ocr_timeout_secs = parse_number(key, value)?,
            "max_image_size" => self.max_image_size = parse_number(key, value)?,
            "default_defer_minutes" => self.default_defer_minutes = parse_number(key, value)?,
            "analyzer" => self.analyzer = value.parse().map_err(TriageError::Config)?,
            "normalization" => self.normalization = value.parse().map_err(TriageError::Config)?,
            "upload_expiry_hours" => self.upload_expiry_hours = parse_number(key, value)?,
            "ingest_batch_size" => self.ingest_batch_size = parse_number(key, value)?,
            _ => return Err(TriageError::Config(format!("不明な設定項目: {}", key))),
        }

        self.validate()
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    pub fn default_defer(&self) -> Result<chrono::Duration> {
        defer_minutes(self.default_defer_minutes)
    }

    pub fn upload_expiry(&self) -> Duration {
        Duration::from_secs(self.upload_expiry_hours * 60 * 60)
    }
}

/// 延期できる最大日数
const MAX_DEFER_DAYS: i64 = 3650;

/// 延期分数を期間に変換（1分〜最大日数の範囲外はエラー）
pub fn defer_minutes(minutes: i64) -> Result<chrono::Duration> {
    chrono::Duration::try_minutes(minutes)
        .filter(|d| *d > chrono::Duration::zero() && *d <= chrono::Duration::days(MAX_DEFER_DAYS))
        .filter(|d| Utc::now().checked_add_signed(*d).is_some())
        .ok_or_else(|| TriageError::Config(format!("延期時間が不正です: {}分", minutes)))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| TriageError::Config(format!("{} の値が不正です: {}", key, value)))
}
