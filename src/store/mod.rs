//! 項目ストア（JSONファイル）
//!
//! 保存形式は `StoredItem` として明示的に定義し、ドメイン型 `Item` との変換は
//! `From` / `TryFrom` で行う。必須フィールドが欠けたファイルは読み込みエラーにする。

use crate::error::{Result, TriageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use triage_common::{Item, ItemCollection, TextContent};
use uuid::Uuid;

/// 保存ファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    items: Vec<StoredItem>,
}

impl StoreFile {
    pub const CURRENT_VERSION: u32 = 1;
}

/// 保存用の項目レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    pub id: String,
    pub file_name: String,
    pub path: String,
    pub fingerprint: String,
    #[serde(default)]
    pub captured_at: Option<String>,
    /// 本文またはセンチネル文字列
    pub text: String,
    pub urgency_score: f64,
    pub action_score: f64,
    pub priority_score: f64,
    pub dismissed: bool,
    #[serde(default)]
    pub deferred_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Item> for StoredItem {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            file_name: item.file_name.clone(),
            path: item.path.clone(),
            fingerprint: item.fingerprint.clone(),
            captured_at: item.captured_at.clone(),
            text: item.text.as_str().to_string(),
            urgency_score: item.urgency_score,
            action_score: item.action_score,
            priority_score: item.priority_score,
            dismissed: item.dismissed,
            deferred_until: item.deferred_until,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl TryFrom<StoredItem> for Item {
    type Error = TriageError;

    fn try_from(stored: StoredItem) -> Result<Self> {
        let id = Uuid::parse_str(&stored.id)
            .map_err(|e| TriageError::Store(format!("不正なID {}: {}", stored.id, e)))?;

        Ok(Item {
            id,
            file_name: stored.file_name,
            path: stored.path,
            fingerprint: stored.fingerprint,
            captured_at: stored.captured_at,
            text: TextContent::from_stored(&stored.text),
            urgency_score: stored.urgency_score.clamp(0.0, 1.0),
            action_score: stored.action_score.clamp(0.0, 1.0),
            priority_score: stored.priority_score,
            dismissed: stored.dismissed,
            deferred_until: stored.deferred_until,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }
}

/// ファイルに永続化される項目コレクション
#[derive(Debug)]
pub struct ItemStore {
    path: PathBuf,
    items: ItemCollection,
}

impl ItemStore {
    /// ストアを開く（ファイルがなければ空）
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("store not found, starting empty: {}", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                items: ItemCollection::new(),
            });
        }

        let reader = BufReader::new(File::open(path)?);
        let file: StoreFile = serde_json::from_reader(reader)?;
        if file.version != StoreFile::CURRENT_VERSION {
            return Err(TriageError::Store(format!(
                "ストアのバージョンが不一致です (file: {}, expected: {})",
                file.version,
                StoreFile::CURRENT_VERSION
            )));
        }

        let items = file
            .items
            .into_iter()
            .map(Item::try_from)
            .collect::<Result<Vec<_>>>()?;
        log::debug!("loaded {} items from {}", items.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            items: ItemCollection::from_items(items)?,
        })
    }

    /// 保存（一時ファイルに書いてから置き換える）
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = StoreFile {
            version: StoreFile::CURRENT_VERSION,
            items: self.items.items().iter().map(StoredItem::from).collect(),
        };

        let temp_path = self.path.with_extension("json.tmp");
        {
            let writer = BufWriter::new(File::create(&temp_path)?);
            serde_json::to_writer_pretty(writer, &file)?;
        }
        std::fs::rename(&temp_path, &self.path)?;

        log::debug!("saved {} items to {}", self.items.len(), self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn items(&self) -> &ItemCollection {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut ItemCollection {
        &mut self.items
    }
}
