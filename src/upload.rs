//! アップロードの一時保存と期限切れ削除
//!
//! アップロードされたファイルは `<uuid>_<安全なファイル名>` としてアップロードフォルダに
//! コピーしてから取り込む。一時保存したファイルは一定時間で削除する。

use crate::error::Result;
use crate::scanner::{self, ImageInfo};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use triage_common::Item;
use uuid::Uuid;
use walkdir::WalkDir;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// 一時保存の結果
#[derive(Debug, Default)]
pub struct StagedUploads {
    pub images: Vec<ImageInfo>,
    /// 受け付けなかったファイルの理由
    pub warnings: Vec<String>,
}

/// ファイル名を安全な ASCII に変換
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .chars()
        .filter(|c| c.is_ascii())
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = UNSAFE_CHARS.replace_all(&joined, "");
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');

    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// ファイルをアップロードフォルダへコピー
///
/// 存在しない・対応外のファイルやコピー失敗は警告として返し、処理は続ける。
pub fn stage_uploads(files: &[PathBuf], uploads_folder: &Path) -> Result<StagedUploads> {
    std::fs::create_dir_all(uploads_folder)?;
    let mut staged = StagedUploads::default();

    for file in files {
        let original_name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if !file.is_file() {
            staged.warnings.push(format!("ファイルが見つかりません: {}", file.display()));
            continue;
        }
        if !scanner::is_image_file(file) {
            staged.warnings.push(format!("対応していないファイル形式: {}", original_name));
            continue;
        }

        let dest = uploads_folder.join(format!("{}_{}", Uuid::new_v4(), secure_filename(&original_name)));
        match std::fs::copy(file, &dest) {
            Ok(_) => {
                let mut info = ImageInfo::from_path(&dest);
                info.file_name = original_name;
                staged.images.push(info);
            }
            Err(e) => staged.warnings.push(format!("{} のコピーに失敗: {}", original_name, e)),
        }
    }

    Ok(staged)
}

/// 期限切れの一時保存ファイルを削除し、件数を返す
pub fn cleanup_expired_uploads(uploads_folder: &Path, max_age: Duration, now: SystemTime) -> Result<usize> {
    if !uploads_folder.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in WalkDir::new(uploads_folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
    {
        let modified = entry.metadata().ok().and_then(|m| m.modified().ok());
        let expired = modified
            .and_then(|m| now.duration_since(m).ok())
            .is_some_and(|age| age > max_age);

        if expired {
            match std::fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("failed to remove {}: {}", entry.path().display(), e),
            }
        }
    }

    log::info!("removed {} expired uploads", removed);
    Ok(removed)
}

/// アップロードフォルダ内にある項目の画像を削除
pub fn remove_staged_files(items: &[Item], uploads_folder: &Path) -> usize {
    items
        .iter()
        .map(|item| Path::new(&item.path))
        .filter(|path| path.starts_with(uploads_folder) && path.is_file())
        .filter(|path| std::fs::remove_file(path).is_ok())
        .count()
}
