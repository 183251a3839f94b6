//! 画像ファイルのスキャン
//!
//! 対象フォルダ直下の画像を列挙し、重複判定用のフィンガープリントを付与する。

mod exif;

use crate::error::{Result, TriageError};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
    /// EXIF撮影日時
    pub date: Option<String>,
}

impl ImageInfo {
    pub fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            file_name,
            date: exif::extract_date(path).ok(),
        }
    }

    /// ストアで照合に使うパス文字列
    pub fn path_key(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// 受け付ける拡張子（小文字）
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "webp"];

/// 対応する画像拡張子か（大文字小文字を区別しない）
pub fn is_image_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_image_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(TriageError::FolderNotFound(folder.display().to_string()));
    }

    let mut images: Vec<ImageInfo> = WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.path().is_file() && is_image_file(entry.path()))
        .map(|entry| ImageInfo::from_path(entry.path()))
        .collect();

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 複数フォルダをスキャン（存在しないフォルダは警告して飛ばす、パス重複は除外）
pub fn scan_folders(folders: &[PathBuf]) -> Vec<ImageInfo> {
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for folder in folders {
        match scan_folder(folder) {
            Ok(found) => {
                log::info!("{}: {} images", folder.display(), found.len());
                images.extend(found.into_iter().filter(|img| seen.insert(img.path.clone())));
            }
            Err(e) => log::warn!("skip folder: {}", e),
        }
    }

    images
}

/// ファイル内容のSHA-256（16進）
pub fn compute_fingerprint(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// 全画像のフィンガープリントを並列計算（入力と同じ順序）
pub fn fingerprint_all(images: &[ImageInfo]) -> Vec<Result<String>> {
    images
        .par_iter()
        .map(|img| compute_fingerprint(&img.path))
        .collect()
}
