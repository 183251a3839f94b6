//! OCR前の画像検証と縮小
//!
//! 画像として開けることを確認し、最大辺が上限を超える場合は縮小した一時コピーを作る。
//! 元ファイルは変更しない。一時コピーは `PreparedImage` の破棄時に削除される。

use crate::error::{Result, TriageError};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// OCRに渡す画像
#[derive(Debug)]
pub struct PreparedImage {
    path: PathBuf,
    temporary: bool,
}

impl PreparedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 縮小コピーか
    pub fn is_resized(&self) -> bool {
        self.temporary
    }
}

impl Drop for PreparedImage {
    fn drop(&mut self) {
        if self.temporary {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::warn!("failed to remove temp image {}: {}", self.path.display(), e);
            }
        }
    }
}

/// 画像を検証し、必要なら縮小コピーを作成
pub fn prepare_image(path: &Path, max_size: u32) -> Result<PreparedImage> {
    let img = image::open(path)
        .map_err(|e| TriageError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let (width, height) = img.dimensions();
    if width <= max_size && height <= max_size {
        return Ok(PreparedImage {
            path: path.to_path_buf(),
            temporary: false,
        });
    }

    // アスペクト比を保って最大辺を max_size に
    let resized = img.resize(max_size, max_size, FilterType::Lanczos3);
    log::debug!(
        "resized {} from {}x{} to {}x{}",
        path.display(),
        width,
        height,
        resized.width(),
        resized.height()
    );

    let temp_path = std::env::temp_dir().join(format!("screenshot-triage-{}.png", Uuid::new_v4()));
    DynamicImage::ImageRgba8(resized.to_rgba8())
        .save(&temp_path)
        .map_err(|e| TriageError::ImageLoad(format!("縮小画像の保存に失敗: {}", e)))?;

    Ok(PreparedImage {
        path: temp_path,
        temporary: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::tempdir;

    #[test]
    fn test_small_image_used_as_is() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("small.png");
        RgbImage::new(100, 50).save(&path).unwrap();

        let prepared = prepare_image(&path, 1500).unwrap();
        assert!(!prepared.is_resized());
        assert_eq!(prepared.path(), path.as_path());
    }

    #[test]
    fn test_large_image_downscaled_to_temp_copy() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("large.png");
        RgbImage::new(400, 200).save(&path).unwrap();

        let prepared = prepare_image(&path, 100).unwrap();
        assert!(prepared.is_resized());
        let temp = prepared.path().to_path_buf();
        let (w, h) = image::open(&temp).unwrap().dimensions();
        assert_eq!((w, h), (100, 50));

        // 元画像は変更されない
        assert_eq!(image::open(&path).unwrap().dimensions(), (400, 200));

        drop(prepared);
        assert!(!temp.exists());
    }

    #[test]
    fn test_unreadable_image() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let result = prepare_image(&path, 1500);
        assert!(matches!(result, Err(TriageError::ImageLoad(_))));
    }
}
