//! 統合テスト用ヘルパー

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use screenshot_triage::error::Result;
use screenshot_triage::ocr::OcrEngine;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

/// ファイル名ごとに決まったテキストを返すOCR（未登録は空文字列）
#[derive(Default)]
pub struct ScriptedOcr {
    texts: HashMap<String, String>,
}

impl ScriptedOcr {
    pub fn with(mut self, file_name: &str, text: &str) -> Self {
        self.texts.insert(file_name.to_string(), text.to_string());
        self
    }
}

impl OcrEngine for ScriptedOcr {
    fn extract_text(&self, path: &Path) -> impl Future<Output = Result<String>> + Send {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let text = self.texts.get(&name).cloned().unwrap_or_default();
        async move { Ok(text) }
    }
}

/// 単色のPNGを作成（色を変えれば内容も変わる）
pub fn write_png(dir: &Path, name: &str, shade: u8) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(16, 16, Rgb([shade, 255 - shade, shade / 2]))
        .save(&path)
        .expect("Failed to write png");
    path
}
