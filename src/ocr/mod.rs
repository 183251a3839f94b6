//! OCR実行モジュール
//!
//! 外部の tesseract プロセスで画像からテキストを抽出する。
//! タイムアウト時は子プロセスを終了させ、`TriageError::OcrTimeout` を返す。

use crate::config::Config;
use crate::error::{Result, TriageError};
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// テキスト抽出エンジン
pub trait OcrEngine: Send + Sync {
    /// 画像の生テキストを返す（空文字列はテキストなし）
    fn extract_text(&self, path: &Path) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Clone)]
pub struct TesseractOcr {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.tesseract_command.clone(),
            config.tesseract_args.clone(),
            config.ocr_timeout(),
        )
    }

    async fn run(&self, path: &Path) -> Result<String> {
        // tesseract <image> stdout <args...>
        let child = Command::new(&self.command)
            .arg(path)
            .arg("stdout")
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TriageError::Ocr(format!("{} を起動できません: {}", self.command, e)))?;

        // タイムアウトで future が破棄されると kill_on_drop により子プロセスも終了する
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => return Err(TriageError::OcrTimeout(self.timeout.as_secs())),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TriageError::Ocr(format!(
                "{} failed (code {:?}): {}",
                self.command,
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrEngine for TesseractOcr {
    fn extract_text(&self, path: &Path) -> impl Future<Output = Result<String>> + Send {
        self.run(path)
    }
}
