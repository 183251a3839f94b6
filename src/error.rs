use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("OCR実行エラー: {0}")]
    Ocr(String),

    #[error("OCRがタイムアウトしました ({0}秒)")]
    OcrTimeout(u64),

    #[error("ストアエラー: {0}")]
    Store(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error(transparent)]
    Core(#[from] triage_common::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;
