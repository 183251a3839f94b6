//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Ambiguous id prefix: {0}")]
    AmbiguousId(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Pattern engine error: {0}")]
    Pattern(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
