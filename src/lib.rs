//! screenshot-triage
//!
//! スクリーンショットをOCRし、緊急度・行動必要度から優先度を付けて一覧化する。
//! 解析・正規化のコアは `triage_common`、このクレートは取り込みと永続化を担う。

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod ocr;
pub mod preprocess;
pub mod scanner;
pub mod store;
pub mod upload;
