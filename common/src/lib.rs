//! Screenshot Triage Common Library
//!
//! OCRテキストの信号解析、優先度算出、バッチ正規化、一覧表示、
//! ライフサイクル管理。I/O を持たない同期コア。

pub mod error;
pub mod lifecycle;
pub mod normalizer;
pub mod scoring;
pub mod signals;
pub mod types;
pub mod view;

pub use error::{Error, Result};
pub use lifecycle::ItemCollection;
pub use normalizer::{
    normalize, normalize_batch, normalize_population, BatchEntry, BatchNormalizationPolicy,
    NormalizationStats,
};
pub use scoring::score_item;
pub use signals::{AnalyzerKind, SignalAnalyzer, SignalScores};
pub use types::{truncate_text, Item, ItemState, TextContent};
pub use view::{active_items, deferred_items, dismissed_items};
