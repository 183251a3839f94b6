//! テキスト信号解析モジュール
//!
//! OCRテキストから緊急度（urgency）と行動必要度（action）を [0, 1] で算出する。
//!
//! ## 戦略
//! 1. パターン: トークン列パターン + 日付表現による緊急度の上書き
//! 2. キーワード: 部分一致（パターンエンジンが使えない・失敗した場合）
//!
//! どちらも `min(0.95, 0.15 + 件数 * 重み * 長さ係数)` で点数化する。

pub mod date;
pub mod keyword;
pub mod pattern;
pub mod tokens;

pub use pattern::{MatchCounts, PatternEngine, SignalLabel, TokenPattern, TokenSpec};

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// 非空テキストの最低点
pub const BASE_SCORE: f64 = 0.15;
/// 件数由来の上限（日付による上書きのみ 1.0 に届く）
pub const COUNT_CAP: f64 = 0.95;
pub const URGENCY_MATCH_WEIGHT: f64 = 0.15;
pub const ACTION_MATCH_WEIGHT: f64 = 0.12;
/// 長さ係数の基準文字数
pub const LENGTH_NORM_CHARS: f64 = 300.0;

/// 解析戦略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    #[default]
    Pattern,
    Keyword,
}

impl std::str::FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pattern" | "nlp" => Ok(AnalyzerKind::Pattern),
            "keyword" | "fallback" => Ok(AnalyzerKind::Keyword),
            _ => Err(format!("Unknown analyzer: {}. Use pattern or keyword", s)),
        }
    }
}

impl std::fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerKind::Pattern => write!(f, "pattern"),
            AnalyzerKind::Keyword => write!(f, "keyword"),
        }
    }
}

/// 解析結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalScores {
    pub urgency: f64,
    pub action: f64,
}

/// 長さ係数: 短文は1件あたりの重みを抑え、長文は頭打ち
pub fn length_factor(text: &str) -> f64 {
    (text.chars().count() as f64 / LENGTH_NORM_CHARS).clamp(0.5, 1.0)
}

fn counted_score(count: f64, weight: f64, length_factor: f64) -> f64 {
    (BASE_SCORE + count * weight * length_factor).min(COUNT_CAP)
}

/// テキスト信号アナライザ
///
/// パターンエンジンの構築に失敗した場合はキーワード解析のみで動く。
#[derive(Debug, Clone)]
pub struct SignalAnalyzer {
    engine: Option<PatternEngine>,
}

impl SignalAnalyzer {
    pub fn new(kind: AnalyzerKind) -> Self {
        match kind {
            AnalyzerKind::Keyword => Self::keyword_only(),
            AnalyzerKind::Pattern => match PatternEngine::new() {
                Ok(engine) => Self::with_engine(engine),
                Err(e) => {
                    log::warn!("pattern engine unavailable, using keyword analysis: {}", e);
                    Self::keyword_only()
                }
            },
        }
    }

    pub fn with_engine(engine: PatternEngine) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    pub fn keyword_only() -> Self {
        Self { engine: None }
    }

    /// 実際に使われる戦略
    pub fn kind(&self) -> AnalyzerKind {
        if self.engine.is_some() {
            AnalyzerKind::Pattern
        } else {
            AnalyzerKind::Keyword
        }
    }

    /// テキストを解析（失敗しない）
    ///
    /// 呼び出し側は空白のみのテキストを渡さないこと（テキストなしとして別扱い）。
    pub fn analyze(&self, text: &str) -> SignalScores {
        if let Some(engine) = &self.engine {
            match analyze_with_patterns(engine, text) {
                Ok(scores) => return scores,
                Err(e) => log::warn!("pattern analysis failed, using keyword analysis: {}", e),
            }
        }

        analyze_with_keywords(text)
    }
}

impl Default for SignalAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerKind::Pattern)
    }
}

fn analyze_with_patterns(engine: &PatternEngine, text: &str) -> Result<SignalScores, Error> {
    let counts = engine.count(text)?;
    let factor = length_factor(text);
    let date_urgency = date::date_urgency(&tokens::tokenize(text), text);

    let urgency = counted_score(counts.urgency as f64, URGENCY_MATCH_WEIGHT, factor)
        .max(date_urgency)
        .min(1.0);
    let action = counted_score(counts.action as f64, ACTION_MATCH_WEIGHT, factor);

    log::debug!(
        "pattern analysis: urgency={:.2} (matches={}, date={:.2}), action={:.2} (matches={})",
        urgency,
        counts.urgency,
        date_urgency,
        action,
        counts.action
    );

    Ok(SignalScores { urgency, action })
}

fn analyze_with_keywords(text: &str) -> SignalScores {
    let counts = keyword::keyword_counts(text);
    let factor = length_factor(text);

    let scores = SignalScores {
        urgency: counted_score(counts.urgency, URGENCY_MATCH_WEIGHT, factor),
        action: counted_score(counts.action, ACTION_MATCH_WEIGHT, factor),
    };

    log::debug!(
        "keyword analysis: urgency={:.2}, action={:.2}",
        scores.urgency,
        scores.action
    );

    scores
}
