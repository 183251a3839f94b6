//! 優先度のバッチ正規化モジュール
//!
//! 生優先度はバッチごとに分布が偏るため、一覧で比較できる帯域 [0.1, 0.9] に
//! 再配置する。順位は保ちつつ、極端な値への張り付きを防ぐ。
//!
//! ## ポリシー
//! - Stratified（既定）: 新規バッチをテキストあり/なしに分けて再配置
//! - Population: アクティブ集合全体を z スコアで再配置（`rebalance` 用）

pub mod population;
pub mod stratified;

pub use population::normalize_population;
pub use stratified::normalize_batch;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// 正規化後の下限
pub const MIN_PRIORITY: f64 = 0.1;
/// 正規化後の上限
pub const MAX_PRIORITY: f64 = 0.9;
/// 目標平均
pub const TARGET_MEAN: f64 = 0.5;

/// 正規化ポリシー
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchNormalizationPolicy {
    #[default]
    Stratified,
    Population,
}

impl std::str::FromStr for BatchNormalizationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stratified" | "batch" => Ok(BatchNormalizationPolicy::Stratified),
            "population" | "zscore" => Ok(BatchNormalizationPolicy::Population),
            _ => Err(format!(
                "Unknown normalization policy: {}. Use stratified or population",
                s
            )),
        }
    }
}

impl std::fmt::Display for BatchNormalizationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchNormalizationPolicy::Stratified => write!(f, "stratified"),
            BatchNormalizationPolicy::Population => write!(f, "population"),
        }
    }
}

/// 正規化対象（生優先度とテキスト有無）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchEntry {
    pub raw: f64,
    pub has_text: bool,
}

impl BatchEntry {
    pub fn new(raw: f64, has_text: bool) -> Self {
        Self { raw, has_text }
    }
}

/// 正規化の統計情報
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizationStats {
    /// 処理した件数
    pub count: usize,
    pub mean_before: f64,
    pub mean_after: f64,
    pub min_after: f64,
    pub max_after: f64,
}

impl NormalizationStats {
    pub fn from_scores(before: &[f64], after: &[f64]) -> Self {
        Self {
            count: after.len(),
            mean_before: mean(before).unwrap_or_default(),
            mean_after: mean(after).unwrap_or_default(),
            min_after: after.iter().copied().fold(f64::NAN, f64::min),
            max_after: after.iter().copied().fold(f64::NAN, f64::max),
        }
    }
}

/// ポリシーに従ってバッチを正規化（入力と同じ順序で返す）
pub fn normalize<R: Rng + ?Sized>(
    policy: BatchNormalizationPolicy,
    entries: &[BatchEntry],
    rng: &mut R,
) -> Vec<f64> {
    match policy {
        BatchNormalizationPolicy::Stratified => normalize_batch(entries, rng),
        BatchNormalizationPolicy::Population => {
            let raw: Vec<f64> = entries.iter().map(|e| e.raw).collect();
            normalize_population(&raw)
        }
    }
}

/// 運用帯域 [0.1, 0.9] に丸める
pub fn clamp_priority(score: f64) -> f64 {
    score.clamp(MIN_PRIORITY, MAX_PRIORITY)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "Stratified".parse::<BatchNormalizationPolicy>().unwrap(),
            BatchNormalizationPolicy::Stratified
        );
        assert_eq!(
            "zscore".parse::<BatchNormalizationPolicy>().unwrap(),
            BatchNormalizationPolicy::Population
        );
        assert!("minmax".parse::<BatchNormalizationPolicy>().is_err());
    }

    #[test]
    fn test_policy_serde_lowercase() {
        let json = serde_json::to_string(&BatchNormalizationPolicy::Population).unwrap();
        assert_eq!(json, "\"population\"");
    }

    #[test]
    fn test_normalize_dispatches_population() {
        let entries: Vec<BatchEntry> = [0.2, 0.5, 0.8]
            .iter()
            .map(|&raw| BatchEntry::new(raw, true))
            .collect();
        let mut rng = StdRng::seed_from_u64(1);
        let scores = normalize(BatchNormalizationPolicy::Population, &entries, &mut rng);
        assert_eq!(scores, normalize_population(&[0.2, 0.5, 0.8]));
    }

    #[test]
    fn test_normalize_empty_batch() {
        let mut rng = StdRng::seed_from_u64(1);
        for policy in [BatchNormalizationPolicy::Stratified, BatchNormalizationPolicy::Population] {
            assert!(normalize(policy, &[], &mut rng).is_empty());
        }
    }

    #[test]
    fn test_stats_from_scores() {
        let stats = NormalizationStats::from_scores(&[0.2, 0.4], &[0.3, 0.7]);
        assert_eq!(stats.count, 2);
        assert!((stats.mean_before - 0.3).abs() < 1e-9);
        assert!((stats.mean_after - 0.5).abs() < 1e-9);
        assert_eq!(stats.min_after, 0.3);
        assert_eq!(stats.max_after, 0.7);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), None);
    }
}
