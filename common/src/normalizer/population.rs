//! 母集団 z スコアによる再配置
//!
//! `0.5 + z * 0.15` を [0.1, 0.9] に丸める。3件未満、または全件同値の場合は変更しない。

use super::{clamp_priority, mean, TARGET_MEAN};

/// 正規化に必要な最小件数
pub const MIN_POPULATION: usize = 3;
/// z=1 あたりの幅
pub const Z_SPREAD: f64 = 0.15;
/// これ以下の標準偏差は 0 とみなす（同値の浮動小数誤差対策）
const SIGMA_EPSILON: f64 = 1e-12;

pub fn normalize_population(scores: &[f64]) -> Vec<f64> {
    if scores.len() < MIN_POPULATION {
        return scores.to_vec();
    }

    let Some(mu) = mean(scores) else {
        return Vec::new();
    };
    let variance = scores.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / scores.len() as f64;
    let sigma = variance.sqrt();

    if sigma <= SIGMA_EPSILON {
        log::debug!("population normalization skipped: sigma is zero");
        return scores.to_vec();
    }

    scores
        .iter()
        .map(|x| clamp_priority(TARGET_MEAN + (x - mu) / sigma * Z_SPREAD))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::{MAX_PRIORITY, MIN_PRIORITY};

    #[test]
    fn test_too_few_items_unchanged() {
        assert_eq!(normalize_population(&[]), Vec::<f64>::new());
        assert_eq!(normalize_population(&[0.9]), vec![0.9]);
        assert_eq!(normalize_population(&[0.1, 0.95]), vec![0.1, 0.95]);
    }

    #[test]
    fn test_identical_scores_unchanged() {
        let scores = vec![0.42; 5];
        let normalized = normalize_population(&scores);
        assert_eq!(normalized, scores);
        assert!(normalized.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_identical_tenths_unchanged() {
        // 0.1 の和は丸め誤差が出やすい
        let scores = vec![0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1];
        assert_eq!(normalize_population(&scores), scores);
    }

    #[test]
    fn test_recenters_to_half() {
        let normalized = normalize_population(&[0.2, 0.3, 0.4]);
        // z = -1.2247, 0, 1.2247
        assert!((normalized[1] - 0.5).abs() < 1e-9);
        assert!((normalized[0] - (0.5 - 1.224744871 * 0.15)).abs() < 1e-6);
        assert!((normalized[2] - (0.5 + 1.224744871 * 0.15)).abs() < 1e-6);
    }

    #[test]
    fn test_preserves_order_and_clamps() {
        let raw = [0.05, 0.3, 0.31, 0.32, 0.33, 0.95];
        let normalized = normalize_population(&raw);
        for w in normalized.windows(2) {
            assert!(w[0] <= w[1]);
        }
        for s in &normalized {
            assert!((MIN_PRIORITY..=MAX_PRIORITY).contains(s));
        }
    }

    #[test]
    fn test_outlier_clamped() {
        let mut raw = vec![0.3; 20];
        raw.push(0.95);
        let normalized = normalize_population(&raw);
        assert_eq!(*normalized.last().unwrap(), MAX_PRIORITY);
    }

    #[test]
    fn test_applying_twice_keeps_mean_near_half() {
        let raw = [0.12, 0.2, 0.33, 0.35, 0.5, 0.61, 0.7, 0.9, 0.91];
        let once = normalize_population(&raw);
        let twice = normalize_population(&once);

        let mean_once = mean(&once).unwrap();
        let mean_twice = mean(&twice).unwrap();
        assert!((mean_once - 0.5).abs() < 0.05, "mean once {}", mean_once);
        assert!((mean_twice - 0.5).abs() < 0.05, "mean twice {}", mean_twice);
        for s in &twice {
            assert!((MIN_PRIORITY..=MAX_PRIORITY).contains(s));
        }
    }
}
