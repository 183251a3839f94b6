//! 項目スコア（正規化前の生優先度）

/// 緊急度の重み
pub const URGENCY_WEIGHT: f64 = 0.6;
/// 行動必要度の重み
pub const ACTION_WEIGHT: f64 = 0.4;

/// 緊急度と行動必要度から生優先度を算出
pub fn score_item(urgency: f64, action: f64) -> f64 {
    urgency * URGENCY_WEIGHT + action * ACTION_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_item_weights() {
        for &(u, a) in &[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (0.15, 0.15), (0.95, 0.39), (1.0, 0.95)] {
            assert_eq!(score_item(u, a), u * 0.6 + a * 0.4);
        }
    }

    #[test]
    fn test_urgency_dominates() {
        assert!(score_item(0.8, 0.2) > score_item(0.2, 0.8));
    }

    #[test]
    fn test_bounds_from_analyzer_range() {
        assert_eq!(score_item(0.0, 0.0), 0.0);
        assert!(score_item(0.95, 0.95) <= 0.95 + 1e-12);
        assert!(score_item(1.0, 0.95) <= 1.0);
    }
}
