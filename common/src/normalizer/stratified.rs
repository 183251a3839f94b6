//! テキスト有無で層別した新規バッチの再配置
//!
//! ## 処理フロー
//! 1. 1件のみ: テキストあり U[0.6, 0.7]、なし U[0.3, 0.5]（以降の処理なし）
//! 2. テキストありは min-max で [0.4, 0.9] へ（全件同値なら 0.6）
//! 3. テキストなしは U[0.2, 0.5] で引き直し
//! 4. 両方ある場合は平均 0.5 へ 70% 寄せる
//! 5. [0.1, 0.9] に丸め、±0.05 の揺らぎを加え、再度丸める

use super::{clamp_priority, mean, BatchEntry, TARGET_MEAN};
use rand::Rng;

pub const SINGLE_TEXT_RANGE: (f64, f64) = (0.6, 0.7);
pub const SINGLE_NO_TEXT_RANGE: (f64, f64) = (0.3, 0.5);
/// テキストあり群の再配置先
pub const TEXT_BAND: (f64, f64) = (0.4, 0.9);
/// テキストあり群が全件同値のときの値
pub const FLAT_TEXT_SCORE: f64 = 0.6;
pub const NO_TEXT_RANGE: (f64, f64) = (0.2, 0.5);
/// 平均への寄せの強さ
pub const MEAN_PULL: f64 = 0.7;
/// 同点崩しの揺らぎ幅
pub const JITTER: f64 = 0.05;

/// 新規バッチを正規化（入力と同じ順序で返す）
pub fn normalize_batch<R: Rng + ?Sized>(entries: &[BatchEntry], rng: &mut R) -> Vec<f64> {
    match entries {
        [] => Vec::new(),
        [single] => {
            let (low, high) = if single.has_text {
                SINGLE_TEXT_RANGE
            } else {
                SINGLE_NO_TEXT_RANGE
            };
            vec![rng.gen_range(low..high)]
        }
        _ => normalize_multi(entries, rng),
    }
}

fn normalize_multi<R: Rng + ?Sized>(entries: &[BatchEntry], rng: &mut R) -> Vec<f64> {
    let text_raw: Vec<f64> = entries
        .iter()
        .filter(|e| e.has_text)
        .map(|e| e.raw)
        .collect();
    let text_min = text_raw.iter().copied().fold(f64::INFINITY, f64::min);
    let text_max = text_raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let text_flat = text_max - text_min <= f64::EPSILON;

    let has_text_group = !text_raw.is_empty();
    let has_no_text_group = text_raw.len() < entries.len();

    let mut scores: Vec<f64> = entries
        .iter()
        .map(|entry| {
            if !entry.has_text {
                rng.gen_range(NO_TEXT_RANGE.0..NO_TEXT_RANGE.1)
            } else if text_flat {
                FLAT_TEXT_SCORE
            } else {
                let (low, high) = TEXT_BAND;
                low + (high - low) * (entry.raw - text_min) / (text_max - text_min)
            }
        })
        .collect();

    // 片方の群が一覧を占有しないよう全体平均を寄せる
    if has_text_group && has_no_text_group {
        if let Some(current) = mean(&scores) {
            let shift = (TARGET_MEAN - current) * MEAN_PULL;
            for score in &mut scores {
                *score += shift;
            }
        }
    }

    scores
        .into_iter()
        .map(|score| clamp_priority(clamp_priority(score) + rng.gen_range(-JITTER..JITTER)))
        .collect()
}
