//! アクティブ一覧
//!
//! 非表示でなく延期期間外の項目を優先度の降順で返す。同点は登録順。

use crate::types::Item;
use chrono::{DateTime, Utc};

/// アクティブな項目を優先度順に取得
///
/// `now` は呼び出しごとに1回だけ渡し、全件を同じ時刻で判定する。
pub fn active_items(items: &[Item], now: DateTime<Utc>) -> Vec<&Item> {
    let mut active: Vec<&Item> = items.iter().filter(|item| item.is_active_at(now)).collect();
    // 安定ソート
    active.sort_by(|a, b| b.priority_score.total_cmp(&a.priority_score));
    active
}

/// 非表示の項目（登録順）
pub fn dismissed_items(items: &[Item]) -> Vec<&Item> {
    items.iter().filter(|item| item.dismissed).collect()
}

/// 延期中の項目（期限の早い順）
pub fn deferred_items(items: &[Item], now: DateTime<Utc>) -> Vec<&Item> {
    let mut deferred: Vec<&Item> = items
        .iter()
        .filter(|item| !item.dismissed && item.is_deferred_at(now))
        .collect();
    deferred.sort_by_key(|item| item.deferred_until);
    deferred
}
