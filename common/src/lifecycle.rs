//! 項目のライフサイクル管理
//!
//! 登録順を保持する項目コレクションと、非表示・復元・延期の状態遷移。
//!
//! ## 状態遷移
//! - dismiss: 非表示でない項目 → 非表示
//! - restore: 非表示の項目 → アクティブ（延期も解除）
//! - defer: 非表示でない項目 → `now + duration` まで延期
//!
//! 遷移元の状態にない ID は `Error::NotFound`。他の項目には影響しない。
//! 日時の範囲を超える延期は `Error::InvalidDuration` で、項目は変更しない。

use crate::error::{Error, Result};
use crate::normalizer::{normalize_population, NormalizationStats};
use crate::types::Item;
use crate::view;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use uuid::Uuid;

/// 項目コレクション（登録順）
#[derive(Debug, Clone, Default)]
pub struct ItemCollection {
    items: Vec<Item>,
}

impl ItemCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の項目から構築（ID重複はエラー）
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.id) {
                return Err(Error::DuplicateId(item.id.to_string()));
            }
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 末尾に追加
    pub fn insert(&mut self, item: Item) -> Result<()> {
        if self.get(item.id).is_some() {
            return Err(Error::DuplicateId(item.id.to_string()));
        }
        self.items.push(item);
        Ok(())
    }

    /// バッチをまとめて追加
    ///
    /// 1件でも重複があれば何も追加しない。
    pub fn extend(&mut self, batch: Vec<Item>) -> Result<()> {
        let mut seen: HashSet<Uuid> = self.items.iter().map(|item| item.id).collect();
        for item in &batch {
            if !seen.insert(item.id) {
                return Err(Error::DuplicateId(item.id.to_string()));
            }
        }
        self.items.extend(batch);
        Ok(())
    }

    pub fn get(&self, id: Uuid) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// ID文字列（完全一致または一意な前方一致）を解決
    pub fn resolve_id(&self, query: &str) -> Result<Uuid> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(Error::NotFound("empty id".into()));
        }

        if let Ok(id) = Uuid::parse_str(&query) {
            return self
                .get(id)
                .map(|item| item.id)
                .ok_or_else(|| Error::NotFound(query.clone()));
        }

        let mut candidates = self
            .items
            .iter()
            .filter(|item| item.id.to_string().starts_with(&query));

        match (candidates.next(), candidates.next()) {
            (Some(item), None) => Ok(item.id),
            (Some(_), Some(_)) => Err(Error::AmbiguousId(query)),
            (None, _) => Err(Error::NotFound(query)),
        }
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.items.iter().any(|item| item.path == path)
    }

    pub fn contains_fingerprint(&self, fingerprint: &str) -> bool {
        !fingerprint.is_empty() && self.items.iter().any(|item| item.fingerprint == fingerprint)
    }

    /// 非表示にする
    pub fn dismiss(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<()> {
        match self.get_mut(id) {
            Some(item) if !item.dismissed => {
                item.dismissed = true;
                item.touch(now);
                log::info!("dismissed {}", id);
                Ok(())
            }
            _ => Err(Error::NotFound(id.to_string())),
        }
    }

    /// 非表示から戻す（延期も解除）
    pub fn restore(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<()> {
        match self.get_mut(id) {
            Some(item) if item.dismissed => {
                item.dismissed = false;
                item.deferred_until = None;
                item.touch(now);
                log::info!("restored {}", id);
                Ok(())
            }
            _ => Err(Error::NotFound(id.to_string())),
        }
    }

    /// 延期し、再表示時刻を返す
    pub fn defer(&mut self, id: Uuid, duration: Duration, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self.get_mut(id) {
            Some(item) if !item.dismissed => {
                let until = now
                    .checked_add_signed(duration)
                    .ok_or_else(|| Error::InvalidDuration(duration.to_string()))?;
                item.deferred_until = Some(until);
                item.touch(now);
                log::info!("deferred {} until {}", id, until);
                Ok(until)
            }
            _ => Err(Error::NotFound(id.to_string())),
        }
    }

    /// 非表示でない全項目を非表示にし、件数を返す
    pub fn dismiss_all(&mut self, now: DateTime<Utc>) -> usize {
        let mut count = 0;
        for item in self.items.iter_mut().filter(|item| !item.dismissed) {
            item.dismissed = true;
            item.touch(now);
            count += 1;
        }
        log::info!("dismissed {} items", count);
        count
    }

    /// 非表示の全項目を戻し、件数を返す
    pub fn restore_all(&mut self, now: DateTime<Utc>) -> usize {
        let mut count = 0;
        for item in self.items.iter_mut().filter(|item| item.dismissed) {
            item.dismissed = false;
            item.deferred_until = None;
            item.touch(now);
            count += 1;
        }
        log::info!("restored {} items", count);
        count
    }

    pub fn dismissed_count(&self) -> usize {
        self.items.iter().filter(|item| item.dismissed).count()
    }

    pub fn has_dismissed(&self) -> bool {
        self.dismissed_count() > 0
    }

    /// 全削除し、削除した項目を返す
    pub fn purge(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.items)
    }

    pub fn active(&self, now: DateTime<Utc>) -> Vec<&Item> {
        view::active_items(&self.items, now)
    }

    pub fn dismissed(&self) -> Vec<&Item> {
        view::dismissed_items(&self.items)
    }

    pub fn deferred(&self, now: DateTime<Utc>) -> Vec<&Item> {
        view::deferred_items(&self.items, now)
    }

    /// アクティブ集合の優先度を母集団 z スコアで再配置
    pub fn rebalance_active(&mut self, now: DateTime<Utc>) -> NormalizationStats {
        let indices: Vec<usize> = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_active_at(now))
            .map(|(idx, _)| idx)
            .collect();

        let before: Vec<f64> = indices.iter().map(|&idx| self.items[idx].priority_score).collect();
        let after = normalize_population(&before);

        for (&idx, &score) in indices.iter().zip(&after) {
            let item = &mut self.items[idx];
            if item.priority_score != score {
                item.priority_score = score;
                item.touch(now);
            }
        }

        let stats = NormalizationStats::from_scores(&before, &after);
        log::info!(
            "rebalanced {} active items: mean {:.3} -> {:.3}",
            stats.count,
            stats.mean_before,
            stats.mean_after
        );
        stats
    }
}
