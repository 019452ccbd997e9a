use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::heatmap::{CountMap, HeatMap};

/// 確定した接触ひとつ分の記録
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub timestamp: Instant,
    pub hand_index: usize,
    pub face_index: usize,
    pub is_new: bool,
}

#[derive(Debug, Clone, Default)]
struct IndexCounts {
    hand: CountMap,
    face: CountMap,
}

impl IndexCounts {
    fn add(&mut self, e: &HistoryEntry) {
        self.hand.increment(e.hand_index);
        self.face.increment(e.face_index);
    }

    fn remove(&mut self, e: &HistoryEntry) {
        self.hand.decrement(e.hand_index);
        self.face.decrement(e.face_index);
    }

    fn clear(&mut self) {
        self.hand.clear();
        self.face.clear();
    }
}

/// 保持期間つきの接触履歴
///
/// エントリは時刻順に追加されるため、期限切れは先頭から刈り取る。
/// インデックスごとの回数は追加・削除のたびに差分更新する。
#[derive(Debug, Clone)]
pub struct DetectionHistory {
    retention: Duration,
    entries: VecDeque<HistoryEntry>,
    all: IndexCounts,
    new_only: IndexCounts,
    sustained_only: IndexCounts,
}

impl DetectionHistory {
    pub fn new(retention: Duration) -> Self {
        Self {
            retention,
            entries: VecDeque::new(),
            all: IndexCounts::default(),
            new_only: IndexCounts::default(),
            sustained_only: IndexCounts::default(),
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 古い順
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn push(&mut self, hand_index: usize, face_index: usize, is_new: bool) {
        self.push_at(Instant::now(), hand_index, face_index, is_new);
    }

    pub fn push_at(&mut self, now: Instant, hand_index: usize, face_index: usize, is_new: bool) {
        let entry = HistoryEntry {
            timestamp: now,
            hand_index,
            face_index,
            is_new,
        };
        self.all.add(&entry);
        self.filtered_mut(is_new).add(&entry);
        self.entries.push_back(entry);
        self.evict(now);
    }

    pub fn change_retention(&mut self, retention: Duration) {
        self.change_retention_at(Instant::now(), retention);
    }

    pub fn change_retention_at(&mut self, now: Instant, retention: Duration) {
        self.retention = retention;
        self.evict(now);
    }

    /// now - retention より古いエントリを削除し、削除数を返す
    pub fn evict(&mut self, now: Instant) -> usize {
        let mut evicted = 0;
        while let Some(oldest) = self.entries.front() {
            if now.saturating_duration_since(oldest.timestamp) <= self.retention {
                break;
            }
            if let Some(expired) = self.entries.pop_front() {
                self.all.remove(&expired);
                self.filtered_mut(expired.is_new).remove(&expired);
                evicted += 1;
            }
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.all.clear();
        self.new_only.clear();
        self.sustained_only.clear();
    }

    /// (手ヒートマップ, 顔ヒートマップ)
    ///
    /// filter_is_new: Some(v) なら is_new == v のエントリのみ数える。
    pub fn heat_map(&mut self, filter_is_new: Option<bool>) -> (HeatMap, HeatMap) {
        self.heat_map_at(Instant::now(), filter_is_new)
    }

    pub fn heat_map_at(&mut self, now: Instant, filter_is_new: Option<bool>) -> (HeatMap, HeatMap) {
        self.evict(now);
        let counts = match filter_is_new {
            None => &self.all,
            Some(true) => &self.new_only,
            Some(false) => &self.sustained_only,
        };
        (counts.hand.normalized(), counts.face.normalized())
    }

    /// 履歴内で最も多く触れられた顔インデックスと回数
    pub fn hottest_face_index(&self) -> Option<(usize, u32)> {
        let mut best: Option<(usize, u32)> = None;
        for e in &self.entries {
            let c = self.all.face.get(e.face_index);
            match best {
                Some((i, b)) if b > c || (b == c && i <= e.face_index) => {}
                _ => best = Some((e.face_index, c)),
            }
        }
        best
    }

    fn filtered_mut(&mut self, is_new: bool) -> &mut IndexCounts {
        if is_new {
            &mut self.new_only
        } else {
            &mut self.sustained_only
        }
    }
}
