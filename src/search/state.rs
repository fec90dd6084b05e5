//! 検索セッションの状態管理

use super::types::{MatchLocator, MatchRef};
use std::ops::Range;

/// 1ドキュメント分の検索状態
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    /// 最後に入力された検索語
    pub term: String,
    /// 現在のマッチ集合（文書順）
    pub matches: Vec<MatchRef>,
    /// 現在選択されているマッチ
    pub cursor: Option<usize>,
    /// マーカーを除いた内容
    pub base: String,
    /// エンジンが最後に書き込んだマークアップ
    pub applied: Option<String>,
    /// マッチ集合の世代
    pub generation: u64,
}

impl SearchSession {
    /// 新しい状態を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// マッチ集合を作り直す（カーソルは先頭）
    pub fn rebuild(&mut self, base: String, spans: Vec<Range<usize>>) {
        self.generation += 1;
        let generation = self.generation;
        self.matches = spans
            .into_iter()
            .enumerate()
            .map(|(ordinal, range)| MatchRef {
                ordinal,
                locator: MatchLocator {
                    generation,
                    ordinal,
                },
                range,
            })
            .collect();
        self.cursor = if self.matches.is_empty() { None } else { Some(0) };
        self.base = base;
        self.applied = None;
    }

    /// マッチ集合を破棄する。検索語は残す
    pub fn clear(&mut self) {
        self.generation += 1;
        self.matches.clear();
        self.cursor = None;
        self.base.clear();
        self.applied = None;
    }

    /// 現在のマッチ
    pub fn current(&self) -> Option<&MatchRef> {
        self.cursor.and_then(|idx| self.matches.get(idx))
    }

    /// 参照が現在の世代のものか
    pub fn resolves(&self, locator: MatchLocator) -> bool {
        locator.generation == self.generation && locator.ordinal < self.matches.len()
    }

    /// 表面の内容がエンジンの書き込み以降変わっていないか
    pub fn is_live(&self, content: &str) -> bool {
        !self.matches.is_empty() && self.applied.as_deref() == Some(content)
    }

    /// 次のマッチへ（循環）
    pub fn advance(&mut self) -> Option<usize> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        let next = self.cursor.map_or(0, |idx| (idx + 1) % len);
        self.cursor = Some(next);
        Some(next)
    }

    /// 前のマッチへ（循環）
    pub fn retreat(&mut self) -> Option<usize> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }
        let prev = match self.cursor {
            Some(idx) if idx > 0 => idx - 1,
            _ => len - 1,
        };
        self.cursor = Some(prev);
        Some(prev)
    }
}
