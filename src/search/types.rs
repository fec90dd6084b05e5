//! 検索関連の共通型

use std::ops::Range;

/// 検索結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// 一致なし
    NoMatches,
    /// 一致件数
    Found(usize),
}

impl SearchOutcome {
    pub fn count(self) -> usize {
        match self {
            SearchOutcome::NoMatches => 0,
            SearchOutcome::Found(count) => count,
        }
    }
}

/// 1件置換の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    NothingToReplace,
}

/// 一括置換の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceAllOutcome {
    NoMatches,
    Replaced(usize),
}

impl ReplaceAllOutcome {
    pub fn count(self) -> usize {
        match self {
            ReplaceAllOutcome::NoMatches => 0,
            ReplaceAllOutcome::Replaced(count) => count,
        }
    }
}

/// ハイライトの位置を指す不透明な参照
///
/// 世代が現在のセッションと一致しない参照は無効。
/// ホスト側は `data-match` 属性の値で対応するマーカーを探す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchLocator {
    pub generation: u64,
    pub ordinal: usize,
}

/// 1件の一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRef {
    /// マッチ一覧内での位置
    pub ordinal: usize,
    /// ホストへ渡す参照
    pub locator: MatchLocator,
    /// マーカーを除いた内容上のバイト範囲
    pub range: Range<usize>,
}

/// 検索ダイアログに表示する要約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSummary {
    pub term: String,
    /// 現在のマッチ（1始まり）
    pub current: Option<usize>,
    pub total: usize,
}

impl SearchSummary {
    /// "2 / 5" 形式のラベル
    pub fn position_label(&self) -> String {
        match self.current {
            Some(current) => format!("{} / {}", current, self.total),
            None => format!("0 / {}", self.total),
        }
    }
}
