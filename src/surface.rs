//! ドキュメント表面
//!
//! ホストのリッチテキスト編集領域を抽象化する。内容全体の読み書き、
//! 選択範囲の取得と置換、マッチ位置へのスクロールだけを公開する。

use crate::error::{Result, SurfaceError};
use crate::markup;
use crate::search::MatchLocator;
use std::ops::Range;

/// 検索エンジンが利用する編集領域のインターフェース
pub trait DocumentSurface {
    /// 現在の内容全体（マークアップ）
    fn content(&self) -> String;

    /// 内容全体を置き換える
    fn set_content(&mut self, markup: &str);

    /// 選択中のテキスト
    fn selection_text(&self) -> Option<String>;

    /// 選択範囲をリテラルテキストで置き換える
    fn replace_selection(&mut self, text: &str);

    /// マッチ位置を表示領域に入れる
    fn scroll_into_view(&mut self, locator: MatchLocator);
}

/// メモリ上の編集領域
///
/// 選択範囲はマークアップ上のバイト範囲で保持する。
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    content: String,
    selection: Option<Range<usize>>,
    last_scrolled: Option<MatchLocator>,
    revision: u64,
}

impl MemorySurface {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            content: markup.into(),
            ..Self::default()
        }
    }

    /// 内容の参照
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// 内容が書き換えられた回数
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// 最後にスクロール要求を受けた位置
    pub fn last_scrolled(&self) -> Option<MatchLocator> {
        self.last_scrolled
    }

    /// 選択範囲を設定する
    pub fn select(&mut self, range: Range<usize>) -> Result<()> {
        let valid = range.start <= range.end
            && range.end <= self.content.len()
            && self.content.is_char_boundary(range.start)
            && self.content.is_char_boundary(range.end);
        if !valid {
            return Err(SurfaceError::InvalidSelection {
                start: range.start,
                end: range.end,
            }
            .into());
        }
        self.selection = Some(range);
        Ok(())
    }

    /// マークアップ中で最初に現れる `needle` を選択する
    pub fn select_first(&mut self, needle: &str) -> bool {
        match self.content.find(needle) {
            Some(start) if !needle.is_empty() => {
                self.selection = Some(start..start + needle.len());
                true
            }
            _ => false,
        }
    }

    /// 選択を解除する
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// マークアップを選択範囲に挿入する。選択がなければ末尾に追加する
    pub fn insert_markup(&mut self, markup: &str) {
        match self.selection.take() {
            Some(range) => self.content.replace_range(range, markup),
            None => self.content.push_str(markup),
        }
        self.revision += 1;
    }

    /// マークアップを末尾に追加する
    pub fn append_markup(&mut self, markup: &str) {
        self.content.push_str(markup);
        self.revision += 1;
    }
}

impl DocumentSurface for MemorySurface {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn set_content(&mut self, markup: &str) {
        if self.content != markup {
            self.content = markup.to_string();
            self.revision += 1;
        }
        self.selection = None;
    }

    fn selection_text(&self) -> Option<String> {
        let range = self.selection.clone()?;
        Some(markup::plain_text(&self.content[range]))
    }

    fn replace_selection(&mut self, text: &str) {
        if let Some(range) = self.selection.take() {
            self.content.replace_range(range, &markup::escape_text(text));
            self.revision += 1;
        }
    }

    fn scroll_into_view(&mut self, locator: MatchLocator) {
        self.last_scrolled = Some(locator);
    }
}
