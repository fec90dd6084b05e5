//! 文書統計

use crate::markup;

/// 単語数・文字数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub words: usize,
    pub chars: usize,
    pub chars_no_spaces: usize,
}

impl DocumentStats {
    /// マークアップの表示テキストから集計する
    pub fn from_markup(content: &str) -> Self {
        Self::from_text(&markup::plain_text(content))
    }

    /// プレーンテキストから集計する
    pub fn from_text(text: &str) -> Self {
        Self {
            words: text.split_whitespace().count(),
            chars: text.chars().count(),
            chars_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        }
    }

    /// ステータスバー表示
    pub fn label(&self) -> String {
        format!("{} 語 / {} 文字", self.words, self.chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_and_chars() {
        let stats = DocumentStats::from_markup("<p>Hello  world</p><p>again&nbsp;!</p>");
        assert_eq!(stats.words, 4);
        assert_eq!(stats.chars, "Hello  world\nagain\u{a0}!".chars().count());
        assert_eq!(stats.chars_no_spaces, 16);
    }

    #[test]
    fn empty_document_has_no_words() {
        let stats = DocumentStats::from_markup("<p>   </p>");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.chars_no_spaces, 0);
        assert_eq!(stats.label(), "0 語 / 3 文字");
    }
}
