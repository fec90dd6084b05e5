//! 検索用マッチャー

use regex::{Regex, RegexBuilder};
use std::cell::RefCell;
use std::ops::Range;

/// 文字列マッチング戦略
pub trait StringMatcher {
    /// 文字列内の重ならないマッチを左から順にすべて返す（バイト範囲）
    fn find_matches(&self, text: &str, pattern: &str) -> Vec<Range<usize>>;
}

/// 大文字小文字を区別しないリテラルマッチャー
///
/// 検索語は正規表現として解釈しない。メタ文字はすべてエスケープする。
#[derive(Debug, Default)]
pub struct LiteralMatcher {
    compiled: RefCell<Option<(String, Regex)>>,
}

impl LiteralMatcher {
    /// インスタンスを作成
    pub fn new() -> Self {
        Self::default()
    }

    fn with_regex<T>(&self, pattern: &str, f: impl FnOnce(&Regex) -> T) -> Option<T> {
        let mut cache = self.compiled.borrow_mut();
        let cached = matches!(cache.as_ref(), Some((p, _)) if p == pattern);
        if !cached {
            let regex = RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build();
            match regex {
                Ok(regex) => *cache = Some((pattern.to_string(), regex)),
                Err(err) => {
                    log::warn!("search term could not be compiled: {}", err);
                    *cache = None;
                    return None;
                }
            }
        }
        cache.as_ref().map(|(_, regex)| f(regex))
    }
}

impl StringMatcher for LiteralMatcher {
    fn find_matches(&self, text: &str, pattern: &str) -> Vec<Range<usize>> {
        if pattern.is_empty() || text.is_empty() {
            return Vec::new();
        }

        self.with_regex(pattern, |regex| {
            regex.find_iter(text).map(|m| m.start()..m.end()).collect()
        })
        .unwrap_or_default()
    }
}
