//! マークアップ層
//!
//! ドキュメント表面が保持する HTML 断片を、タグとテキスト区間に分割する。
//! 検索はテキスト区間の中だけで行い、タグや属性値には一致させない。

mod entity;

pub use entity::{decode, escape_attribute, escape_text, DecodedText};

use std::ops::Range;

/// 区間の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// `<...>` またはコメント
    Tag,
    /// タグの間のテキスト
    Text,
}

/// マークアップ上の1区間（バイト範囲）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub range: Range<usize>,
}

impl Segment {
    pub fn is_text(&self) -> bool {
        self.kind == SegmentKind::Text
    }

    /// 元の文字列から区間を切り出す
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range.clone()]
    }
}

/// マークアップを区間に分割する
///
/// 閉じられていない `<` や、タグ名が続かない `<` はテキストとして扱う。
pub fn tokenize(markup: &str) -> Vec<Segment> {
    let bytes = markup.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0usize;
    let mut pos = 0usize;

    while pos < bytes.len() {
        if bytes[pos] == b'<' {
            if let Some(end) = tag_end(bytes, pos) {
                if text_start < pos {
                    segments.push(Segment {
                        kind: SegmentKind::Text,
                        range: text_start..pos,
                    });
                }
                segments.push(Segment {
                    kind: SegmentKind::Tag,
                    range: pos..end,
                });
                pos = end;
                text_start = end;
                continue;
            }
        }
        pos += 1;
    }

    if text_start < bytes.len() {
        segments.push(Segment {
            kind: SegmentKind::Text,
            range: text_start..bytes.len(),
        });
    }

    segments
}

fn tag_end(bytes: &[u8], start: usize) -> Option<usize> {
    let rest = &bytes[start..];
    if rest.starts_with(b"<!--") {
        return rest[4..]
            .windows(3)
            .position(|w| w == b"-->")
            .map(|p| start + 4 + p + 3);
    }

    let next = *rest.get(1)?;
    if !(next.is_ascii_alphabetic() || next == b'/' || next == b'!' || next == b'?') {
        return None;
    }

    // `>` の前に `<` が現れたら、この `<` はタグではなくテキスト。
    // 引用符は `=` の直後でのみ属性値として開く
    let mut quote: Option<u8> = None;
    let mut after_equals = false;
    for (offset, &b) in rest.iter().enumerate().skip(1) {
        if b == b'<' {
            return None;
        }
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' if after_equals => quote = Some(b),
                b'>' => return Some(start + offset + 1),
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            after_equals = quote.is_none() && b == b'=';
        }
    }
    None
}

/// タグ名（小文字）を取得する。閉じタグの場合も名前のみ返す
pub fn tag_name(raw: &str) -> Option<String> {
    let inner = raw.strip_prefix('<')?;
    let inner = inner.strip_prefix('/').unwrap_or(inner);
    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(name.to_ascii_lowercase())
    }
}

/// 閉じタグか判定
pub fn is_closing_tag(raw: &str) -> bool {
    raw.starts_with("</")
}

/// 属性値を取得する（引用符付きの値のみ）
pub fn attribute<'a>(raw: &'a str, name: &str) -> Option<&'a str> {
    let lower = raw.to_ascii_lowercase();
    for quote in ['"', '\''] {
        let needle = format!(" {}={}", name, quote);
        if let Some(pos) = lower.find(&needle) {
            let value_start = pos + needle.len();
            let value_end = raw[value_start..].find(quote)? + value_start;
            return Some(&raw[value_start..value_end]);
        }
    }
    None
}

/// 改行として扱うブロック要素
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "blockquote", "pre", "table",
];

/// マークアップの表示テキストを取得する
///
/// `<br>` とブロック要素の閉じタグは改行になる。
pub fn plain_text(markup: &str) -> String {
    let mut text = String::new();
    for segment in tokenize(markup) {
        let raw = segment.slice(markup);
        match segment.kind {
            SegmentKind::Text => text.push_str(&decode(raw).text),
            SegmentKind::Tag => {
                let Some(name) = tag_name(raw) else {
                    continue;
                };
                if name == "br" || (is_closing_tag(raw) && BLOCK_TAGS.contains(&name.as_str())) {
                    text.push('\n');
                }
            }
        }
    }

    let trimmed_len = text.trim_end_matches('\n').len();
    text.truncate(trimmed_len);
    text
}
