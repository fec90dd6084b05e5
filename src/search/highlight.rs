//! ハイライトマーカーの走査・適用・除去

use super::matcher::StringMatcher;
use crate::markup::{self, SegmentKind};
use std::ops::Range;

/// マーカーの見た目
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkerStyle<'a> {
    pub class: &'a str,
    pub current_color: &'a str,
    pub other_color: &'a str,
}

const MARKER_TAG: &str = "mark";
const MARKER_CLOSE: &str = "</mark>";

fn is_marker_open(raw: &str, class: &str) -> bool {
    if markup::is_closing_tag(raw) || markup::tag_name(raw).as_deref() != Some(MARKER_TAG) {
        return false;
    }
    markup::attribute(raw, "class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// すべてのマーカーを外し、内側のテキストと周囲の構造をそのまま残す
///
/// 戻り値は (マーカーを除いた内容, 外したマーカー数)。
pub(crate) fn strip_markers(content: &str, class: &str) -> (String, usize) {
    let mut stripped = String::with_capacity(content.len());
    let mut removed = 0usize;
    let mut inside_marker = false;

    for segment in markup::tokenize(content) {
        let raw = segment.slice(content);
        if segment.kind == SegmentKind::Tag {
            if !inside_marker && is_marker_open(raw, class) {
                inside_marker = true;
                removed += 1;
                continue;
            }
            if inside_marker && raw.eq_ignore_ascii_case(MARKER_CLOSE) {
                inside_marker = false;
                continue;
            }
        }
        stripped.push_str(raw);
    }

    (stripped, removed)
}

/// テキスト区間ごとに検索語を走査し、元のマークアップ上の範囲を文書順に返す
///
/// マッチはタグをまたがない。
pub(crate) fn scan<M: StringMatcher + ?Sized>(
    base: &str,
    term: &str,
    matcher: &M,
) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    for segment in markup::tokenize(base) {
        if !segment.is_text() {
            continue;
        }
        let decoded = markup::decode(segment.slice(base));
        for found in matcher.find_matches(&decoded.text, term) {
            let (Some(start), Some(end)) = (
                decoded.raw_offset(found.start),
                decoded.raw_offset(found.end),
            ) else {
                log::debug!("match {:?} is not on a character boundary", found);
                continue;
            };
            if start < end {
                spans.push(segment.range.start + start..segment.range.start + end);
            }
        }
    }
    spans
}

fn open_tag(style: &MarkerStyle<'_>, ordinal: usize, is_current: bool) -> String {
    let color = if is_current {
        style.current_color
    } else {
        style.other_color
    };
    format!(
        "<mark class=\"{}\" data-match=\"{}\" data-current=\"{}\" style=\"background-color: {}\">",
        style.class, ordinal, is_current, color
    )
}

/// 範囲をマーカーで包む（1パス）
pub(crate) fn render(
    base: &str,
    spans: &[Range<usize>],
    current: Option<usize>,
    style: &MarkerStyle<'_>,
) -> String {
    let mut output = String::with_capacity(base.len() + spans.len() * 96);
    let mut last = 0usize;
    for (ordinal, span) in spans.iter().enumerate() {
        output.push_str(&base[last..span.start]);
        output.push_str(&open_tag(style, ordinal, Some(ordinal) == current));
        output.push_str(&base[span.clone()]);
        output.push_str(MARKER_CLOSE);
        last = span.end;
    }
    output.push_str(&base[last..]);
    output
}

/// 範囲をすべて置換文字列に差し替える（1パス）
pub(crate) fn splice(base: &str, spans: &[Range<usize>], replacement: &str) -> String {
    let mut output = String::with_capacity(base.len());
    let mut last = 0usize;
    for span in spans {
        output.push_str(&base[last..span.start]);
        output.push_str(replacement);
        last = span.end;
    }
    output.push_str(&base[last..]);
    output
}
