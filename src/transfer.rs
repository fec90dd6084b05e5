//! プレーンテキストの取り込みと書き出し、印刷用文書の生成

use crate::error::{Result, TransferError};
use crate::markup;
use chrono::{NaiveDate, NaiveDateTime};

/// 空ファイルを取り込んだときの段落
pub const EMPTY_IMPORT_PARAGRAPH: &str = "<p>ドキュメントを読み込みました（空）</p>";

/// テキストを段落マークアップに変換する
///
/// 空白のみの行は捨てる。各行は `<p>` になり、内容はエスケープされる。
pub fn import_text(text: &str, max_bytes: usize) -> Result<String> {
    if text.len() > max_bytes {
        return Err(TransferError::TooLarge {
            size: text.len(),
            limit: max_bytes,
        }
        .into());
    }

    let paragraphs: Vec<String> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| format!("<p>{}</p>", markup::escape_text(line)))
        .collect();

    if paragraphs.is_empty() {
        return Ok(EMPTY_IMPORT_PARAGRAPH.to_string());
    }
    Ok(paragraphs.concat())
}

/// マークアップの表示テキストを書き出す
pub fn export_text(content: &str) -> Result<String> {
    let text = markup::plain_text(content);
    if text.trim().is_empty() {
        return Err(TransferError::EmptyDocument.into());
    }
    Ok(text)
}

/// 書き出しファイルの既定名
pub fn default_export_name(date: NaiveDate) -> String {
    format!("document-{}.txt", date.format("%Y-%m-%d"))
}

/// 印刷用文書の見出し
pub const PRINT_TITLE: &str = "エクスポートした文書";

const PRINT_STYLE: &str = "\
body { font-family: Arial, sans-serif; line-height: 1.6; margin: 2cm; color: #333; }
h1 { color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px; }
.metadata { color: #7f8c8d; font-size: 14px; margin-bottom: 20px; border-bottom: 1px solid #bdc3c7; padding-bottom: 10px; }
@media print { body { margin: 1.5cm; } }
@page { margin: 1.5cm; }";

/// 印刷（PDF 保存）用の単独 HTML 文書を作る
///
/// 表示テキストをエスケープし、改行は `<br>` にする。
pub fn print_document(content: &str, words: usize, exported_at: NaiveDateTime) -> Result<String> {
    let text = export_text(content)?;
    let body = markup::escape_text(&text).replace('\n', "<br>");
    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{style}\n</style>\n</head>\n<body>\n<h1>{title}</h1>\n<div class=\"metadata\">{date} {time} 書き出し | {words} 語</div>\n<div>{body}</div>\n</body>\n</html>\n",
        title = PRINT_TITLE,
        style = PRINT_STYLE,
        date = exported_at.format("%Y/%m/%d"),
        time = exported_at.format("%H:%M:%S"),
        words = words,
        body = body,
    ))
}
