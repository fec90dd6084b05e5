//! 文字参照のデコードとエスケープ

/// デコード済みテキストと元のマークアップ位置の対応
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedText {
    /// デコード後の文字列
    pub text: String,
    /// (デコード後のバイト位置, 元のバイト位置) の組。末尾に番兵を含む
    boundaries: Vec<(usize, usize)>,
}

impl DecodedText {
    /// デコード後のバイト位置を元のバイト位置へ変換
    ///
    /// 文字境界以外の位置は `None`。
    pub fn raw_offset(&self, decoded: usize) -> Option<usize> {
        self.boundaries
            .binary_search_by_key(&decoded, |&(d, _)| d)
            .ok()
            .map(|idx| self.boundaries[idx].1)
    }
}

/// テキスト区間の文字参照をデコードする
pub fn decode(raw: &str) -> DecodedText {
    let mut text = String::with_capacity(raw.len());
    let mut boundaries = Vec::with_capacity(raw.len() + 1);
    let mut pos = 0usize;

    while pos < raw.len() {
        boundaries.push((text.len(), pos));
        let rest = &raw[pos..];
        if rest.starts_with('&') {
            if let Some((ch, consumed)) = parse_reference(rest) {
                text.push(ch);
                pos += consumed;
                continue;
            }
        }
        // pos は常に文字境界
        if let Some(ch) = rest.chars().next() {
            text.push(ch);
            pos += ch.len_utf8();
        }
    }
    boundaries.push((text.len(), raw.len()));

    DecodedText { text, boundaries }
}

/// `&...;` をひとつ解釈し、(文字, 消費バイト数) を返す
fn parse_reference(rest: &str) -> Option<(char, usize)> {
    let semi = rest.char_indices().take(12).find(|(_, c)| *c == ';')?.0;
    let body = &rest[1..semi];
    let ch = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        char::from_u32(code)?
    } else {
        match body {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            _ => return None,
        }
    };
    Some((ch, semi + 1))
}

/// プレーンテキストをマークアップのテキストとして挿入できる形にする
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// 引用符で囲んだ属性値として挿入できる形にする
pub fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_references() {
        let decoded = decode("a &amp; b &lt;c&gt; &#65;&#x42;");
        assert_eq!(decoded.text, "a & b <c> AB");
    }

    #[test]
    fn keeps_unknown_references_literally() {
        let decoded = decode("fish &chips; &bogus");
        assert_eq!(decoded.text, "fish &chips; &bogus");
    }

    #[test]
    fn maps_offsets_back_to_raw() {
        let decoded = decode("x&amp;y");
        assert_eq!(decoded.text, "x&y");
        assert_eq!(decoded.raw_offset(0), Some(0));
        assert_eq!(decoded.raw_offset(1), Some(1));
        assert_eq!(decoded.raw_offset(2), Some(6));
        assert_eq!(decoded.raw_offset(3), Some(7));
    }

    #[test]
    fn maps_multibyte_offsets() {
        let decoded = decode("日本&gt;語");
        assert_eq!(decoded.text, "日本>語");
        assert_eq!(decoded.raw_offset(6), Some(6));
        assert_eq!(decoded.raw_offset(7), Some(10));
        assert_eq!(decoded.raw_offset(1), None);
    }

    #[test]
    fn escape_neutralises_markup() {
        assert_eq!(escape_text("<b>&</b>"), "&lt;b&gt;&amp;&lt;/b&gt;");
        assert_eq!(decode(&escape_text("a<b>&c")).text, "a<b>&c");
    }

    #[test]
    fn attribute_escape_covers_quotes() {
        let escaped = escape_attribute(r#"say "hi" & <go>"#);
        assert_eq!(escaped, "say &quot;hi&quot; &amp; &lt;go&gt;");
        assert_eq!(decode(&escaped).text, r#"say "hi" & <go>"#);
    }
}
