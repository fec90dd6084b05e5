//! 表・リンク・メディアの挿入用マークアップ
//!
//! メディアはファイルを data URL に埋め込んで文書末尾に追加する。
//! 表とリンクは選択位置に挿入する。

use crate::error::{MediaError, Result};
use crate::markup::{escape_attribute, escape_text};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use std::fmt;
use std::path::Path;

/// 行数・列数が未指定のときの大きさ
pub const DEFAULT_TABLE_SIZE: usize = 3;
pub const MAX_TABLE_ROWS: usize = 20;
pub const MAX_TABLE_COLS: usize = 10;

pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
pub const MAX_VIDEO_BYTES: u64 = 50 * 1024 * 1024;

const TABLE_STYLE: &str = "width: 100%; border-collapse: collapse; margin: 10px 0;";
const CELL_STYLE: &str = "border: 1px solid var(--border-color); padding: 8px;";

/// 埋め込むメディアの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
}

impl MediaKind {
    /// ファイルサイズの上限。音声は無制限
    pub fn limit(self) -> Option<u64> {
        match self {
            MediaKind::Image => Some(MAX_IMAGE_BYTES),
            MediaKind::Video => Some(MAX_VIDEO_BYTES),
            MediaKind::Audio => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "画像",
            MediaKind::Video => "動画",
            MediaKind::Audio => "音声",
        }
    }

    /// 拡張子から MIME タイプを求める
    pub fn mime_for(self, extension: &str) -> Option<&'static str> {
        let mime = match (self, extension.to_ascii_lowercase().as_str()) {
            (MediaKind::Image, "png") => "image/png",
            (MediaKind::Image, "jpg" | "jpeg") => "image/jpeg",
            (MediaKind::Image, "gif") => "image/gif",
            (MediaKind::Image, "webp") => "image/webp",
            (MediaKind::Image, "svg") => "image/svg+xml",
            (MediaKind::Image, "bmp") => "image/bmp",
            (MediaKind::Image, "ico") => "image/x-icon",
            (MediaKind::Video, "mp4" | "m4v") => "video/mp4",
            (MediaKind::Video, "webm") => "video/webm",
            (MediaKind::Video, "ogv" | "ogg") => "video/ogg",
            (MediaKind::Video, "mov") => "video/quicktime",
            (MediaKind::Audio, "mp3") => "audio/mpeg",
            (MediaKind::Audio, "wav") => "audio/wav",
            (MediaKind::Audio, "ogg" | "oga") => "audio/ogg",
            (MediaKind::Audio, "m4a") => "audio/mp4",
            (MediaKind::Audio, "flac") => "audio/flac",
            (MediaKind::Audio, "weba") => "audio/webm",
            _ => return None,
        };
        Some(mime)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
        };
        f.write_str(name)
    }
}

/// 空セルを並べた表のマークアップ
///
/// 未指定または 0 は既定の 3 になる。
pub fn table_markup(rows: Option<usize>, cols: Option<usize>) -> Result<String> {
    let size = |value: Option<usize>| value.filter(|&n| n > 0).unwrap_or(DEFAULT_TABLE_SIZE);
    let (rows, cols) = (size(rows), size(cols));
    if rows > MAX_TABLE_ROWS || cols > MAX_TABLE_COLS {
        return Err(MediaError::TableTooLarge { rows, cols }.into());
    }

    let cell = format!("<td style=\"{}\">&nbsp;</td>", CELL_STYLE);
    let row = format!("<tr>{}</tr>", cell.repeat(cols));
    Ok(format!(
        "<table style=\"{}\">{}</table>",
        TABLE_STYLE,
        row.repeat(rows)
    ))
}

/// 絶対 URL かどうかを検査する
///
/// `scheme:rest` の形で、空白を含まないこと。http と https はホストが必要。
pub fn validate_url(url: &str) -> Result<&str> {
    let invalid = || MediaError::InvalidUrl {
        url: url.to_string(),
    };
    let trimmed = url.trim();
    let (scheme, rest) = trimmed.split_once(':').ok_or_else(invalid)?;

    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok || rest.is_empty() || rest.chars().any(char::is_whitespace) {
        return Err(invalid().into());
    }

    let scheme = scheme.to_ascii_lowercase();
    if scheme == "http" || scheme == "https" {
        let host = rest
            .strip_prefix("//")
            .and_then(|authority| authority.split(['/', '?', '#']).next())
            .and_then(|authority| authority.rsplit('@').next())
            .unwrap_or("");
        let host = host.split(':').next().unwrap_or("");
        if host.is_empty() {
            return Err(invalid().into());
        }
    }
    Ok(trimmed)
}

/// リンクのマークアップ。表示テキストは文字として挿入する
pub fn link_markup(url: &str, text: &str) -> Result<String> {
    let url = validate_url(url)?;
    Ok(format!(
        "<a href=\"{}\">{}</a>",
        escape_attribute(url),
        escape_text(text)
    ))
}

/// バイト列を data URL にする
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, B64.encode(bytes))
}

/// 埋め込み要素のマークアップ
pub fn media_markup(kind: MediaKind, src: &str) -> String {
    let src = escape_attribute(src);
    match kind {
        MediaKind::Image => format!(
            "<img src=\"{}\" style=\"max-width: 100%; border-radius: var(--radius); margin: 10px 0;\">",
            src
        ),
        MediaKind::Video => format!(
            "<div class=\"video-container\"><video src=\"{}\" controls style=\"width: 100%;\"></video></div>",
            src
        ),
        MediaKind::Audio => format!(
            "<audio src=\"{}\" controls style=\"width: 100%; margin: 10px 0;\"></audio>",
            src
        ),
    }
}

/// ファイルを読み込み、埋め込み要素のマークアップを作る
///
/// 上限を超えるファイルは読み込む前に拒否する。
pub fn load_media(kind: MediaKind, path: &Path) -> Result<String> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");
    let mime = kind
        .mime_for(extension)
        .ok_or_else(|| MediaError::UnsupportedType {
            kind,
            extension: extension.to_string(),
        })?;

    let size = std::fs::metadata(path)?.len();
    if let Some(limit) = kind.limit() {
        if size > limit {
            return Err(MediaError::TooLarge { kind, size, limit }.into());
        }
    }

    let bytes = std::fs::read(path)?;
    log::debug!("embedding {} {} ({} bytes)", kind, path.display(), bytes.len());
    Ok(media_markup(kind, &data_url(mime, &bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InkpadError;
    use crate::markup;
    use tempfile::TempDir;

    #[test]
    fn table_defaults_to_three_by_three() {
        let table = table_markup(None, Some(0)).unwrap();
        assert_eq!(table.matches("<tr>").count(), 3);
        assert_eq!(table.matches("<td ").count(), 9);
        assert!(table.starts_with("<table style=\"width: 100%;"));
        assert!(table.ends_with("</tr></table>"));
    }

    #[test]
    fn table_respects_limits() {
        assert_eq!(
            table_markup(Some(21), Some(2)),
            Err(InkpadError::Media(MediaError::TableTooLarge { rows: 21, cols: 2 }))
        );
        assert!(table_markup(Some(2), Some(11)).is_err());
        let table = table_markup(Some(MAX_TABLE_ROWS), Some(MAX_TABLE_COLS)).unwrap();
        assert_eq!(table.matches("<td ").count(), 200);
    }

    #[test]
    fn table_error_is_a_warning() {
        let error = table_markup(Some(30), None).unwrap_err();
        assert_eq!(error.severity(), crate::notify::Severity::Warning);
    }

    #[test]
    fn accepts_absolute_urls() {
        for url in [
            "https://example.com",
            "http://user@localhost:8080/path?q=1#top",
            "mailto:someone@example.com",
            "ftp://files.example.org/a.txt",
            "  https://example.com/trimmed  ",
        ] {
            assert!(validate_url(url).is_ok(), "rejected {url}");
        }
    }

    #[test]
    fn rejects_malformed_urls() {
        for url in [
            "",
            "example.com",
            "https://",
            "https:///path",
            "http:example.com",
            "1http://example.com",
            "https://exa mple.com",
            "javascript",
        ] {
            assert!(
                matches!(
                    validate_url(url),
                    Err(InkpadError::Media(MediaError::InvalidUrl { .. }))
                ),
                "accepted {url}"
            );
        }
    }

    #[test]
    fn link_escapes_url_and_text() {
        let link = link_markup("https://example.com/?a=1&b=\"2\"", "<docs>").unwrap();
        assert_eq!(
            link,
            "<a href=\"https://example.com/?a=1&amp;b=&quot;2&quot;\">&lt;docs&gt;</a>"
        );
        assert_eq!(markup::tokenize(&link).len(), 3);
    }

    #[test]
    fn data_url_is_base64() {
        assert_eq!(data_url("image/png", b"hello"), "data:image/png;base64,aGVsbG8=");
    }

    #[test]
    fn media_elements_follow_kind() {
        assert!(media_markup(MediaKind::Image, "data:x").starts_with("<img src=\"data:x\""));
        assert!(media_markup(MediaKind::Video, "v").contains("<video src=\"v\" controls"));
        assert!(media_markup(MediaKind::Audio, "a").starts_with("<audio src=\"a\" controls"));
    }

    #[test]
    fn loads_image_as_data_url() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dot.PNG");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let markup = load_media(MediaKind::Image, &path).unwrap();
        assert!(markup.contains("src=\"data:image/png;base64,iVBORw==\""));
    }

    #[test]
    fn rejects_oversized_video_before_reading() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip.mp4");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_VIDEO_BYTES + 1).unwrap();

        assert_eq!(
            load_media(MediaKind::Video, &path),
            Err(InkpadError::Media(MediaError::TooLarge {
                kind: MediaKind::Video,
                size: MAX_VIDEO_BYTES + 1,
                limit: MAX_VIDEO_BYTES,
            }))
        );
    }

    #[test]
    fn audio_has_no_size_limit_but_needs_known_type() {
        assert_eq!(MediaKind::Audio.limit(), None);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(
            load_media(MediaKind::Audio, &path),
            Err(InkpadError::Media(MediaError::UnsupportedType { .. }))
        ));
    }
}
