//! エラーハンドリングシステム
//!
//! inkpad 全体で使用される統一されたエラー型と、通知レベルへの対応付けを定義
//! どのエラーもセッションを終了させない。通知して操作を続行できる状態に戻す

use crate::media::MediaKind;
use crate::notify::Severity;
use thiserror::Error;

/// アプリケーション全体のエラー型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InkpadError {
    /// 検索・置換エラー
    #[error("Search operation failed: {0}")]
    Search(#[from] SearchError),

    /// ページ操作エラー
    #[error("Page operation failed: {0}")]
    Page(#[from] PageError),

    /// ドキュメント表面の操作エラー
    #[error("Surface operation failed: {0}")]
    Surface(#[from] SurfaceError),

    /// 自動保存エラー
    #[error("Autosave failed: {0}")]
    Autosave(#[from] AutosaveError),

    /// 取り込み・書き出しエラー
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// 表・リンク・メディア挿入エラー
    #[error("Insert failed: {0}")]
    Media(#[from] MediaError),

    /// 設定エラー
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// ロガー初期化エラー
    #[error("Logging error: {0}")]
    Logging(String),

    /// 入出力エラー
    #[error("IO error: {message}")]
    Io { message: String },
}

/// 検索・置換固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// 空白のみ、または空の検索語
    #[error("Search term is empty")]
    EmptySearchTerm,

    /// マッチ参照が指す位置がもう存在しない（外部から内容が変更された）
    #[error("Match reference from generation {generation} is stale")]
    StaleMatchReference { generation: u64 },

    /// 置換できる対象がない
    #[error("Nothing to replace")]
    NothingToReplace,
}

/// ページ操作固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("The last remaining page cannot be deleted")]
    LastPage,

    #[error("Page not found: {id}")]
    NotFound { id: String },
}

/// ドキュメント表面固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Invalid selection range: {start}..{end}")]
    InvalidSelection { start: usize, end: usize },
}

/// 自動保存固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutosaveError {
    #[error("Autosave record is corrupt: {message}")]
    Corrupt { message: String },

    #[error("Autosave storage failed: {message}")]
    Storage { message: String },
}

/// 取り込み・書き出し固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Input is too large: {size} bytes (limit {limit})")]
    TooLarge { size: usize, limit: usize },

    #[error("Document is empty")]
    EmptyDocument,
}

/// 表・リンク・メディア挿入固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Table is too large: {rows}x{cols}")]
    TableTooLarge { rows: usize, cols: usize },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("{kind} file is too large: {size} bytes (limit {limit})")]
    TooLarge { kind: MediaKind, size: u64, limit: u64 },

    #[error("Unsupported {kind} type: {extension:?}")]
    UnsupportedType { kind: MediaKind, extension: String },
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {message}")]
    InvalidFile { path: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl InkpadError {
    /// ユーザー通知時の重要度
    pub fn severity(&self) -> Severity {
        match self {
            InkpadError::Search(SearchError::EmptySearchTerm) => Severity::Warning,
            InkpadError::Search(SearchError::NothingToReplace) => Severity::Warning,
            // 内部で再走査して回復するため、通知する場合も情報扱い
            InkpadError::Search(SearchError::StaleMatchReference { .. }) => Severity::Info,
            InkpadError::Transfer(TransferError::EmptyDocument) => Severity::Warning,
            InkpadError::Media(MediaError::TableTooLarge { .. }) => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// ユーザー向けメッセージ
    pub fn user_message(&self) -> String {
        match self {
            InkpadError::Search(SearchError::EmptySearchTerm) => {
                "検索語を入力してください".to_string()
            }
            InkpadError::Search(SearchError::NothingToReplace) => {
                "置換できる対象がありません".to_string()
            }
            InkpadError::Search(SearchError::StaleMatchReference { .. }) => {
                "ドキュメントが変更されたため再検索しました".to_string()
            }
            InkpadError::Page(PageError::LastPage) => {
                "最後のページは削除できません".to_string()
            }
            InkpadError::Page(PageError::NotFound { id }) => {
                format!("ページが見つかりません: {}", id)
            }
            InkpadError::Transfer(TransferError::TooLarge { limit, .. }) => {
                format!("ファイルが大きすぎます（上限 {} バイト）", limit)
            }
            InkpadError::Transfer(TransferError::EmptyDocument) => {
                "ドキュメントが空です".to_string()
            }
            InkpadError::Media(MediaError::TableTooLarge { .. }) => format!(
                "表が大きすぎます（最大 {} 行、{} 列）",
                crate::media::MAX_TABLE_ROWS,
                crate::media::MAX_TABLE_COLS
            ),
            InkpadError::Media(MediaError::InvalidUrl { .. }) => "URL が正しくありません".to_string(),
            InkpadError::Media(MediaError::TooLarge { kind, limit, .. }) => format!(
                "{}が大きすぎます（上限 {}MB）",
                kind.label(),
                limit / (1024 * 1024)
            ),
            InkpadError::Media(MediaError::UnsupportedType { kind, .. }) => {
                format!("この{}形式には対応していません", kind.label())
            }
            _ => format!("エラーが発生しました: {}", self),
        }
    }
}

// std::io::Error から InkpadError への変換
impl From<std::io::Error> for InkpadError {
    fn from(error: std::io::Error) -> Self {
        InkpadError::Io {
            message: error.to_string(),
        }
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, InkpadError>;
