//! inkpad - リッチテキスト文書の検索・置換エンジン
//!
//! マークアップ文書に対する検索ハイライト、循環ナビゲーション、
//! 置換と、それを取り巻くページ管理・自動保存を提供する。

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;
pub mod notify;

// 文書層
pub mod markup;
pub mod surface;

// ロジック層
pub mod search;

// 周辺機能
pub mod autosave;
pub mod keymap;
pub mod media;
pub mod stats;
pub mod transfer;
pub mod workbook;

// 公開API
pub use error::{InkpadError, Result};
pub use search::{FindReplaceEngine, LiteralMatcher, StringMatcher};
pub use surface::{DocumentSurface, MemorySurface};
pub use workbook::Workbook;
