//! キーボードショートカット

use serde::{Deserialize, Serialize};

/// ホストから届くキー入力
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct KeyStroke {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    /// macOS の Command キー（Ctrl と同じ扱い）
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyStroke {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    fn command_modifier(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// ホストの編集領域がそのまま実行するコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostCommand {
    Bold,
    Italic,
    Underline,
    Undo,
    Redo,
}

/// ショートカットに対応するエディタコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EditorCommand {
    OpenSearch,
    FindNext,
    FindPrevious,
    CloseSearch,
    NewPage,
    ExportText,
    ToggleTheme,
    Host(HostCommand),
}

/// キー入力をコマンドに変換する
pub fn resolve(stroke: &KeyStroke) -> Option<EditorCommand> {
    let key = stroke.key.as_str();

    match key {
        "F3" if stroke.shift => return Some(EditorCommand::FindPrevious),
        "F3" => return Some(EditorCommand::FindNext),
        "Escape" => return Some(EditorCommand::CloseSearch),
        _ => {}
    }

    if !stroke.command_modifier() {
        return None;
    }

    let command = match key.to_ascii_lowercase().as_str() {
        "f" => EditorCommand::OpenSearch,
        "g" => EditorCommand::FindNext,
        "n" => EditorCommand::NewPage,
        "s" => EditorCommand::ExportText,
        "t" => EditorCommand::ToggleTheme,
        "b" => EditorCommand::Host(HostCommand::Bold),
        "i" => EditorCommand::Host(HostCommand::Italic),
        "u" => EditorCommand::Host(HostCommand::Underline),
        "z" => EditorCommand::Host(HostCommand::Undo),
        "y" if stroke.shift => EditorCommand::Host(HostCommand::Redo),
        _ => return None,
    };
    Some(command)
}
