//! エディタ設定
//!
//! JSON ファイルから読み込む。項目が欠けている場合は既定値で補う。

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 配色テーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "ライト",
            Theme::Dark => "ダーク",
        }
    }
}

/// ハイライト配色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HighlightPalette {
    pub current: String,
    pub other: String,
}

/// 検索設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    /// マーカー要素のクラス名
    pub marker_class: String,
    pub light: HighlightPalette,
    pub dark: HighlightPalette,
}

impl SearchConfig {
    pub fn palette(&self, theme: Theme) -> &HighlightPalette {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            marker_class: "search-highlight".to_string(),
            light: HighlightPalette {
                current: "#f59e0b".to_string(),
                other: "#fef3c7".to_string(),
            },
            dark: HighlightPalette {
                current: "#d97706".to_string(),
                other: "#f59e0b".to_string(),
            },
        }
    }
}

/// 自動保存間隔の上限（1日）
pub const MAX_AUTOSAVE_INTERVAL_SECS: u64 = 86_400;
/// 復元対象期間の上限（1年）
pub const MAX_AUTOSAVE_AGE_MINS: i64 = 525_600;

/// 自動保存設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AutosaveConfig {
    /// 保存間隔（秒）
    pub interval_secs: u64,
    /// 復元対象とする最大経過時間（分）
    pub max_age_mins: i64,
    /// 保存先（未指定時はデータディレクトリ）
    pub path: Option<PathBuf>,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            max_age_mins: 120,
            path: None,
        }
    }
}

impl AutosaveConfig {
    pub fn resolve_path(&self) -> Option<PathBuf> {
        match &self.path {
            Some(path) => Some(path.clone()),
            None => dirs::data_dir().map(|dir| dir.join("inkpad").join("autosave.json")),
        }
    }
}

/// 取り込み設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TransferConfig {
    /// 取り込めるテキストの最大サイズ（バイト）
    pub max_import_bytes: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_import_bytes: 10 * 1024 * 1024,
        }
    }
}

/// ログ設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// "error" / "warn" / "info" / "debug" / "trace" / "off"
    pub level: String,
    pub stderr: bool,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            stderr: true,
            file: None,
        }
    }
}

/// エディタ全体の設定
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorConfig {
    pub theme: Theme,
    pub search: SearchConfig,
    pub autosave: AutosaveConfig,
    pub transfer: TransferConfig,
    pub logging: LoggingConfig,
}

impl EditorConfig {
    /// 既定の設定ファイルパス
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("inkpad").join("config.json"))
    }

    /// 既定の場所から読み込む。ファイルがなければ既定値
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// 指定パスから読み込む。ファイルがなければ既定値
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|err| ConfigError::InvalidFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 指定パスへ保存する
    pub fn save(&self, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let raw = serde_json::to_string_pretty(self).map_err(|err| ConfigError::InvalidFile {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// 値の範囲を検査する
    pub fn validate(&self) -> Result<()> {
        if self.search.marker_class.trim().is_empty()
            || self.search.marker_class.chars().any(char::is_whitespace)
        {
            return Err(ConfigError::InvalidValue {
                key: "search.marker-class".to_string(),
                value: self.search.marker_class.clone(),
            }
            .into());
        }
        if !(1..=MAX_AUTOSAVE_INTERVAL_SECS).contains(&self.autosave.interval_secs) {
            return Err(ConfigError::InvalidValue {
                key: "autosave.interval-secs".to_string(),
                value: self.autosave.interval_secs.to_string(),
            }
            .into());
        }
        if !(1..=MAX_AUTOSAVE_AGE_MINS).contains(&self.autosave.max_age_mins) {
            return Err(ConfigError::InvalidValue {
                key: "autosave.max-age-mins".to_string(),
                value: self.autosave.max_age_mins.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// ヘルパー：親ディレクトリを作成
pub(crate) fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InkpadError;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = EditorConfig::load(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.autosave.interval_secs, 30);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "theme": "dark", "search": { "marker-class": "hit" } }"#)
            .unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.search.marker_class, "hit");
        assert_eq!(config.search.light.current, "#f59e0b");
        assert_eq!(config.transfer.max_import_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        match EditorConfig::load(&path) {
            Err(InkpadError::Config(ConfigError::InvalidFile { .. })) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_marker_class_with_spaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "search": { "marker-class": "a b" } }"#).unwrap();
        assert!(matches!(
            EditorConfig::load(&path),
            Err(InkpadError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn rejects_autosave_values_out_of_range() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        for raw in [
            r#"{ "autosave": { "max-age-mins": 9223372036854775807 } }"#,
            r#"{ "autosave": { "max-age-mins": 0 } }"#,
            r#"{ "autosave": { "interval-secs": 18446744073709551615 } }"#,
            r#"{ "autosave": { "interval-secs": 0 } }"#,
        ] {
            std::fs::write(&path, raw).unwrap();
            assert!(
                matches!(
                    EditorConfig::load(&path),
                    Err(InkpadError::Config(ConfigError::InvalidValue { .. }))
                ),
                "accepted {raw}"
            );
        }

        let mut config = EditorConfig::default();
        config.autosave.max_age_mins = MAX_AUTOSAVE_AGE_MINS;
        config.autosave.interval_secs = MAX_AUTOSAVE_INTERVAL_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = EditorConfig::default();
        config.theme = Theme::Dark;
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }
}
