//! 自動保存
//!
//! アクティブページの内容を1つの JSON ブロブとして保存する。
//! 保存の周期実行はホスト側が受け持ち、ここでは期限判定と直列化を扱う。

use crate::config::{ensure_parent_dir, AutosaveConfig};
use crate::error::{AutosaveError, ConfigError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 保存レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveRecord {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub page_id: String,
}

/// ブロブの保存先
pub trait AutosaveStore {
    fn save(&mut self, blob: &str) -> Result<()>;
    fn load(&self) -> Result<Option<String>>;
    fn clear(&mut self) -> Result<()>;
}

/// メモリ上の保存先
#[derive(Debug, Clone, Default)]
pub struct MemoryAutosaveStore {
    blob: Option<String>,
}

impl MemoryAutosaveStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AutosaveStore for MemoryAutosaveStore {
    fn save(&mut self, blob: &str) -> Result<()> {
        self.blob = Some(blob.to_string());
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        Ok(self.blob.clone())
    }

    fn clear(&mut self) -> Result<()> {
        self.blob = None;
        Ok(())
    }
}

/// ファイルへの保存先
#[derive(Debug, Clone)]
pub struct FileAutosaveStore {
    path: PathBuf,
}

impl FileAutosaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 設定の保存先を使う。データディレクトリが取得できなければエラー
    pub fn from_config(config: &AutosaveConfig) -> Result<Self> {
        config
            .resolve_path()
            .map(Self::new)
            .ok_or_else(|| {
                AutosaveError::Storage {
                    message: "no data directory for autosave".to_string(),
                }
                .into()
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn storage_error(err: std::io::Error) -> AutosaveError {
    AutosaveError::Storage {
        message: err.to_string(),
    }
}

impl AutosaveStore for FileAutosaveStore {
    fn save(&mut self, blob: &str) -> Result<()> {
        ensure_parent_dir(&self.path).map_err(storage_error)?;
        std::fs::write(&self.path, blob).map_err(storage_error)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(storage_error(err).into()),
        }
    }

    fn clear(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(storage_error(err).into()),
        }
    }
}

/// 自動保存の制御
#[derive(Debug)]
pub struct Autosaver<S: AutosaveStore> {
    store: S,
    interval: Duration,
    max_age: Duration,
    last_saved: Option<DateTime<Utc>>,
}

impl<S: AutosaveStore> Autosaver<S> {
    /// 設定値が時間として表せない場合は `ConfigError::InvalidValue`
    pub fn new(store: S, config: &AutosaveConfig) -> Result<Self> {
        let interval = i64::try_from(config.interval_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "autosave.interval-secs".to_string(),
                value: config.interval_secs.to_string(),
            })?;
        let max_age =
            Duration::try_minutes(config.max_age_mins).ok_or_else(|| ConfigError::InvalidValue {
                key: "autosave.max-age-mins".to_string(),
                value: config.max_age_mins.to_string(),
            })?;
        Ok(Self {
            store,
            interval,
            max_age,
            last_saved: None,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 前回の保存から間隔が経過したか
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_saved {
            Some(last) => now - last >= self.interval,
            None => true,
        }
    }

    /// レコードを保存する
    pub fn save(&mut self, record: &AutosaveRecord) -> Result<()> {
        let blob = serde_json::to_string(record).map_err(|err| AutosaveError::Corrupt {
            message: err.to_string(),
        })?;
        self.store.save(&blob)?;
        self.last_saved = Some(record.timestamp);
        log::debug!("autosaved page {} ({} bytes)", record.page_id, blob.len());
        Ok(())
    }

    /// 期限内のレコードを読み込む
    ///
    /// 期限切れのレコードは削除する。壊れたレコードは無視する。
    pub fn load_recent(&mut self, now: DateTime<Utc>) -> Result<Option<AutosaveRecord>> {
        let Some(blob) = self.store.load()? else {
            return Ok(None);
        };

        let record: AutosaveRecord = match serde_json::from_str(&blob) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("ignoring corrupt autosave record: {}", err);
                return Ok(None);
            }
        };

        if now - record.timestamp >= self.max_age {
            log::info!("discarding autosave from {}", record.timestamp.to_rfc3339());
            self.store.clear()?;
            return Ok(None);
        }
        Ok(Some(record))
    }

    /// 保存内容を消去する
    pub fn clear(&mut self) -> Result<()> {
        self.last_saved = None;
        self.store.clear()
    }
}
