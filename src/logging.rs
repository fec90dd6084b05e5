//! ロギングシステム
//!
//! `log` ファサードのバックエンド。標準エラー出力と任意のファイル出力に対応する

use crate::config::LoggingConfig;
use crate::error::{InkpadError, Result};
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

/// ロガー
#[derive(Debug, Clone)]
pub struct Logger {
    level: LevelFilter,
    output_stderr: bool,
    output_file: Option<PathBuf>,
}

impl Logger {
    /// デフォルト構築
    pub fn new(level: LevelFilter) -> Self {
        Self {
            level,
            output_stderr: true,
            output_file: None,
        }
    }

    /// 開発者向けロガー
    pub fn for_development() -> Self {
        Self::new(LevelFilter::Debug)
    }

    /// 設定から構築
    pub fn from_config(config: &LoggingConfig) -> Result<Self> {
        let level = LevelFilter::from_str(&config.level).map_err(|_| {
            InkpadError::Logging(format!("unknown log level: {}", config.level))
        })?;
        let mut logger = Self::new(level);
        logger.output_stderr = config.stderr;
        logger.output_file = config.file.clone();
        Ok(logger)
    }

    /// ログレベルを取得
    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// ログレベルを変更
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// ファイル出力を設定
    pub fn with_file_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// 標準エラー出力を無効化
    pub fn without_stderr(mut self) -> Self {
        self.output_stderr = false;
        self
    }

    fn write_line(&self, message: &str) {
        if self.output_stderr {
            eprintln!("{}", message);
        }

        if let Some(path) = &self.output_file {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", message);
            }
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.write_line(&format!(
            "{}: {} in {}",
            record.level(),
            record.args(),
            record.target()
        ));
    }

    fn flush(&self) {}
}

/// 設定に従ってグローバルロガーを登録する
pub fn init(config: &LoggingConfig) -> Result<()> {
    let logger = Logger::from_config(config)?;
    let level = logger.level();
    log::set_boxed_logger(Box::new(logger))
        .map_err(|err| InkpadError::Logging(err.to_string()))?;
    log::set_max_level(level);
    Ok(())
}
