//! ユーザー通知
//!
//! 検索件数や警告をユーザーへ伝える一方向の通知口

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// 通知の重要度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// 表示持続時間（成功・情報は5秒、警告・エラーは8秒）
    pub fn display_duration(self) -> Duration {
        match self {
            Severity::Info | Severity::Success => Duration::from_secs(5),
            Severity::Warning | Severity::Error => Duration::from_secs(8),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

/// 1件の通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// 通知の受け口
///
/// 送りっぱなしで、戻り値は使わない。
pub trait NotificationSink {
    fn notify(&self, message: &str, severity: Severity);
}

/// `log` へ転送する通知口
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => log::info!("[{}] {}", severity.as_str(), message),
            Severity::Warning => log::warn!("{}", message),
            Severity::Error => log::error!("{}", message),
        }
    }
}

/// 通知を記録する通知口
///
/// クローンは同じ記録を共有する。
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    records: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 記録済みの通知を取得
    pub fn notifications(&self) -> Vec<Notification> {
        self.records.borrow().clone()
    }

    /// 最後の通知
    pub fn last(&self) -> Option<Notification> {
        self.records.borrow().last().cloned()
    }

    /// 記録を取り出して空にする
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.records.borrow_mut())
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.records.borrow_mut().push(Notification {
            message: message.to_string(),
            severity,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_shares_records_between_clones() {
        let notifier = RecordingNotifier::new();
        let handle = notifier.clone();
        notifier.notify("hello", Severity::Success);

        let last = handle.last().expect("notification");
        assert_eq!(last.message, "hello");
        assert_eq!(last.severity, Severity::Success);
        assert_eq!(handle.take().len(), 1);
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn warnings_stay_longer() {
        assert!(Severity::Warning.display_duration() > Severity::Info.display_duration());
        assert_eq!(Severity::Error.display_duration(), Duration::from_secs(8));
    }
}
