//! StatusSink の実装
//!
//! - **TracingStatusSink**: record ごとに構造化された `tracing` イベントを1つ（デフォルト）
//! - **ConsoleStatusSink**: 人が読む `[✓] 'ntp' default app (configure)` 形式の行
//! - **RecordingStatusSink**: メモリに保持（サマリ表示やテスト用）

use std::io::Write;
use std::sync::Mutex;

use crate::domain::{AppStatus, Pass, StatusRecord};
use crate::ports::StatusSink;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn report(&self, record: &StatusRecord) {
        let app = record.app.as_str();
        let stage = record.stage.as_str();
        let pass = record.pass.as_str();
        match record.status {
            AppStatus::Ok => tracing::info!(run_id = %record.run_id, app, stage, pass, status = "ok", "app applied"),
            AppStatus::Unresolved => {
                tracing::warn!(run_id = %record.run_id, app, stage, pass, status = "unresolved", "app not found, skipped")
            }
            AppStatus::Failed => tracing::error!(run_id = %record.run_id, app, stage, pass, status = "failed", "app failed"),
        }
    }
}

/// Writes one line per record to `W` (stderr by default, so stdout stays free
/// for experiment output).
pub struct ConsoleStatusSink<W: Write + Send = std::io::Stderr> {
    out: Mutex<W>,
}

impl ConsoleStatusSink {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}

impl<W: Write + Send> ConsoleStatusSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn line(record: &StatusRecord) -> String {
        let symbol = match record.status {
            AppStatus::Ok => "✓",
            AppStatus::Failed => "✗",
            AppStatus::Unresolved => "?",
        };
        let kind = match record.pass {
            Pass::Default => "default",
            Pass::Scenario => "experiment",
        };
        format!("[{symbol}] '{}' {kind} app ({})", record.app, record.stage)
    }
}

impl<W: Write + Send> StatusSink for ConsoleStatusSink<W> {
    fn report(&self, record: &StatusRecord) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // a closed console must not abort the run
        let _ = writeln!(out, "{}", Self::line(record));
    }
}

#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    records: Mutex<Vec<StatusRecord>>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<StatusRecord> {
        self.lock().clone()
    }

    /// `(app, status)` pairs in report order.
    pub fn statuses(&self) -> Vec<(String, AppStatus)> {
        self.lock().iter().map(|r| (r.app.clone(), r.status)).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StatusRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StatusSink for RecordingStatusSink {
    fn report(&self, record: &StatusRecord) {
        self.lock().push(record.clone());
    }
}
