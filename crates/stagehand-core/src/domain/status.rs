//! StatusSink に渡す status record（app の実行1回につき1件）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::AppError;
use super::ids::RunId;
use super::stage::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Ok,
    Failed,
    /// The app is not available on this deployment. Not a failure.
    Unresolved,
}

impl AppStatus {
    /// Classify a hook result.
    pub fn of(result: &Result<(), AppError>) -> Self {
        match result {
            Ok(()) => AppStatus::Ok,
            Err(AppError::Unresolved(_)) => AppStatus::Unresolved,
            Err(_) => AppStatus::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppStatus::Ok => "ok",
            AppStatus::Failed => "failed",
            AppStatus::Unresolved => "unresolved",
        }
    }
}

/// Which pass of `apply_apps` an invocation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Default,
    Scenario,
}

impl Pass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pass::Default => "default",
            Pass::Scenario => "scenario",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub run_id: RunId,
    pub app: String,
    pub stage: Stage,
    pub pass: Pass,
    pub status: AppStatus,
    pub at: DateTime<Utc>,
}

impl StatusRecord {
    pub fn new(run_id: RunId, app: impl Into<String>, stage: Stage, pass: Pass, status: AppStatus) -> Self {
        Self {
            run_id,
            app: app.into(),
            stage,
            pass,
            status,
            at: Utc::now(),
        }
    }
}
