//! Errors - app 単位とオーケストレーション単位のエラー
//!
//! # 2層構成
//! - [`AppError`]: app の hook 1回が返すエラー。Orchestrator が特別扱いするのは
//!   `Unresolved` だけで、それ以外はすべて実行失敗
//! - [`ApplyError`]: `apply_apps` が返すエラー。app 名と stage を持ち、
//!   元の `AppError` を source として保持する

use std::time::Duration;

use thiserror::Error;

use super::stage::Stage;

#[derive(Debug, Error)]
pub enum AppError {
    /// No internal app and no external command matched the name.
    #[error("app '{0}' not found")]
    Unresolved(String),

    #[error("{0}")]
    Hook(String),

    #[error("command {command} exited with {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: String,
        stderr: String,
    },

    #[error("hook timed out after {0:?}")]
    TimedOut(Duration),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("experiment json: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    pub fn hook(message: impl Into<String>) -> Self {
        AppError::Hook(message.into())
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, AppError::Unresolved(_))
    }
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("no stage given for app invocation")]
    MissingStage,

    #[error("applying default app {app} for stage {stage}: {source}")]
    DefaultApp {
        app: String,
        stage: Stage,
        #[source]
        source: AppError,
    },

    #[error("applying experiment app {app} for stage {stage}: {source}")]
    ScenarioApp {
        app: String,
        stage: Stage,
        #[source]
        source: AppError,
    },

    #[error("applying apps for stage {stage} cancelled")]
    Cancelled { stage: Stage },
}

impl ApplyError {
    /// Name of the app that failed, if the error came from an app.
    pub fn app(&self) -> Option<&str> {
        match self {
            ApplyError::DefaultApp { app, .. } | ApplyError::ScenarioApp { app, .. } => Some(app),
            ApplyError::MissingStage | ApplyError::Cancelled { .. } => None,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            ApplyError::DefaultApp { stage, .. }
            | ApplyError::ScenarioApp { stage, .. }
            | ApplyError::Cancelled { stage } => Some(*stage),
            ApplyError::MissingStage => None,
        }
    }

    /// The underlying app error, if any.
    pub fn app_error(&self) -> Option<&AppError> {
        match self {
            ApplyError::DefaultApp { source, .. } | ApplyError::ScenarioApp { source, .. } => Some(source),
            ApplyError::MissingStage | ApplyError::Cancelled { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn apply_error_names_app_stage_and_cause() {
        let err = ApplyError::ScenarioApp {
            app: "scorch".to_string(),
            stage: Stage::PostStart,
            source: AppError::hook("disk full"),
        };

        assert_eq!(
            err.to_string(),
            "applying experiment app scorch for stage post-start: disk full"
        );
        assert_eq!(err.app(), Some("scorch"));
        assert_eq!(err.stage(), Some(Stage::PostStart));
        assert_eq!(err.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn only_unresolved_is_unresolved() {
        assert!(AppError::Unresolved("x".into()).is_unresolved());
        assert!(!AppError::hook("x").is_unresolved());
        assert!(!AppError::TimedOut(Duration::from_secs(1)).is_unresolved());
    }
}
