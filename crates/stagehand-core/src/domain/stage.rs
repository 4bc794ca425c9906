//! Stage - app が hook できるライフサイクル上の段階

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A point in an experiment's life where apps are applied.
///
/// Serialized (and parsed) in kebab-case: `configure`, `pre-start`,
/// `post-start`, `cleanup`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Configure,
    PreStart,
    PostStart,
    Cleanup,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Configure,
        Stage::PreStart,
        Stage::PostStart,
        Stage::Cleanup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Configure => "configure",
            Stage::PreStart => "pre-start",
            Stage::PostStart => "post-start",
            Stage::Cleanup => "cleanup",
        }
    }

    /// Apps may still add topology elements during these stages, so the
    /// experiment spec is re-normalized once every app for the stage has run.
    /// After pre-start the topology is frozen.
    pub fn normalizes_topology(&self) -> bool {
        matches!(self, Stage::Configure | Stage::PreStart)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage '{0}' (expected configure, pre-start, post-start or cleanup)")]
pub struct ParseStageError(String);

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ParseStageError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::configure("configure", Stage::Configure)]
    #[case::pre_start("pre-start", Stage::PreStart)]
    #[case::post_start("post-start", Stage::PostStart)]
    #[case::cleanup("cleanup", Stage::Cleanup)]
    fn parses_and_displays_kebab_case(#[case] text: &str, #[case] stage: Stage) {
        assert_eq!(text.parse::<Stage>().unwrap(), stage);
        assert_eq!(stage.to_string(), text);

        let json = serde_json::to_string(&stage).unwrap();
        assert_eq!(json, format!("\"{text}\""));
    }

    #[test]
    fn rejects_unknown_stage() {
        let err = "prestart".parse::<Stage>().unwrap_err();
        assert!(err.to_string().contains("prestart"));
    }

    #[rstest]
    #[case::configure(Stage::Configure, true)]
    #[case::pre_start(Stage::PreStart, true)]
    #[case::post_start(Stage::PostStart, false)]
    #[case::cleanup(Stage::Cleanup, false)]
    fn only_early_stages_normalize_topology(#[case] stage: Stage, #[case] expected: bool) {
        assert_eq!(stage.normalizes_topology(), expected);
    }
}
