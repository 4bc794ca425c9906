//! Invocation Options - 呼び出しごとのオプション
//!
//! 呼び出し側は [`InvocationOption`] のリストを `Orchestrator::apply_apps` に渡し、
//! ゼロ値の [`InvocationOptions`] に順に畳み込まれる。同じフィールドは後勝ち。
//!
//! ```ignore
//! orchestrator
//!     .apply_apps(&mut exp, [options::stage(Stage::Configure), options::dry_run(true)])
//!     .await?;
//! ```

use super::stage::Stage;

/// A single option value. Build these with [`stage`], [`dry_run`] and [`name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOption {
    Stage(Stage),
    DryRun(bool),
    Name(String),
}

pub fn stage(stage: Stage) -> InvocationOption {
    InvocationOption::Stage(stage)
}

pub fn dry_run(enabled: bool) -> InvocationOption {
    InvocationOption::DryRun(enabled)
}

pub fn name(name: impl Into<String>) -> InvocationOption {
    InvocationOption::Name(name.into())
}

/// Accumulated options for one `apply_apps` call or one scenario-app `init`.
///
/// Immutable once built: there are getters, no setters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOptions {
    stage: Option<Stage>,
    dry_run: bool,
    name: Option<String>,
}

impl InvocationOptions {
    pub fn new(opts: impl IntoIterator<Item = InvocationOption>) -> Self {
        let mut options = Self::default();
        for opt in opts {
            options.apply(opt);
        }
        options
    }

    fn apply(&mut self, opt: InvocationOption) {
        match opt {
            InvocationOption::Stage(stage) => self.stage = Some(stage),
            InvocationOption::DryRun(enabled) => self.dry_run = enabled,
            InvocationOption::Name(name) => self.name = Some(name),
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl FromIterator<InvocationOption> for InvocationOptions {
    fn from_iter<I: IntoIterator<Item = InvocationOption>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_value_has_no_stage_and_dry_run_off() {
        let options = InvocationOptions::new(Vec::new());
        assert_eq!(options.stage(), None);
        assert!(!options.dry_run());
        assert_eq!(options.name(), None);
    }

    #[test]
    fn accumulates_every_option() {
        let options: InvocationOptions = [stage(Stage::PostStart), dry_run(true), name("scorch")]
            .into_iter()
            .collect();

        assert_eq!(options.stage(), Some(Stage::PostStart));
        assert!(options.dry_run());
        assert_eq!(options.name(), Some("scorch"));
    }

    #[test]
    fn later_values_win() {
        let options = InvocationOptions::new([
            stage(Stage::Configure),
            dry_run(true),
            stage(Stage::Cleanup),
            dry_run(false),
        ]);

        assert_eq!(options.stage(), Some(Stage::Cleanup));
        assert!(!options.dry_run());
    }
}
