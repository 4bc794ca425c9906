//! App port - ライフサイクル app が実装する能力の契約

use async_trait::async_trait;

use crate::domain::{AppError, Experiment, InvocationOptions, Stage};

/// App は各ライフサイクル stage で experiment に適用される
///
/// 各 hook は適用対象の experiment を受け取り、必要に応じて書き換える。
/// 関心のない hook は省略してよい（デフォルト実装は何もせず成功する）。
///
/// # 使用例
/// ```ignore
/// struct Tap;
///
/// #[async_trait]
/// impl App for Tap {
///     fn name(&self) -> &str {
///         "tap"
///     }
///
///     async fn configure(&self, exp: &mut Experiment) -> Result<(), AppError> {
///         exp.spec.topology.nodes.push(Node::new("tap-host"));
///         Ok(())
///     }
/// }
/// ```
///
/// App は `Arc<dyn App>` として共有され呼び出しをまたいで再利用されるので、
/// `init` で受け取った状態は内部可変性で持つ。
#[async_trait]
pub trait App: Send + Sync {
    fn name(&self) -> &str;

    /// hook の前に呼び出しごとのオプション（name, dry-run）を受け取る
    ///
    /// scenario app にだけ呼ばれる。エラーは warn ログに出るだけで hook は実行される。
    fn init(&self, _options: &InvocationOptions) -> Result<(), AppError> {
        Ok(())
    }

    async fn configure(&self, _exp: &mut Experiment) -> Result<(), AppError> {
        Ok(())
    }

    async fn pre_start(&self, _exp: &mut Experiment) -> Result<(), AppError> {
        Ok(())
    }

    async fn post_start(&self, _exp: &mut Experiment) -> Result<(), AppError> {
        Ok(())
    }

    async fn cleanup(&self, _exp: &mut Experiment) -> Result<(), AppError> {
        Ok(())
    }
}

/// `stage` に対応する hook を1つだけ呼ぶ
pub async fn run_stage(app: &dyn App, stage: Stage, exp: &mut Experiment) -> Result<(), AppError> {
    match stage {
        Stage::Configure => app.configure(exp).await,
        Stage::PreStart => app.pre_start(exp).await,
        Stage::PostStart => app.post_start(exp).await,
        Stage::Cleanup => app.cleanup(exp).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct OnlyCleanup {
        seen: Mutex<Vec<Stage>>,
    }

    #[async_trait]
    impl App for OnlyCleanup {
        fn name(&self) -> &str {
            "only-cleanup"
        }

        async fn cleanup(&self, _exp: &mut Experiment) -> Result<(), AppError> {
            self.seen.lock().unwrap().push(Stage::Cleanup);
            Ok(())
        }
    }

    #[tokio::test]
    async fn unimplemented_hooks_succeed_and_stage_picks_one_hook() {
        let app = OnlyCleanup {
            seen: Mutex::new(Vec::new()),
        };
        let mut exp = Experiment::new("lab");

        for stage in Stage::ALL {
            run_stage(&app, stage, &mut exp).await.unwrap();
        }

        assert_eq!(*app.seen.lock().unwrap(), vec![Stage::Cleanup]);
        assert!(app.init(&InvocationOptions::default()).is_ok());
    }
}
