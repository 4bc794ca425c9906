//! Orchestrator - default app と scenario app を experiment に適用する
//!
//! # apply_apps の流れ
//! 1. オプションを畳み込む（stage は必須）
//! 2. Default pass: 登録順に全 default app を実行（`init` は呼ばない）。
//!    エラーは即中断
//! 3. Scenario pass: 宣言順に実行し、default と同名のものはスキップ。
//!    `init`（name + dry-run）の後に stage hook。`init` のエラーは warn ログのみで
//!    hook は必ず走る。`Unresolved` は報告してスキップ、それ以外のエラーは中断
//! 4. configure / pre-start のみ: spec に `set_defaults` を1回だけ適用
//!
//! # 学習ポイント
//! - 1回の呼び出しを `tracing` の span で囲む（run_id でログを束ねる）
//! - `tokio::select!` で hook とキャンセルを競争させる
//! - 失敗時のロールバックはしない（実行済み app の変更は experiment に残る）

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use super::cancel::CancelToken;
use super::registry::AppRegistry;
use crate::domain::options;
use crate::domain::{
    AppError, AppStatus, ApplyError, Experiment, InvocationOption, InvocationOptions, Pass, RunId, Stage,
    StatusRecord,
};
use crate::impls::TracingStatusSink;
use crate::ports::{App, StatusSink, run_stage};

pub struct Orchestrator {
    registry: Arc<AppRegistry>,
    sink: Arc<dyn StatusSink>,
    hook_timeout: Option<Duration>,
}

/// 1回の `apply_apps` 呼び出しの中で共通の値
#[derive(Clone, Copy)]
struct Run {
    id: RunId,
    stage: Stage,
}

impl Orchestrator {
    /// `with_sink` を呼ぶまでは `TracingStatusSink` に報告する
    pub fn new(registry: Arc<AppRegistry>) -> Self {
        Self {
            registry,
            sink: Arc::new(TracingStatusSink),
            hook_timeout: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    /// hook 1回あたりの上限時間。超えた hook は `AppError::TimedOut` で失敗する
    pub fn with_hook_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.hook_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &AppRegistry {
        &self.registry
    }

    /// `opts` の stage について default app と experiment の scenario app を適用する
    pub async fn apply_apps(
        &self,
        exp: &mut Experiment,
        opts: impl IntoIterator<Item = InvocationOption>,
    ) -> Result<(), ApplyError> {
        self.apply_apps_with_cancel(exp, opts, CancelToken::never()).await
    }

    /// [`apply_apps`](Self::apply_apps) と同じ。`cancel` が発火したら
    /// `ApplyError::Cancelled` で早期終了する
    pub async fn apply_apps_with_cancel(
        &self,
        exp: &mut Experiment,
        opts: impl IntoIterator<Item = InvocationOption>,
        mut cancel: CancelToken,
    ) -> Result<(), ApplyError> {
        let invocation = InvocationOptions::new(opts);
        let stage = invocation.stage().ok_or(ApplyError::MissingStage)?;
        let run = Run {
            id: RunId::generate(),
            stage,
        };

        let span = tracing::info_span!(
            "apply_apps",
            run_id = %run.id,
            %stage,
            experiment = %exp.name(),
            dry_run = invocation.dry_run()
        );

        async {
            self.apply_defaults(exp, run, &mut cancel).await?;
            self.apply_scenario(exp, &invocation, run, &mut cancel).await?;

            if stage.normalizes_topology() {
                // app が node を追加している可能性がある
                exp.spec.set_defaults();
                tracing::debug!("topology defaults applied");
            }
            tracing::info!("apps applied");
            Ok::<(), ApplyError>(())
        }
        .instrument(span)
        .await
    }

    async fn apply_defaults(&self, exp: &mut Experiment, run: Run, cancel: &mut CancelToken) -> Result<(), ApplyError> {
        for app in self.registry.defaults() {
            let result = self.run_hook(app.as_ref(), Pass::Default, run, exp, cancel).await?;
            // default app は必ず動く前提なので "not found" も失敗扱い
            let status = if result.is_ok() { AppStatus::Ok } else { AppStatus::Failed };
            self.report(run, app.name(), Pass::Default, status);

            if let Err(source) = result {
                return Err(ApplyError::DefaultApp {
                    app: app.name().to_string(),
                    stage: run.stage,
                    source,
                });
            }
        }
        Ok(())
    }

    async fn apply_scenario(
        &self,
        exp: &mut Experiment,
        invocation: &InvocationOptions,
        run: Run,
        cancel: &mut CancelToken,
    ) -> Result<(), ApplyError> {
        // 各 app が experiment を可変借用するので、名前だけ先に取り出す
        let declared: Vec<String> = match exp.spec.scenario() {
            Some(scenario) => scenario.apps().iter().map(|app| app.name().to_string()).collect(),
            None => return Ok(()),
        };

        for name in declared {
            if self.registry.is_default(&name) {
                tracing::debug!(app = %name, "default app listed in scenario, already applied");
                continue;
            }

            let app = self.registry.resolve(&name);
            let app_options = InvocationOptions::new([
                options::name(name.as_str()),
                options::dry_run(invocation.dry_run()),
            ]);
            if let Err(err) = app.init(&app_options) {
                tracing::warn!(app = %name, error = %err, "app init failed, running stage hook anyway");
            }

            let result = self.run_hook(app.as_ref(), Pass::Scenario, run, exp, cancel).await?;
            self.report(run, &name, Pass::Scenario, AppStatus::of(&result));

            match result {
                Ok(()) | Err(AppError::Unresolved(_)) => {}
                Err(source) => {
                    return Err(ApplyError::ScenarioApp {
                        app: name,
                        stage: run.stage,
                        source,
                    });
                }
            }
        }
        Ok(())
    }

    /// hook を1回実行する。外側のエラーはキャンセル、内側は app 自身の結果
    ///
    /// 実行中にキャンセルされた app は `failed` として報告してから返す。
    async fn run_hook(
        &self,
        app: &dyn App,
        pass: Pass,
        run: Run,
        exp: &mut Experiment,
        cancel: &mut CancelToken,
    ) -> Result<Result<(), AppError>, ApplyError> {
        if cancel.is_cancelled() {
            return Err(ApplyError::Cancelled { stage: run.stage });
        }

        let hook = self.within_timeout(run_stage(app, run.stage, exp));
        tokio::select! {
            biased;
            result = hook => Ok(result),
            () = cancel.cancelled() => {
                tracing::warn!(app = %app.name(), "cancelled while app was running");
                self.report(run, app.name(), pass, AppStatus::Failed);
                Err(ApplyError::Cancelled { stage: run.stage })
            }
        }
    }

    async fn within_timeout(&self, hook: impl Future<Output = Result<(), AppError>>) -> Result<(), AppError> {
        match self.hook_timeout {
            Some(limit) => tokio::time::timeout(limit, hook)
                .await
                .unwrap_or(Err(AppError::TimedOut(limit))),
            None => hook.await,
        }
    }

    fn report(&self, run: Run, app: &str, pass: Pass, status: AppStatus) {
        self.sink.report(&StatusRecord::new(run.id, app, run.stage, pass, status));
    }
}
