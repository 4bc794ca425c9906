//! ExternalCommandApp - 外部実行ファイルとして実装された app を動かす
//!
//! # プロトコル
//! 1. `CommandFinder` で `<prefix><name>` を探す（なければ `AppError::Unresolved`）
//! 2. `<command> <stage> [--dry-run]` として起動
//! 3. experiment を JSON で stdin に書く
//! 4. 非ゼロ終了: trim した stderr 付きの `AppError::CommandFailed`
//! 5. stdout が空でなければ更新後の experiment として呼び出し側のものを置き換える
//!
//! # 学習ポイント
//! - `tokio::process::Command` と `kill_on_drop`
//! - stdin 書き込みと stdout 読み出しを `tokio::join!` で並行させる

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::domain::{AppError, Experiment, InvocationOptions, Stage};
use crate::ports::{App, CommandFinder};

pub const DRY_RUN_FLAG: &str = "--dry-run";

pub struct ExternalCommandApp {
    name: String,
    prefix: String,
    finder: Arc<dyn CommandFinder>,
    dry_run: AtomicBool,
}

impl ExternalCommandApp {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, finder: Arc<dyn CommandFinder>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            finder,
            dry_run: AtomicBool::new(false),
        }
    }

    /// Executable name this app runs.
    pub fn command(&self) -> String {
        format!("{}{}", self.prefix, self.name)
    }

    async fn run(&self, stage: Stage, exp: &mut Experiment) -> Result<(), AppError> {
        let command = self.command();
        let Some(path) = self.finder.locate(&command) else {
            return Err(AppError::Unresolved(self.name.clone()));
        };

        let input = serde_json::to_vec(exp)?;

        let mut cmd = Command::new(&path);
        cmd.arg(stage.as_str());
        if self.dry_run.load(Ordering::Relaxed) {
            cmd.arg(DRY_RUN_FLAG);
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(app = %self.name, command = %path.display(), stage = %stage, "running external app");
        let mut child = cmd.spawn()?;

        // stdin is fed while stdout is drained, otherwise a command echoing a
        // large experiment back would block on a full pipe
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(&input).await {
                    Err(err) if err.kind() != io::ErrorKind::BrokenPipe => return Err(err),
                    _ => {}
                }
                // dropping stdin closes it so the command sees EOF
            }
            Ok(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(AppError::CommandFailed {
                command,
                code: output
                    .status
                    .code()
                    .map_or_else(|| "signal".to_string(), |code| code.to_string()),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        fed?;

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        *exp = serde_json::from_slice(&output.stdout)?;
        Ok(())
    }
}

#[async_trait]
impl App for ExternalCommandApp {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self, options: &InvocationOptions) -> Result<(), AppError> {
        self.dry_run.store(options.dry_run(), Ordering::Relaxed);
        Ok(())
    }

    async fn configure(&self, exp: &mut Experiment) -> Result<(), AppError> {
        self.run(Stage::Configure, exp).await
    }

    async fn pre_start(&self, exp: &mut Experiment) -> Result<(), AppError> {
        self.run(Stage::PreStart, exp).await
    }

    async fn post_start(&self, exp: &mut Experiment) -> Result<(), AppError> {
        self.run(Stage::PostStart, exp).await
    }

    async fn cleanup(&self, exp: &mut Experiment) -> Result<(), AppError> {
        self.run(Stage::Cleanup, exp).await
    }
}
