//! AppRegistry - 名前による app 検索、default app の集合、フォールバック解決
//!
//! 初期化時に一度だけ（可変の builder で）構築し、その後は読み取り専用で共有する
//! （`Arc<AppRegistry>`）。ロックもプロセス全体の状態も持たない。
//!
//! # 解決順序
//! 1. 名前で直接検索
//! 2. 見つからなければ fallback factory がその名前の app を作る（通常は
//!    `ExternalCommandApp`）。名前が本当に存在するかは hook 実行時に初めて分かり、
//!    存在しなければ `AppError::Unresolved` を返す
//!
//! # 学習ポイント
//! - Builder パターンと起動時検証（Fail-fast 設計）
//! - `HashMap<String, Arc<dyn App>>` による trait object の登録

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{AppError, Experiment, InvocationOptions};
use crate::impls::ExternalCommandApp;
use crate::ports::{App, CommandFinder};

pub const DEFAULT_COMMAND_PREFIX: &str = "stagehand-app-";

/// 登録されていない名前の app を作る factory
pub type AppFactory = Arc<dyn Fn(&str) -> Arc<dyn App> + Send + Sync>;

pub struct AppRegistry {
    apps: HashMap<String, Arc<dyn App>>,
    /// 登録順（= default pass の実行順）
    defaults: Vec<String>,
    fallback: Option<AppFactory>,
    command_prefix: String,
}

impl AppRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// 登録済みの app（フォールバックなし）
    pub fn get(&self, name: &str) -> Option<Arc<dyn App>> {
        self.apps.get(name).cloned()
    }

    /// 登録済みの app、なければフォールバックの app
    ///
    /// 失敗しない。fallback factory がなければ、全 hook が
    /// `AppError::Unresolved` を返す app になる。
    pub fn resolve(&self, name: &str) -> Arc<dyn App> {
        if let Some(app) = self.apps.get(name) {
            return Arc::clone(app);
        }
        match &self.fallback {
            Some(factory) => factory(name),
            None => Arc::new(MissingApp { name: name.to_string() }),
        }
    }

    /// default app を登録順で返す
    pub fn defaults(&self) -> Vec<Arc<dyn App>> {
        self.defaults
            .iter()
            .filter_map(|name| self.apps.get(name).cloned())
            .collect()
    }

    pub fn default_names(&self) -> &[String] {
        &self.defaults
    }

    pub fn is_default(&self, name: &str) -> bool {
        self.defaults.iter().any(|d| d == name)
    }

    pub fn command_prefix(&self) -> &str {
        &self.command_prefix
    }

    /// scenario で指定する意味のある名前（default 以外の登録済み app と
    /// `finder` が見つけた外部コマンド）。ソート済み・重複なし
    ///
    /// default は常に実行されるので含めない。
    pub fn names(&self, finder: &dyn CommandFinder) -> Vec<String> {
        let mut names: BTreeSet<String> = self
            .apps
            .keys()
            .filter(|name| !self.is_default(name))
            .cloned()
            .collect();
        names.extend(finder.find_commands_with_prefix(&self.command_prefix));
        names.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

/// どこにも解決できない名前の代役
struct MissingApp {
    name: String,
}

impl MissingApp {
    fn unresolved(&self) -> Result<(), AppError> {
        Err(AppError::Unresolved(self.name.clone()))
    }
}

#[async_trait]
impl App for MissingApp {
    fn name(&self) -> &str {
        &self.name
    }

    async fn configure(&self, _exp: &mut Experiment) -> Result<(), AppError> {
        self.unresolved()
    }

    async fn pre_start(&self, _exp: &mut Experiment) -> Result<(), AppError> {
        self.unresolved()
    }

    async fn post_start(&self, _exp: &mut Experiment) -> Result<(), AppError> {
        self.unresolved()
    }

    async fn cleanup(&self, _exp: &mut Experiment) -> Result<(), AppError> {
        self.unresolved()
    }

    fn init(&self, _options: &InvocationOptions) -> Result<(), AppError> {
        Ok(())
    }
}

/// RegistryBuilder は [`AppRegistry`] を構築
///
/// # 使用例
/// ```ignore
/// let registry = AppRegistry::builder()
///     .register_default(Arc::new(Ntp::default()))
///     .register(Arc::new(Tap))
///     .with_external_commands(Arc::new(PathCommandFinder::from_env()), DEFAULT_COMMAND_PREFIX)
///     .expect_defaults(&["ntp"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - expect_defaults() で期待される default app を登録
/// - build() 時に「期待集合 ⊆ 登録済み default 集合」をチェック
/// - 不足があれば BuildError を返す
pub struct RegistryBuilder {
    apps: HashMap<String, Arc<dyn App>>,
    defaults: Vec<String>,
    fallback: Option<AppFactory>,
    command_prefix: String,
    expected_defaults: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing default apps: {0:?}. These apps were expected but not registered as defaults.")]
    MissingDefaults(Vec<String>),
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            apps: HashMap::new(),
            defaults: Vec::new(),
            fallback: None,
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            expected_defaults: None,
        }
    }

    /// app を自身の名前で登録（後勝ち）
    pub fn register(mut self, app: Arc<dyn App>) -> Self {
        self.apps.insert(app.name().to_string(), app);
        self
    }

    /// app を登録し、default app として印を付ける
    pub fn register_default(mut self, app: Arc<dyn App>) -> Self {
        let name = app.name().to_string();
        if !self.defaults.contains(&name) {
            self.defaults.push(name);
        }
        self.register(app)
    }

    /// 未登録の名前に使う factory
    pub fn fallback<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str) -> Arc<dyn App> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(factory));
        self
    }

    /// 未登録の名前を外部コマンド `<prefix><name>` に解決する
    pub fn with_external_commands(mut self, finder: Arc<dyn CommandFinder>, prefix: impl Into<String>) -> Self {
        self.command_prefix = prefix.into();
        let prefix = self.command_prefix.clone();
        self.fallback(move |name| {
            Arc::new(ExternalCommandApp::new(name, prefix.clone(), Arc::clone(&finder))) as Arc<dyn App>
        })
    }

    pub fn expect_defaults(mut self, names: &[&str]) -> Self {
        self.expected_defaults = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<AppRegistry, BuildError> {
        if let Some(expected) = &self.expected_defaults {
            let missing: Vec<String> = expected
                .iter()
                .filter(|name| !self.defaults.contains(name))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingDefaults(missing));
            }
        }
        Ok(AppRegistry {
            apps: self.apps,
            defaults: self.defaults,
            fallback: self.fallback,
            command_prefix: self.command_prefix,
        })
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
