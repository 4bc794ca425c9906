//! EngineConfig - TOML から読み込むエンジン設定
//!
//! ```toml
//! command_prefix = "stagehand-app-"
//! search_path = ["/opt/lab/apps", "/usr/local/bin"]
//! hook_timeout_ms = 30000
//! dry_run = false
//! default_apps = ["ntp", "serial"]
//! ```
//!
//! すべてのキーは省略可能（未知のキーはエラー）

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{AppError, InvocationOptions, options};
use crate::engine::{DEFAULT_COMMAND_PREFIX, RegistryBuilder};
use crate::impls::{ExternalCommandApp, PathCommandFinder};
use crate::ports::{App, CommandFinder};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Prepended to an app name to get its external command.
    pub command_prefix: String,
    /// Directories searched for external commands. `PATH` when unset.
    pub search_path: Option<Vec<PathBuf>>,
    pub hook_timeout_ms: Option<u64>,
    pub dry_run: bool,
    /// External commands applied as default apps, in this order.
    pub default_apps: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("command_prefix must not be empty")]
    EmptyPrefix,

    #[error("initializing default app {app}: {source}")]
    DefaultApp {
        app: String,
        #[source]
        source: AppError,
    },
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            search_path: None,
            hook_timeout_ms: None,
            dry_run: false,
            default_apps: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(input)?;
        // an empty prefix would turn every executable on the path into an app
        if config.command_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn hook_timeout(&self) -> Option<Duration> {
        self.hook_timeout_ms.map(Duration::from_millis)
    }

    pub fn command_finder(&self) -> PathCommandFinder {
        match &self.search_path {
            Some(dirs) => PathCommandFinder::new(dirs.clone()),
            None => PathCommandFinder::from_env(),
        }
    }

    /// Registry builder with `default_apps` registered as external command
    /// defaults and every other name falling back to an external command.
    ///
    /// Default apps are never initialized by the orchestrator, so they get
    /// their name and the configured dry-run flag here.
    pub fn registry_builder(&self, finder: Arc<dyn CommandFinder>) -> Result<RegistryBuilder, ConfigError> {
        let mut builder = RegistryBuilder::new();
        for name in &self.default_apps {
            let app = ExternalCommandApp::new(name.as_str(), self.command_prefix.as_str(), Arc::clone(&finder));
            app.init(&InvocationOptions::new([
                options::name(name.as_str()),
                options::dry_run(self.dry_run),
            ]))
            .map_err(|source| ConfigError::DefaultApp {
                app: name.clone(),
                source,
            })?;
            builder = builder.register_default(Arc::new(app));
        }
        let expected: Vec<&str> = self.default_apps.iter().map(String::as_str).collect();
        Ok(builder
            .with_external_commands(finder, self.command_prefix.as_str())
            .expect_defaults(&expected))
    }
}
