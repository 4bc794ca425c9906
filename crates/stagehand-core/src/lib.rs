//! stagehand-core
//!
//! experiment のライフサイクルの各 stage で app を適用するコア部品
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（stage, invocation options, experiment, status, errors）
//! - **ports**: 抽象化レイヤー（App, CommandFinder, StatusSink）
//! - **engine**: AppRegistry, Orchestrator, キャンセル
//! - **impls**: 実装（外部コマンド app, PATH 探索, status sink）
//! - **config**: TOML のエンジン設定

pub mod config;
pub mod domain;
pub mod engine;
pub mod impls;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::config::{ConfigError, EngineConfig};
pub use crate::domain::{AppError, ApplyError, Experiment, InvocationOption, Stage};
pub use crate::engine::{AppRegistry, Orchestrator, cancel_pair};
pub use crate::ports::App;
