//! Ports - エンジンと協調相手の境界
//!
//! ここの trait はすべてエンジンの外で実装される（app は app 作者、コマンド探索は
//! ホスト環境、status sink は表示側）。開発用・デフォルト実装は `impls` にある。

pub mod app;
pub mod command_finder;
pub mod status_sink;

pub use self::app::{App, run_stage};
pub use self::command_finder::CommandFinder;
pub use self::status_sink::StatusSink;
