//! Impls - ports の実装
//!
//! # 含まれるもの
//! - **ExternalCommandApp**: `<prefix><name>` を実行するフォールバック app
//! - **PathCommandFinder**: `PATH` 形式の実行ファイル探索
//! - **TracingStatusSink / ConsoleStatusSink / RecordingStatusSink**

pub mod external;
pub mod path_finder;
pub mod status;

pub use self::external::ExternalCommandApp;
pub use self::path_finder::PathCommandFinder;
pub use self::status::{ConsoleStatusSink, RecordingStatusSink, TracingStatusSink};
