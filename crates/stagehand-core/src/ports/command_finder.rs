//! CommandFinder port - 外部にインストールされた app 実行ファイルの探索

use std::path::PathBuf;

/// Finds executables that implement external apps.
///
/// External apps follow a naming convention: `<prefix><app name>`.
pub trait CommandFinder: Send + Sync {
    /// Names of every executable starting with `prefix`, with the prefix
    /// stripped. Used for listing only, never for resolution.
    fn find_commands_with_prefix(&self, prefix: &str) -> Vec<String>;

    /// Full path of the executable called `command`, if one is installed.
    fn locate(&self, command: &str) -> Option<PathBuf>;
}
