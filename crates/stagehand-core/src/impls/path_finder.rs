//! PathCommandFinder - ディレクトリのリストから app の実行ファイルを探す

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::ports::CommandFinder;

/// Searches `dirs` in order, like a shell searching `PATH`.
#[derive(Debug, Clone, Default)]
pub struct PathCommandFinder {
    dirs: Vec<PathBuf>,
}

impl PathCommandFinder {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Use the directories in the `PATH` environment variable.
    pub fn from_env() -> Self {
        let dirs = std::env::var_os("PATH")
            .map(|path| std::env::split_paths(&path).collect())
            .unwrap_or_default();
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl CommandFinder for PathCommandFinder {
    fn find_commands_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut found = BTreeSet::new();
        for dir in &self.dirs {
            // missing or unreadable PATH entries are skipped, as a shell would
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let file_name = entry.file_name();
                let Some(file_name) = file_name.to_str() else {
                    continue;
                };
                let Some(app) = file_name.strip_prefix(prefix) else {
                    continue;
                };
                if !app.is_empty() && is_executable(&entry.path()) {
                    found.insert(app.to_string());
                }
            }
        }
        found.into_iter().collect()
    }

    fn locate(&self, command: &str) -> Option<PathBuf> {
        // コマンド名は単一のファイル名のみ（"sub/tool" や ".." で検索ディレクトリ外に出さない）
        if !is_plain_file_name(command) {
            return None;
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(command))
            .find(|candidate| is_executable(candidate))
    }
}

fn is_plain_file_name(command: &str) -> bool {
    let mut components = Path::new(command).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == command
    )
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
