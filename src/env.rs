use crate::history::History;
use std::env as stdenv;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Per-session state shared between the dispatcher and its commands.
///
/// The environment contains:
/// - `search_paths`: the directories executables are resolved against, split
///   from `PATH` once at startup and never mutated afterwards.
/// - `history`: the bounded ledger of past input lines.
/// - `should_exit`: a flag the interactive loop checks to know when to
///   terminate; set by the `exit` built-in and on end-of-input.
///
/// Note: fields are public for simplicity to keep the crate small.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Resolution directories in precedence order (first match wins).
    pub search_paths: Vec<PathBuf>,
    /// The command history ledger.
    pub history: History,
    /// When set to true, indicates that the interactive loop should exit.
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current process state into a new `Environment`.
    ///
    /// Splits `PATH` into `search_paths`; an absent or empty `PATH` yields an
    /// empty list, meaning bare-name lookups find nothing while
    /// path-qualified lookups still work. The history starts empty.
    pub fn new() -> Self {
        Self {
            search_paths: search_paths_from(stdenv::var_os("PATH").as_deref()),
            history: History::new(),
            should_exit: false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn search_paths_from(path: Option<&OsStr>) -> Vec<PathBuf> {
    match path {
        Some(value) => stdenv::split_paths(value)
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_path_in_declared_order() {
        let paths = search_paths_from(Some(OsStr::new("/usr/local/bin:/usr/bin:/bin")));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/usr/local/bin"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin"),
            ]
        );
    }

    #[test]
    fn absent_path_is_empty() {
        assert!(search_paths_from(None).is_empty());
    }

    #[test]
    fn empty_components_are_dropped() {
        let paths = search_paths_from(Some(OsStr::new(":/bin:")));
        assert_eq!(paths, vec![PathBuf::from("/bin")]);
    }

    #[test]
    fn new_reads_process_path() {
        // PATH is set in any sane test environment.
        let env = Environment::new();
        assert!(!env.search_paths.is_empty());
        assert!(env.history.is_empty());
        assert!(!env.should_exit);
    }
}
