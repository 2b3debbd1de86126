//! The bounded command history and its on-disk persistence.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// Maximum number of entries the ledger retains.
pub const HISTORY_CAPACITY: usize = 128;

/// Default name of the persistent history file, relative to the working
/// directory.
pub const HISTORY_FILE: &str = ".osshell_history";

/// An ordered, size-bounded log of past input lines, most-recent-first.
///
/// Insertion is always at the logical front; once the ledger is at capacity
/// the oldest entry is evicted from the back. Empty lines are legal entries.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: VecDeque<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `line` at the logical front, evicting from the back while the
    /// ledger exceeds [`HISTORY_CAPACITY`].
    pub fn prepend(&mut self, line: impl Into<String>) {
        self.entries.push_front(line.into());
        while self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_back();
        }
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Write the `count` most recent entries to `out`, one per line, in the
    /// format `"  {rank}: {line}"` with rank 1 being the most recent entry
    /// and ranks increasing as lines get older.
    ///
    /// A `count` beyond the current size is capped at the size; callers that
    /// want to reject an out-of-range count do so before calling (see the
    /// `history` built-in).
    pub fn print_tail(&self, out: &mut dyn Write, count: usize) -> io::Result<()> {
        for (index, line) in self.entries.iter().take(count).enumerate() {
            writeln!(out, "  {}: {}", index + 1, line)?;
        }
        Ok(())
    }

    /// Rebuild a ledger from persisted lines.
    ///
    /// The file stores entries oldest-first, and each line read is fed
    /// through [`History::prepend`] in file order, which leaves the newest
    /// line at the logical front: a save/load round trip preserves recency
    /// ranking. A file longer than the capacity keeps only the newest
    /// entries, via the same eviction as live inserts.
    pub fn load(reader: impl BufRead) -> io::Result<Self> {
        let mut history = Self::new();
        for line in reader.lines() {
            history.prepend(line?);
        }
        Ok(history)
    }

    /// Load the ledger from `path`. A missing file is an empty history, not
    /// an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Self::load(BufReader::new(file))
                .with_context(|| format!("reading history from {}", path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => {
                Err(err).with_context(|| format!("opening history file {}", path.display()))
            }
        }
    }

    /// Write all entries to `out`, oldest to newest, one per line.
    pub fn save(&self, out: &mut dyn Write) -> io::Result<()> {
        for line in self.entries.iter().rev() {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    /// Persist the ledger to `path`, overwriting any prior content.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)
            .with_context(|| format!("creating history file {}", path.display()))?;
        self.save(&mut file)
            .with_context(|| format!("writing history to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn prepend_keeps_most_recent_first() {
        let mut history = History::new();
        history.prepend("first");
        history.prepend("second");
        let entries: Vec<&str> = history.iter().collect();
        assert_eq!(entries, vec!["second", "first"]);
    }

    #[test]
    fn capacity_bound_evicts_oldest() {
        let mut history = History::new();
        for i in 0..200 {
            history.prepend(format!("line{}", i));
        }
        assert_eq!(history.len(), HISTORY_CAPACITY);
        // The newest entry survives at the front, the oldest 72 are gone.
        assert_eq!(history.iter().next(), Some("line199"));
        assert_eq!(history.iter().last(), Some("line72"));
        assert!(!history.iter().any(|l| l == "line71"));
    }

    #[test]
    fn clear_empties_the_ledger() {
        let mut history = History::new();
        history.prepend("a");
        history.prepend("b");
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn print_tail_ranks_most_recent_first() {
        let mut history = History::new();
        history.prepend("oldest");
        history.prepend("middle");
        history.prepend("newest");

        let mut out = Vec::new();
        history.print_tail(&mut out, 2).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  1: newest\n  2: middle\n"
        );
    }

    #[test]
    fn print_tail_caps_at_size() {
        let mut history = History::new();
        history.prepend("only");

        let mut out = Vec::new();
        history.print_tail(&mut out, 10).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "  1: only\n");
    }

    #[test]
    fn save_writes_oldest_first() {
        let mut history = History::new();
        history.prepend("oldest");
        history.prepend("newest");

        let mut out = Vec::new();
        history.save(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "oldest\nnewest\n");
    }

    #[test]
    fn round_trip_preserves_recency_order() {
        let mut history = History::new();
        for line in ["ls", "echo hi", "history"] {
            history.prepend(line);
        }

        let mut saved = Vec::new();
        history.save(&mut saved).unwrap();
        let reloaded = History::load(&saved[..]).unwrap();

        assert_eq!(reloaded.len(), history.len());
        let before: Vec<&str> = history.iter().collect();
        let after: Vec<&str> = reloaded.iter().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn load_from_missing_path_is_empty() {
        let path = std::env::temp_dir().join(format!(
            "osshell_history_tests_{}_missing",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        let history = History::load_from_path(&path).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn round_trip_through_file() {
        let path = std::env::temp_dir().join(format!(
            "osshell_history_tests_{}_file",
            std::process::id()
        ));
        let mut history = History::new();
        history.prepend("first command");
        history.prepend("second command");
        history.save_to_path(&path).unwrap();

        let reloaded = History::load_from_path(&path).unwrap();
        let entries: Vec<&str> = reloaded.iter().collect();
        assert_eq!(entries, vec!["second command", "first command"]);

        let _ = fs::remove_file(&path);
    }
}
