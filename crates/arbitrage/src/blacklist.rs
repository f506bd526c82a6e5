//! Process-wide asset blacklist: additive in memory, mirrored to disk
//! synchronously on each insertion, reloaded once per orchestrator cycle
//! (spec §3 "Blacklist", §9 "Blacklist lifecycle").

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Line-delimited uppercase symbols. Reads happen at ChainExecutor INIT
/// (after a cycle-boundary reload); writes happen only from OrderPlacer, so
/// a single `RwLock` is enough — spec §5 notes readers and the writer never
/// race within a cycle.
pub struct Blacklist {
    path: PathBuf,
    symbols: RwLock<HashSet<String>>,
}

impl Blacklist {
    /// Loads the blacklist from `path`, creating an empty one if the file
    /// doesn't exist yet.
    ///
    /// # Errors
    /// Returns an I/O error if the file exists but cannot be read.
    pub fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let symbols = match fs::read_to_string(&path) {
            Ok(contents) => contents.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            symbols: RwLock::new(symbols),
        })
    }

    /// Reloads from disk, replacing the in-memory set. Called once per
    /// orchestrator cycle so externally-edited blacklists take effect.
    ///
    /// # Errors
    /// Returns an I/O error if the file exists but cannot be read.
    pub fn reload(&self) -> io::Result<()> {
        let reloaded = Self::load(&self.path)?;
        let mut guard = self.symbols.write().unwrap();
        *guard = reloaded.symbols.into_inner().unwrap();
        Ok(())
    }

    /// True if `symbol` is currently blacklisted.
    #[must_use]
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.read().unwrap().contains(symbol)
    }

    /// Inserts `symbol`, appending it to the backing file if it's new.
    /// Idempotent: a symbol already present is a no-op, never duplicated on
    /// disk.
    ///
    /// # Errors
    /// Returns an I/O error if the append write fails.
    pub fn insert(&self, symbol: &str) -> io::Result<()> {
        let mut guard = self.symbols.write().unwrap();
        if guard.contains(symbol) {
            return Ok(());
        }
        guard.insert(symbol.to_string());
        drop(guard);

        use std::io::Write;
        let mut file = fs::OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{symbol}")
    }

    /// All currently blacklisted symbols, for `Chain::touches_any` checks.
    #[must_use]
    pub fn snapshot(&self) -> HashSet<String> {
        self.symbols.read().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_empty_when_file_missing() {
        let dir = tempdir().unwrap();
        let blacklist = Blacklist::load(dir.path().join("blacklist.lst")).unwrap();
        assert!(blacklist.snapshot().is_empty());
    }

    #[test]
    fn insert_is_idempotent_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blacklist.lst");
        let blacklist = Blacklist::load(&path).unwrap();

        blacklist.insert("GATEWAY.FOO").unwrap();
        blacklist.insert("GATEWAY.FOO").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().filter(|l| *l == "GATEWAY.FOO").count(), 1);
        assert!(blacklist.contains("GATEWAY.FOO"));
    }

    #[test]
    fn reload_picks_up_external_edits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blacklist.lst");
        let blacklist = Blacklist::load(&path).unwrap();
        assert!(!blacklist.contains("CNY"));

        fs::write(&path, "CNY\n").unwrap();
        blacklist.reload().unwrap();
        assert!(blacklist.contains("CNY"));
    }
}
