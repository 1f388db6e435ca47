//! Key-value persistence of the lineup stores.
//!
//! One JSON document per key, last write wins. The store knows nothing
//! about lineups; `store_codec` decides what goes under each key.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Record keys. Names are shared with previously saved games, so they
/// never change.
pub mod keys {
    pub const TEAM: &str = "team";
    pub const STARTING_BATTING_ORDER: &str = "startingBattingOrder";
    pub const STARTING_ASSIGNMENTS: &str = "startingAssignments";
    pub const BATTING_ORDER: &str = "battingOrder";
    pub const LINEUP_ASSIGNMENTS: &str = "lineupAssignments";
    pub const USED_PLAYER_INFO: &str = "usedPlayerInfo";
    pub const RUNNER_ASSIGNMENTS: &str = "runnerAssignments";
    pub const REPLACED_RUNNERS: &str = "replacedRunners";
    pub const TEMP_RUNNER_BY_ORDER: &str = "tempRunnerByOrder";
    pub const SETTINGS: &str = "settings";
    pub const BASELINE_BATTING_ORDER: &str = "baselineBattingOrder";
    pub const BASELINE_ASSIGNMENTS: &str = "baselineAssignments";
    pub const BASELINE_RUNNERS: &str = "baselineRunners";
    pub const REENTERED_PLAYERS: &str = "reenteredPlayers";
    pub const BENCHED_OUT: &str = "benchedOut";
    /// Sequence number of the last applied operation.
    pub const OPERATION_SEQUENCE: &str = "operationSequence";

    pub const ALL: [&str; 16] = [
        TEAM,
        STARTING_BATTING_ORDER,
        STARTING_ASSIGNMENTS,
        BATTING_ORDER,
        LINEUP_ASSIGNMENTS,
        USED_PLAYER_INFO,
        RUNNER_ASSIGNMENTS,
        REPLACED_RUNNERS,
        TEMP_RUNNER_BY_ORDER,
        SETTINGS,
        BASELINE_BATTING_ORDER,
        BASELINE_ASSIGNMENTS,
        BASELINE_RUNNERS,
        REENTERED_PLAYERS,
        BENCHED_OUT,
        OPERATION_SEQUENCE,
    ];
}

/// String-valued key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: `<dir>/<key>.json`, fsynced on every write.
/// The directory is created on the first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid store key: {:?}", key),
            )
            .into());
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let mut file = File::create(&path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_last_write_wins() {
        let mut store = MemoryStore::new();
        store.set(keys::SETTINGS, "{}").unwrap();
        store.set(keys::SETTINGS, r#"{"history_depth":3}"#).unwrap();
        assert_eq!(
            store.get(keys::SETTINGS).unwrap().as_deref(),
            Some(r#"{"history_depth":3}"#)
        );
        store.remove(keys::SETTINGS).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_creates_directory_on_demand() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(tmp.path().join("game"));
        assert_eq!(store.get(keys::TEAM).unwrap(), None);
        store.set(keys::TEAM, r#"{"name":"x","players":[]}"#).unwrap();
        assert!(tmp.path().join("game").join("team.json").exists());
        assert!(store.get(keys::TEAM).unwrap().is_some());
        store.remove(keys::TEAM).unwrap();
        store.remove(keys::TEAM).unwrap();
        assert_eq!(store.get(keys::TEAM).unwrap(), None);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(tmp.path());
        assert!(store.set("../escape", "{}").is_err());
        assert!(store.get("").is_err());
    }
}
