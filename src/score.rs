use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub const TOP_SCORE_KEY: &str = "topScore";

const STORE_DIR: &str = "gridsnake";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid key: {0:?}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IO(#[from] io::Error),
}

/// Durable string storage addressed by fixed keys.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Stores every key as its own file inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    pub fn default_dir() -> Option<PathBuf> {
        let data = dirs::data_dir()?;
        Some(data.join(STORE_DIR))
    }

    fn path_of(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.path_of(key).ok()?;
        fs::read_to_string(path).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_of(key)?;
        fs::create_dir_all(&self.dir)?;
        // write next to the target and rename, a crash never leaves half a value
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn load_top_score<S: KeyValueStore + ?Sized>(store: &S) -> u32 {
    let Some(raw) = store.get(TOP_SCORE_KEY) else {
        return 0;
    };
    match raw.trim().parse::<u32>() {
        Ok(top) => top,
        Err(e) => {
            log::warn!("Ignoring malformed top score {:?}: {}", raw, e);
            0
        }
    }
}

// nothing depends on the write succeeding, failures are only logged
pub fn save_top_score<S: KeyValueStore + ?Sized>(store: &mut S, top: u32) {
    if let Err(e) = store.set(TOP_SCORE_KEY, &top.to_string()) {
        log::error!("Failed to persist top score {}: {}", top, e);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scoreboard {
    current: u32,
    top: u32,
}

impl Scoreboard {
    pub fn new(top: u32) -> Self {
        Scoreboard { current: 0, top }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn top(&self) -> u32 {
        self.top
    }

    pub fn record_point(&mut self) {
        self.current += 1;
    }

    /// Returns true when the finished game set a new top score.
    pub fn finish(&mut self) -> bool {
        if self.current > self.top {
            self.top = self.current;
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.current = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "gridsnake-test-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_top_score_defaults_to_zero() {
        let store = MemoryStore::default();
        assert_eq!(load_top_score(&store), 0);
    }

    #[test]
    fn malformed_top_score_defaults_to_zero() {
        let mut store = MemoryStore::default();
        store.set(TOP_SCORE_KEY, "lots").unwrap();
        assert_eq!(load_top_score(&store), 0);
        store.set(TOP_SCORE_KEY, "-4").unwrap();
        assert_eq!(load_top_score(&store), 0);
        store.set(TOP_SCORE_KEY, " 12\n").unwrap();
        assert_eq!(load_top_score(&store), 12);
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = temp_dir("roundtrip");
        let mut store = FileStore::new(&dir);
        assert_eq!(load_top_score(&store), 0);
        save_top_score(&mut store, 17);

        let reopened = FileStore::new(&dir);
        assert_eq!(load_top_score(&reopened), 17);
        assert!(!dir.join("topScore.tmp").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let mut store = FileStore::new(temp_dir("keys"));
        assert!(matches!(
            store.set("../escape", "1"),
            Err(StoreError::InvalidKey(_))
        ));
        assert_eq!(store.get("../escape"), None);
    }

    #[test]
    fn top_only_moves_on_strictly_greater_score() {
        let mut board = Scoreboard::new(3);
        for _ in 0..3 {
            board.record_point();
        }
        assert!(!board.finish());
        assert_eq!(board.top(), 3);

        board.reset();
        board.record_point();
        assert!(!board.finish());
        assert_eq!(board.top(), 3);

        board.reset();
        for _ in 0..5 {
            board.record_point();
        }
        assert!(board.finish());
        assert_eq!(board.top(), 5);
        assert_eq!(board.current(), 5);

        board.reset();
        assert_eq!(board.current(), 0);
        assert_eq!(board.top(), 5);
    }
}
