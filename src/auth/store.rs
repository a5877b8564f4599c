// Allow dead code: the in-memory store is a test double
#![allow(dead_code)]

//! Persistent key-value storage for session state.
//!
//! The session is held as three independent string entries (token, email,
//! expiry) rather than one compound record, mirroring the storage shape the
//! backend's web dashboard uses. The store is injected into the session
//! manager so tests can substitute an in-memory implementation.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Storage key for the raw session token.
pub const KEY_TOKEN: &str = "token";

/// Storage key for the administrator's email (display only).
pub const KEY_EMAIL: &str = "email";

/// Storage key for the expiry timestamp, string-encoded epoch milliseconds.
pub const KEY_EXPIRY: &str = "token_expiry";

/// A durable string key-value store for session fields.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// File-backed store: one file per entry under the session directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create session directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session entry {}", key))?;
        Ok(Some(contents))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::write(self.entry_path(key), value)
            .with_context(|| format!("Failed to write session entry {}", key))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.entry_path(key);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove session entry {}", key))?;
        }
        Ok(())
    }
}

/// In-memory store used by tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path().join("session")).unwrap();

        assert!(store.get(KEY_TOKEN).unwrap().is_none());

        store.put(KEY_TOKEN, "abc.def.ghi").unwrap();
        store.put(KEY_EXPIRY, "1750000000000").unwrap();
        assert_eq!(store.get(KEY_TOKEN).unwrap().as_deref(), Some("abc.def.ghi"));
        assert_eq!(
            store.get(KEY_EXPIRY).unwrap().as_deref(),
            Some("1750000000000")
        );

        store.remove(KEY_TOKEN).unwrap();
        assert!(store.get(KEY_TOKEN).unwrap().is_none());
        // Removing a missing entry is not an error
        store.remove(KEY_TOKEN).unwrap();
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session");

        {
            let mut store = FileSessionStore::new(path.clone()).unwrap();
            store.put(KEY_EMAIL, "admin@example.com").unwrap();
        }

        let store = FileSessionStore::new(path).unwrap();
        assert_eq!(
            store.get(KEY_EMAIL).unwrap().as_deref(),
            Some("admin@example.com")
        );
    }
}
