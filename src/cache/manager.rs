use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::models::{LovItem, UserRecap};

/// Consider cache stale after 15 minutes.
/// Transactions are entered throughout the day, so the dashboard refreshes
/// more aggressively than a slowly-changing roster would.
const CACHE_STALE_MINUTES: i64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// Ages of the cached datasets, for the status bar.
#[derive(Debug, Clone, Default)]
pub struct CacheAges {
    pub users: Option<i64>,
    pub lov_items: Option<i64>,
}

impl CacheAges {
    /// Display string for the most recently updated dataset.
    pub fn last_updated(&self) -> String {
        let newest = [self.users, self.lov_items].into_iter().flatten().min();
        match newest {
            Some(minutes) if minutes < 1 => "just now".to_string(),
            Some(minutes) if minutes < 60 => format!("{}m ago", minutes),
            Some(minutes) if minutes < 1440 => format!("{}h ago", minutes / 60),
            Some(minutes) => format!("{}d ago", minutes / 1440),
            None => "never".to_string(),
        }
    }
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self { cache_dir })
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<CachedData<T>>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let cached: CachedData<T> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(cached))
    }

    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let cached = CachedData::new(data);
        let path = self.cache_path(name);
        let contents = serde_json::to_string_pretty(&cached)?;
        std::fs::write(&path, contents)?;
        Ok(())
    }

    // ===== Users =====

    pub fn load_users(&self) -> Result<Option<CachedData<Vec<UserRecap>>>> {
        self.load("users")
    }

    pub fn save_users(&self, users: &[UserRecap]) -> Result<()> {
        self.save("users", &users)
    }

    // ===== Catalog items =====

    pub fn load_lov_items(&self) -> Result<Option<CachedData<Vec<LovItem>>>> {
        self.load("lov_items")
    }

    pub fn save_lov_items(&self, items: &[LovItem]) -> Result<()> {
        self.save("lov_items", &items)
    }

    // ===== Ages / staleness =====

    pub fn get_cache_ages(&self) -> CacheAges {
        CacheAges {
            users: self
                .load_users()
                .ok()
                .flatten()
                .map(|c| c.age_minutes()),
            lov_items: self
                .load_lov_items()
                .ok()
                .flatten()
                .map(|c| c.age_minutes()),
        }
    }

    pub fn any_stale(&self) -> bool {
        let users_stale = self
            .load_users()
            .ok()
            .flatten()
            .map(|c| c.is_stale())
            .unwrap_or(true);
        let items_stale = self
            .load_lov_items()
            .ok()
            .flatten()
            .map(|c| c.is_stale())
            .unwrap_or(true);
        users_stale || items_stale
    }

    /// Drop all cached data (on logout, so the next admin starts clean).
    pub fn clear(&self) -> Result<()> {
        for name in ["users", "lov_items"] {
            let path = self.cache_path(name);
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();

        assert!(cache.load_users().unwrap().is_none());

        let users = vec![UserRecap {
            id: 1,
            name: "Budi".to_string(),
            email: "budi@example.com".to_string(),
            items: vec![],
            incomes: vec![],
            expenses: vec![],
        }];
        cache.save_users(&users).unwrap();

        let cached = cache.load_users().unwrap().unwrap();
        assert_eq!(cached.data.len(), 1);
        assert!(!cached.is_stale());
        assert_eq!(cached.age_display(), "just now");

        cache.clear().unwrap();
        assert!(cache.load_users().unwrap().is_none());
    }
}
