use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// One cached result together with the hash of the text it was built from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub content_hash: u64,
    /// Seconds since the epoch when the entry was written
    pub stored_at: u64,
    pub data: T,
}

/// Content-addressed cache of per-file results, kept in memory and mirrored
/// as one JSON file per source path on disk.
///
/// An entry is only returned while the source text still hashes to the value
/// it was stored with. Disk problems never fail a lookup; they are logged and
/// the cache behaves as a miss.
pub struct IncrementalCache<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Clone,
{
    memory: DashMap<PathBuf, CacheEntry<T>>,
    cache_dir: PathBuf,
    /// Mixed into file names so a format change never reads stale entries
    version: String,
}

impl<T> IncrementalCache<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Clone,
{
    pub fn new(cache_dir: impl AsRef<Path>, version: &str) -> Self {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        if let Err(err) = fs::create_dir_all(&cache_dir) {
            warn!(dir = %cache_dir.display(), %err, "could not create cache directory");
        }
        Self {
            memory: DashMap::new(),
            cache_dir,
            version: version.to_string(),
        }
    }

    fn hash_content(content: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn entry_path(&self, source: &Path) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        source.hash(&mut hasher);
        self.version.hash(&mut hasher);
        self.cache_dir.join(format!("{:x}.json", hasher.finish()))
    }

    /// Cached data for `source` if it was built from exactly `content`.
    pub fn get(&self, source: &Path, content: &str) -> Option<T> {
        let content_hash = Self::hash_content(content);

        if let Some(entry) = self.memory.get(source) {
            if entry.content_hash == content_hash {
                debug!(path = %source.display(), "memory cache hit");
                return Some(entry.data.clone());
            }
        }

        let raw = fs::read_to_string(self.entry_path(source)).ok()?;
        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(path = %source.display(), %err, "ignoring unreadable cache entry");
                return None;
            }
        };
        if entry.content_hash != content_hash {
            return None;
        }
        debug!(path = %source.display(), "disk cache hit");
        let data = entry.data.clone();
        self.memory.insert(source.to_path_buf(), entry);
        Some(data)
    }

    pub fn set(&self, source: &Path, content: &str, data: T) {
        let entry = CacheEntry {
            content_hash: Self::hash_content(content),
            stored_at: Self::now(),
            data,
        };
        match serde_json::to_string(&entry) {
            Ok(json) => {
                if let Err(err) = fs::write(self.entry_path(source), json) {
                    warn!(path = %source.display(), %err, "could not write cache entry");
                }
            }
            Err(err) => warn!(path = %source.display(), %err, "could not serialize cache entry"),
        }
        self.memory.insert(source.to_path_buf(), entry);
    }

    /// Drop every entry, in memory and on disk.
    pub fn clear(&self) -> std::io::Result<()> {
        self.memory.clear();
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
        }
        fs::create_dir_all(&self.cache_dir)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_entries: self.memory.len(),
            cache_dir: self.cache_dir.display().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStats {
    pub memory_entries: usize,
    pub cache_dir: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::symbols::ModuleSymbolTree;

    #[test]
    fn test_cache_hit_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = IncrementalCache::<ModuleSymbolTree>::new(dir.path(), "1");
        let source = Path::new("pkg/mod.py");
        let content = "import os\n";
        let tree = parse("mod", content);

        assert!(cache.get(source, content).is_none());
        cache.set(source, content, tree.clone());
        assert_eq!(cache.get(source, content), Some(tree));
        assert!(cache.get(source, "import sys\n").is_none());
        assert_eq!(cache.stats().memory_entries, 1);
    }

    #[test]
    fn test_entries_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let source = Path::new("persist.py");
        let content = "X = 1\n";
        let tree = parse("persist", content);
        {
            let cache = IncrementalCache::<ModuleSymbolTree>::new(dir.path(), "1");
            cache.set(source, content, tree.clone());
        }
        let cache = IncrementalCache::<ModuleSymbolTree>::new(dir.path(), "1");
        assert_eq!(cache.get(source, content), Some(tree));

        let other_version = IncrementalCache::<ModuleSymbolTree>::new(dir.path(), "2");
        assert!(other_version.get(source, content).is_none());
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("cache");
        let cache = IncrementalCache::<String>::new(&cache_dir, "1");
        cache.set(Path::new("a.py"), "a", "data".to_string());
        cache.clear().unwrap();
        assert!(cache.get(Path::new("a.py"), "a").is_none());
        assert!(cache_dir.is_dir());
    }
}
