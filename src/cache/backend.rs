//! Storage Backend Module
//!
//! Durable key/value media the storage cache writes through to. A medium is
//! not owned by any one cache: other consumers may read and write the same
//! keys, so every operation goes straight to the shared state.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{CacheError, Result};

// == Storage Backend Trait ==
/// String-to-string medium with indexed key enumeration.
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Number of keys in the medium.
    fn len(&self) -> usize;

    /// Key at `index` in the medium's enumeration order.
    fn key(&self, index: usize) -> Option<String>;

    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str);

    fn remove_item(&self, key: &str);

    fn clear(&self);

    /// Snapshot of every key currently in the medium.
    fn keys(&self) -> Vec<String> {
        (0..self.len()).filter_map(|index| self.key(index)).collect()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn key(&self, index: usize) -> Option<String> {
        (**self).key(index)
    }

    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        (**self).remove_item(key)
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

// == Memory Storage ==
/// Process-wide medium. Clones are handles onto the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn key(&self, index: usize) -> Option<String> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items.keys().nth(index).cloned()
    }

    fn get_item(&self, key: &str) -> Option<String> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
    }

    fn clear(&self) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.clear();
    }

    fn keys(&self) -> Vec<String> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items.keys().cloned().collect()
    }
}

// == File Storage ==
/// Medium persisted as a single JSON object on disk.
///
/// Holds no copy of the data: every operation re-reads the file, and every
/// mutation writes a complete new document to a temporary file in the same
/// directory and renames it over the old one. Other handles and processes
/// on the same path therefore see each other's writes, and an interrupted
/// write never leaves a truncated document behind.
pub struct FileStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles through this handle
    lock: Mutex<()>,
}

impl FileStorage {
    // == Open ==
    /// Opens the medium at `path`, starting empty if the file does not exist.
    ///
    /// A file that is not a JSON string map is renamed to `<path>.corrupt`
    /// and the medium starts empty.
    ///
    /// # Errors
    /// - `CacheError::Storage` if the file exists but cannot be read
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        match read_items(&path) {
            Ok(items) => {
                debug!(path = %path.display(), keys = items.len(), "opened file storage");
            }
            Err(CacheError::Deserialization(err)) => {
                warn!(path = %path.display(), error = %err, "unreadable file storage, starting empty");
                set_aside(&path);
            }
            Err(err) => return Err(err),
        }

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current contents of the file. Unreadable contents read as empty.
    fn load(&self) -> BTreeMap<String, String> {
        read_items(&self.path).unwrap_or_else(|err| {
            warn!(path = %self.path.display(), error = %err, "failed to read file storage");
            BTreeMap::new()
        })
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> io::Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer(&mut file, items)?;
        file.flush()?;
        file.persist(&self.path)?;
        Ok(())
    }

    fn read<R>(&self, view: impl FnOnce(&BTreeMap<String, String>) -> R) -> R {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        view(&self.load())
    }

    fn mutate(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut items = self.load();
        change(&mut items);

        if let Err(err) = self.persist(&items) {
            warn!(path = %self.path.display(), error = %err, "failed to write file storage");
        }
    }
}

/// Parses the document at `path`. A missing or blank file is an empty map.
fn read_items(path: &Path) -> Result<BTreeMap<String, String>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => return Err(err.into()),
    };

    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&raw)?)
}

/// Moves an unreadable document out of the way, keeping it for inspection.
fn set_aside(path: &Path) {
    let mut aside = path.as_os_str().to_owned();
    aside.push(".corrupt");

    if let Err(err) = fs::rename(path, &aside) {
        warn!(path = %path.display(), error = %err, "failed to set aside unreadable file storage");
    }
}

impl fmt::Debug for FileStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStorage")
            .field("path", &self.path)
            .finish()
    }
}

impl StorageBackend for FileStorage {
    fn len(&self) -> usize {
        self.read(BTreeMap::len)
    }

    fn key(&self, index: usize) -> Option<String> {
        self.read(|items| items.keys().nth(index).cloned())
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.read(|items| items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) {
        self.mutate(|items| {
            items.insert(key.to_string(), value.to_string());
        });
    }

    fn remove_item(&self, key: &str) {
        self.mutate(|items| {
            items.remove(key);
        });
    }

    fn clear(&self) {
        self.mutate(BTreeMap::clear);
    }

    fn keys(&self) -> Vec<String> {
        self.read(|items| items.keys().cloned().collect())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_clones_share_state() {
        let storage = MemoryStorage::new();
        let other = storage.clone();

        storage.set_item("a", "1");
        assert_eq!(other.get_item("a").as_deref(), Some("1"));

        other.remove_item("a");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_memory_storage_key_enumeration() {
        let storage = MemoryStorage::new();
        storage.set_item("b", "2");
        storage.set_item("a", "1");

        assert_eq!(storage.len(), 2);
        assert_eq!(storage.key(0).as_deref(), Some("a"));
        assert_eq!(storage.key(1).as_deref(), Some("b"));
        assert!(storage.key(2).is_none());
        assert_eq!(storage.keys(), vec!["a".to_string(), "b".to_string()]);

        storage.clear();
        assert!(storage.keys().is_empty());
    }

    #[test]
    fn test_file_storage_persists_across_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        {
            let storage = FileStorage::open(&path).unwrap();
            storage.set_item("a", "1");
            storage.set_item("b", "2");
            storage.remove_item("b");
        }

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item("a").as_deref(), Some("1"));
        assert!(reopened.get_item("b").is_none());
        assert_eq!(reopened.len(), 1);
    }

    #[test]
    fn test_file_storage_handles_share_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.json");

        let first = FileStorage::open(&path).unwrap();
        let second = FileStorage::open(&path).unwrap();

        first.set_item("from_first", "1");
        assert_eq!(second.get_item("from_first").as_deref(), Some("1"));

        second.set_item("from_second", "2");
        assert_eq!(first.keys(), vec!["from_first".to_string(), "from_second".to_string()]);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
    }

    #[test]
    fn test_file_storage_recovers_from_truncated_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"greeting":"{\"value\":\"hel"#).unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert!(storage.is_empty());

        let mut aside = path.as_os_str().to_owned();
        aside.push(".corrupt");
        assert!(std::path::Path::new(&aside).exists(), "damaged file kept aside");

        storage.set_item("a", "1");
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get_item("a").as_deref(), Some("1"));
    }

    #[test]
    fn test_file_storage_write_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set_item("a", "1");
        storage.set_item("b", "2");
        storage.clear();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_arc_handle_delegates() {
        let storage: Arc<dyn StorageBackend> = Arc::new(MemoryStorage::new());
        let handle = Arc::clone(&storage);

        handle.set_item("k", "v");
        assert_eq!(storage.get_item("k").as_deref(), Some("v"));
        assert_eq!(storage.keys(), vec!["k".to_string()]);
    }
}
