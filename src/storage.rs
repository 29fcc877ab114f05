#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::models::{Collection, Entry};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("无效的存储键 '{key}'")]
    InvalidKey { key: String },

    #[error("序列化失败: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },

    #[error("读写 '{}' 失败: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// 键值存储端口：每个键对应一个整体替换的值
pub trait KeyValueStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}

/// 文件存储：键 `k` 保存在 `<dir>/k.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, value).map_err(|source| StorageError::Io { path, source })
    }
}

/// 内存存储（测试用）
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    writes: usize,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.slots.insert(key.to_string(), value.to_string());
        store
    }

    /// 写入次数
    pub fn writes(&self) -> usize {
        self.writes
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        validate_key(key)?;
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// 从存储槽加载清单；缺失或损坏时返回空集合
pub fn load_items(backend: &impl KeyValueStore, key: &str) -> Collection {
    let content = match backend.read(key) {
        Ok(Some(content)) => content,
        Ok(None) => {
            tracing::debug!(key, "storage slot is empty, starting with an empty list");
            return Collection::new();
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read storage slot, starting with an empty list");
            return Collection::new();
        }
    };

    match serde_json::from_str::<Vec<Entry>>(&content) {
        Ok(entries) if has_unique_ids(&entries) => {
            tracing::info!(key, count = entries.len(), "loaded shopping list");
            Collection::from_entries(entries)
        }
        Ok(_) => {
            tracing::warn!(key, "storage slot holds duplicate ids, starting with an empty list");
            Collection::new()
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "storage slot is malformed, starting with an empty list");
            Collection::new()
        }
    }
}

fn has_unique_ids(entries: &[Entry]) -> bool {
    let mut ids: Vec<_> = entries.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids.windows(2).all(|w| w[0] != w[1])
}

/// 将整个清单序列化后写入存储槽
pub fn save_items(
    backend: &mut impl KeyValueStore,
    key: &str,
    items: &Collection,
) -> Result<(), StorageError> {
    let content = serde_json::to_string(items.entries())?;
    backend.write(key, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, ItemId};

    const KEY: &str = "shopping-items";

    fn sample() -> Collection {
        Collection::new()
            .with_added(ItemId(10), "Milk", 2, Category::Dairy, false)
            .with_added(ItemId(11), "Bread", 1, Category::Snacks, true)
            .with_favorite_toggled(ItemId(11))
    }

    #[test]
    fn test_round_trip_memory() {
        let mut backend = MemoryStore::new();
        let items = sample();
        save_items(&mut backend, KEY, &items).unwrap();
        assert_eq!(load_items(&backend, KEY), items);
    }

    #[test]
    fn test_round_trip_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileStore::new(dir.path().join("nested"));
        let items = sample();
        save_items(&mut backend, KEY, &items).unwrap();

        assert!(dir.path().join("nested").join("shopping-items.json").exists());
        assert_eq!(load_items(&backend, KEY), items);
    }

    #[test]
    fn test_missing_slot_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileStore::new(dir.path());
        assert_eq!(backend.read(KEY).unwrap(), None);
        assert!(load_items(&backend, KEY).is_empty());
    }

    #[test]
    fn test_malformed_slot_is_empty() {
        for payload in ["not json", "{\"id\":1}", "[{\"id\":1}]", "null", ""] {
            let backend = MemoryStore::with_slot(KEY, payload);
            assert!(load_items(&backend, KEY).is_empty(), "payload {payload:?}");
        }
    }

    #[test]
    fn test_duplicate_ids_are_malformed() {
        let payload = r#"[{"id":1,"name":"a","quantity":1,"category":"Fruits"},
                          {"id":1,"name":"b","quantity":1,"category":"Fruits"}]"#;
        let backend = MemoryStore::with_slot(KEY, payload);
        assert!(load_items(&backend, KEY).is_empty());
    }

    #[test]
    fn test_legacy_payload_loads() {
        let payload = r#"[{"id":1700000000001,"name":"Apples","quantity":"3","category":"Fruits","urgent":true,"purchased":false,"favorite":true}]"#;
        let backend = MemoryStore::with_slot(KEY, payload);
        let items = load_items(&backend, KEY);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert!(items[0].urgent && items[0].favorite);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut backend = MemoryStore::new();
        save_items(&mut backend, KEY, &sample()).unwrap();
        let raw = backend.read(KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value[0],
            serde_json::json!({
                "id": 10,
                "name": "Milk",
                "quantity": 2,
                "category": "Dairy",
                "urgent": false,
                "purchased": false,
                "favorite": false
            })
        );
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = FileStore::new(dir.path());
        for key in ["", "..", "../escape", "a/b", "with space"] {
            assert!(matches!(
                backend.write(key, "[]"),
                Err(StorageError::InvalidKey { .. })
            ));
        }
    }
}
