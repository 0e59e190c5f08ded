//! 键值存储后端
//!
//! 翻译缓存只需要按字符串键读写单条记录，这里提供内存实现与基于 redb 的磁盘实现。

use std::path::Path;

use dashmap::DashMap;
use redb::{Database, TableDefinition, TableError};

use crate::translation::error::{TranslationError, TranslationResult};

const RECORDS: TableDefinition<&str, &str> = TableDefinition::new("records");

/// 持久化键值存储
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> TranslationResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> TranslationResult<()>;

    /// 删除记录，记录不存在时不报错
    fn remove(&self, key: &str) -> TranslationResult<()>;
}

/// 进程内存储，生命周期与进程相同
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        Ok(self.records.get(key).map(|value| value.clone()))
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> TranslationResult<()> {
        self.records.remove(key);
        Ok(())
    }
}

/// 基于 redb 的磁盘存储
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// 打开（或创建）数据库文件，父目录不存在时自动创建
    pub fn open(path: &Path) -> TranslationResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(path)
            .map_err(|e| TranslationError::from(e).with_context(path.display()))?;
        tracing::debug!("已打开缓存数据库: {}", path.display());

        Ok(Self { db })
    }
}

impl KeyValueStore for RedbStore {
    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = match read_txn.open_table(RECORDS) {
            Ok(table) => table,
            // 首次写入前表还不存在
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = table.get(key)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(RECORDS)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> TranslationResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(RECORDS)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_operations() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));

        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_redb_open_error_names_the_path() {
        let dir = tempfile::tempdir().unwrap();

        // 目录本身不能作为数据库文件
        let err = match RedbStore::open(dir.path()) {
            Ok(_) => panic!("目录不应被当作数据库打开"),
            Err(e) => e,
        };
        assert_eq!(err.category(), crate::translation::error::ErrorCategory::Storage);
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[test]
    fn test_redb_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.redb");

        {
            let store = RedbStore::open(&path).unwrap();
            assert_eq!(store.get("translation_cache").unwrap(), None);
            store.set("translation_cache", "{\"a\":\"b\"}").unwrap();
        }

        let store = RedbStore::open(&path).unwrap();
        assert_eq!(
            store.get("translation_cache").unwrap(),
            Some("{\"a\":\"b\"}".to_string())
        );

        store.remove("translation_cache").unwrap();
        assert_eq!(store.get("translation_cache").unwrap(), None);
    }
}
