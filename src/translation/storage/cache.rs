//! 翻译缓存模块
//!
//! 以原文（去除首尾空白、保留大小写）为键缓存译文。所有条目常驻内存，
//! 通过 [`KeyValueStore`] 以单条 JSON 记录的形式整体持久化；条目不会过期，
//! 只能通过 [`TranslationCache::clear`] 显式清除。

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::store::{KeyValueStore, MemoryStore};
use crate::translation::config::constants;
use crate::translation::error::TranslationResult;

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl CacheStats {
    /// 计算缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

/// 翻译缓存
///
/// 内存中的映射由所有翻译路径按引用共享，`save()` 总是写出当前完整快照。
pub struct TranslationCache {
    entries: DashMap<String, String>,
    store: Arc<dyn KeyValueStore>,
    record_key: String,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TranslationCache {
    /// 创建空缓存，不读取持久化记录
    pub fn new(store: Arc<dyn KeyValueStore>, record_key: &str) -> Self {
        Self {
            entries: DashMap::new(),
            store,
            record_key: record_key.to_string(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 创建缓存并立即加载持久化记录
    pub fn open(store: Arc<dyn KeyValueStore>, record_key: &str) -> Self {
        let cache = Self::new(store, record_key);
        cache.load();
        cache
    }

    /// 仅存在于内存中的缓存
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), constants::CACHE_RECORD_KEY)
    }

    pub fn get(&self, text: &str) -> Option<String> {
        match self.entries.get(text) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// 写入条目，覆盖同一原文的旧译文
    pub fn set(&self, text: &str, translation: &str) {
        self.entries
            .insert(text.to_string(), translation.to_string());
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(text)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按原文排序的全部条目
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// 从存储中加载缓存
    ///
    /// 记录缺失或损坏时以空缓存继续，不会向调用方报错。
    pub fn load(&self) {
        self.entries.clear();

        match self.read_record() {
            Ok(Some(records)) => {
                for (text, translation) in records {
                    self.entries.insert(text, translation);
                }
                tracing::info!("已加载 {} 条缓存翻译", self.entries.len());
            }
            Ok(None) => tracing::debug!("没有找到持久化的翻译缓存"),
            Err(e) => tracing::warn!("加载翻译缓存失败，使用空缓存: {}", e),
        }
    }

    /// 将内存中的全部条目写入存储
    ///
    /// 尽力而为：失败只记录警告，存储中保留上一次成功写入的内容。
    pub fn save(&self) {
        if let Err(e) = self.write_record() {
            tracing::warn!("保存翻译缓存失败: {}", e);
        }
    }

    /// 清空内存条目并删除持久化记录
    pub fn clear(&self) {
        self.entries.clear();
        if let Err(e) = self.store.remove(&self.record_key) {
            tracing::warn!("删除持久化翻译缓存失败: {}", e);
        }
        tracing::info!("翻译缓存已清空");
    }

    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            cache_hits: self.hits.load(Ordering::Relaxed),
            cache_misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn read_record(&self) -> TranslationResult<Option<HashMap<String, String>>> {
        let Some(raw) = self.store.get(&self.record_key)? else {
            return Ok(None);
        };
        let records = serde_json::from_str(&raw)?;
        Ok(Some(records))
    }

    fn write_record(&self) -> TranslationResult<()> {
        let raw = serde_json::to_string(&self.snapshot())?;
        self.store.set(&self.record_key, &raw)
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::in_memory()
    }
}
