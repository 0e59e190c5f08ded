//! 存储模块
//!
//! 提供翻译缓存以及缓存背后的键值存储后端。

pub mod cache;
pub mod store;

pub use cache::{CacheStats, TranslationCache};
pub use store::{KeyValueStore, MemoryStore, RedbStore};
