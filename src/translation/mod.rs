//! 翻译模块
//!
//! 提供完整的自动翻译功能，采用清晰的模块化架构：
//! - **core**: 翻译器、协调器与对外服务
//! - **pipeline**: 文本处理管道（收集、源语言识别、批次）
//! - **storage**: 缓存和持久化存储
//! - **watch**: 变更监听与防抖
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use autotranslate::parsers::html::{html_to_dom, serialize_document};
//! use autotranslate::translation::{AutoTranslator, TranslatorConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TranslatorConfig::with_api_url("http://localhost:8000/core/api/translate/");
//! let translator = AutoTranslator::from_config(&config)?;
//!
//! let dom = html_to_dom(b"<p>Currently Airing</p>", "utf-8")?;
//! translator.translate_tree(&dom.document).await;
//! let html = serialize_document(&dom.document)?;
//! # let _ = html;
//! # Ok(())
//! # }
//! ```

/// 配置管理模块
pub mod config;

/// 核心翻译模块
pub mod core;

/// 错误处理模块
pub mod error;

/// 文本处理管道模块
pub mod pipeline;

/// 存储管理模块
pub mod storage;

/// 变更监听模块
pub mod watch;

pub use config::{constants, ConfigManager, TranslatorConfig};
pub use core::{
    AttributeReport, AutoTranslator, BatchTranslator, HttpTranslationBackend, PassOutcome,
    PassReport, TranslationBackend, TranslationCoordinator, TranslatorControl, TreeReport,
};
pub use error::{ErrorCategory, TranslationError, TranslationResult};
pub use pipeline::{
    Batch, BatchQueue, Classifier, DomLocator, KeywordClassifier, TextLocator, TranslatableUnit,
    WriteTarget,
};
pub use storage::{CacheStats, KeyValueStore, MemoryStore, RedbStore, TranslationCache};
pub use watch::{ChangeSignal, FileWatcher, MutationDebouncer, SignalHub};
