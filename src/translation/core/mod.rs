//! 翻译系统核心模块
//!
//! - `translator`: 与翻译服务通信，失败时回退为原文
//! - `coordinator`: 单轮翻译的互斥、缓存划分、批次串行与回写
//! - `service`: 组装定位器与协调器，对外提供 [`AutoTranslator`]
//!
//! ```text
//! AutoTranslator (service.rs)
//!     ├── TextLocator (pipeline/collector.rs)
//!     └── TranslationCoordinator (coordinator.rs)
//!             ├── TranslationCache (storage/cache.rs)
//!             ├── BatchQueue (pipeline/batch.rs)
//!             └── BatchTranslator (translator.rs)
//!                     └── TranslationBackend
//! ```

pub mod coordinator;
pub mod service;
pub mod translator;

pub use coordinator::{
    AttributeReport, CoordinatorStats, CoordinatorStatsSnapshot, PassOutcome, PassReport,
    TranslationCoordinator,
};
pub use service::{AutoTranslator, TranslatorControl, TreeReport};
pub use translator::{
    BatchTranslator, HttpTranslationBackend, TranslateRequest, TranslateResponse,
    TranslationBackend, TranslatorStatsSnapshot,
};
