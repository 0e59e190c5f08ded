//! 翻译管道模块
//!
//! 提供文本处理管道，包括收集、源语言识别和批次划分

pub mod batch;
pub mod collector;
pub mod filters;
pub mod unit;

// 重新导出主要类型
pub use batch::{Batch, BatchQueue};
pub use collector::{AttributeTarget, DomLocator, TextLocator, TextNodeTarget};
pub use filters::{Classifier, KeywordClassifier};
pub use unit::{TranslatableUnit, WriteTarget};
