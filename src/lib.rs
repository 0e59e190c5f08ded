//! # Autotranslate Library
//!
//! 自动识别 HTML 文档中的源语言文本，分批发送到翻译服务，缓存结果并回写到文档。
//!
//! ## 模块组织
//!
//! - `parsers` - HTML 解析与序列化
//! - `translation` - 文本收集、批量翻译、缓存与变更防抖

pub mod parsers;
pub mod translation;

pub use translation::{AutoTranslator, TranslationError, TranslationResult, TranslatorConfig};
