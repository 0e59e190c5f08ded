//! 自动翻译服务
//!
//! [`AutoTranslator`] 把定位器、协调器和缓存组装在一起，是整个系统的主要入口。
//! 通过 [`AutoTranslator::control`] 获得的 [`TranslatorControl`] 可以在运行期间
//! 查询状态或清空缓存，不依赖任何全局单例。
//!
//! ```no_run
//! use autotranslate::parsers::html::html_to_dom;
//! use autotranslate::translation::{AutoTranslator, TranslatorConfig};
//!
//! # async fn demo() -> autotranslate::translation::TranslationResult<()> {
//! let translator = AutoTranslator::from_config(&TranslatorConfig::default())?;
//! let dom = html_to_dom(b"<p>Episode 1</p>", "utf-8")?;
//! translator.translate_tree(&dom.document).await;
//! println!("缓存条目: {}", translator.control().cache_size());
//! # Ok(())
//! # }
//! ```

use std::rc::Rc;
use std::sync::Arc;

use super::coordinator::{AttributeReport, CoordinatorStatsSnapshot, PassOutcome, TranslationCoordinator};
use super::translator::{BatchTranslator, HttpTranslationBackend};
use crate::translation::config::TranslatorConfig;
use crate::translation::error::TranslationResult;
use crate::translation::pipeline::{DomLocator, KeywordClassifier, TextLocator};
use crate::translation::storage::{CacheStats, KeyValueStore, MemoryStore, RedbStore, TranslationCache};

/// 一次完整扫描的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeReport {
    pub text: PassOutcome,
    pub attributes: AttributeReport,
}

/// 自动翻译器
pub struct AutoTranslator<L: TextLocator> {
    locator: L,
    coordinator: Rc<TranslationCoordinator>,
}

impl<L: TextLocator> AutoTranslator<L> {
    pub fn new(locator: L, coordinator: Rc<TranslationCoordinator>) -> Self {
        Self {
            locator,
            coordinator,
        }
    }

    /// 扫描并翻译整棵文档树
    ///
    /// 正文走批量路径，受互斥状态约束；属性走并发路径，正文被丢弃时仍会执行。
    /// 没有待翻译正文时直接返回，属性也不处理。
    pub async fn translate_tree(&self, root: &L::Root) -> TreeReport {
        let units = self.locator.collect(root);
        if units.is_empty() {
            tracing::info!("没有需要翻译的正文");
            return TreeReport {
                text: PassOutcome::Empty,
                attributes: AttributeReport::default(),
            };
        }

        tracing::info!("开始翻译 {} 条正文", units.len());
        let text = self.coordinator.run(units).await;

        let attributes = self.locator.collect_attributes(root);
        tracing::debug!("收集到 {} 个待翻译属性", attributes.len());
        let attributes = self.coordinator.translate_attributes(attributes).await;

        TreeReport { text, attributes }
    }

    pub fn control(&self) -> TranslatorControl {
        TranslatorControl {
            coordinator: Rc::clone(&self.coordinator),
        }
    }

    pub fn coordinator(&self) -> &Rc<TranslationCoordinator> {
        &self.coordinator
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }
}

impl AutoTranslator<DomLocator<KeywordClassifier>> {
    /// 按配置创建默认的 HTML 翻译器
    ///
    /// 配置了缓存路径时使用 redb 持久化，否则缓存只保存在内存中。
    pub fn from_config(config: &TranslatorConfig) -> TranslationResult<Self> {
        config.validate()?;

        let store: Arc<dyn KeyValueStore> = match config.resolved_cache_path() {
            Some(path) => Arc::new(RedbStore::open(&path)?),
            None => Arc::new(MemoryStore::new()),
        };

        Self::with_store(config, store)
    }

    /// 使用指定的存储创建翻译器
    pub fn with_store(config: &TranslatorConfig, store: Arc<dyn KeyValueStore>) -> TranslationResult<Self> {
        let classifier = match &config.keywords {
            Some(keywords) => KeywordClassifier::with_keywords(keywords.as_slice())?,
            None => KeywordClassifier::english(),
        };

        let cache = Arc::new(TranslationCache::open(store, &config.cache_key));
        let backend = Rc::new(HttpTranslationBackend::from_config(config)?);
        let coordinator = TranslationCoordinator::new(cache, BatchTranslator::new(backend))
            .with_batch_size(config.batch_size);

        tracing::debug!("翻译服务地址: {}，批次大小: {}", config.api_url, config.batch_size);

        Ok(Self::new(DomLocator::new(classifier), Rc::new(coordinator)))
    }
}

/// 运行期控制句柄
#[derive(Clone)]
pub struct TranslatorControl {
    coordinator: Rc<TranslationCoordinator>,
}

impl TranslatorControl {
    /// 清空内存缓存并删除持久化记录
    pub fn clear_cache(&self) {
        self.coordinator.cache().clear();
    }

    pub fn cache_size(&self) -> usize {
        self.coordinator.cache().len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.coordinator.cache().get_stats()
    }

    pub fn is_running(&self) -> bool {
        self.coordinator.is_running()
    }

    pub fn stats(&self) -> CoordinatorStatsSnapshot {
        self.coordinator.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::{html_to_dom, serialize_document};
    use crate::translation::core::translator::TranslationBackend;
    use futures::future::{FutureExt, LocalBoxFuture};

    struct Upper;

    impl TranslationBackend for Upper {
        fn translate_batch<'a>(
            &'a self,
            texts: &'a [String],
        ) -> LocalBoxFuture<'a, TranslationResult<Vec<String>>> {
            async move { Ok(texts.iter().map(|t| t.to_uppercase()).collect()) }.boxed_local()
        }
    }

    fn translator() -> AutoTranslator<DomLocator<KeywordClassifier>> {
        let coordinator = TranslationCoordinator::new(
            Arc::new(TranslationCache::in_memory()),
            BatchTranslator::new(Rc::new(Upper)),
        );
        AutoTranslator::new(DomLocator::new(KeywordClassifier::english()), Rc::new(coordinator))
    }

    #[tokio::test]
    async fn test_translate_tree_rewrites_text_and_attributes() {
        let translator = translator();
        let dom = html_to_dom(
            b"<body><h2 title=\"Open the season\">Winter Season</h2><p>Sinopse</p></body>",
            "utf-8",
        )
        .unwrap();

        let report = translator.translate_tree(&dom.document).await;
        assert_eq!(report.text.report().map(|r| r.translated), Some(1));
        assert_eq!(report.attributes.requested, 1);

        let html = String::from_utf8(serialize_document(&dom.document).unwrap()).unwrap();
        assert!(html.contains("<h2 title=\"OPEN THE SEASON\">WINTER SEASON</h2>"));
        assert!(html.contains("<p>Sinopse</p>"));
    }

    #[tokio::test]
    async fn test_attribute_only_page_is_left_alone() {
        let translator = translator();
        let dom = html_to_dom(b"<body><img alt=\"Cover of the season\"></body>", "utf-8").unwrap();

        let report = translator.translate_tree(&dom.document).await;
        assert_eq!(report.text, PassOutcome::Empty);
        assert_eq!(report.attributes, AttributeReport::default());
        assert_eq!(translator.control().stats().translator.requests, 0);

        let html = String::from_utf8(serialize_document(&dom.document).unwrap()).unwrap();
        assert!(html.contains("alt=\"Cover of the season\""));
    }

    #[tokio::test]
    async fn test_control_reports_and_clears_cache() {
        let translator = translator();
        let control = translator.control();
        let dom = html_to_dom(b"<body><p>The first episode</p></body>", "utf-8").unwrap();

        translator.translate_tree(&dom.document).await;
        assert_eq!(control.cache_size(), 1);
        assert!(!control.is_running());
        assert_eq!(control.stats().passes_completed, 1);

        control.clear_cache();
        assert_eq!(control.cache_size(), 0);
    }
}
