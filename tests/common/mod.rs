// 集成测试公共模块
//
// 提供 HTML 辅助函数和可观测的翻译后端

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use futures::future::{FutureExt, LocalBoxFuture};
use markup5ever_rcdom::RcDom;

use autotranslate::parsers::html::{html_to_dom, serialize_document};
use autotranslate::translation::{
    AutoTranslator, BatchTranslator, DomLocator, KeyValueStore, KeywordClassifier, MemoryStore,
    TranslationBackend, TranslationCache, TranslationCoordinator, TranslationError,
    TranslationResult, TranslatorControl,
};

pub type HtmlTranslator = AutoTranslator<DomLocator<KeywordClassifier>>;

/// 番剧目录页面样例
pub const CATALOGUE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Catalogue</title></head>
<body>
  <h1>Episode 1</h1>
  <p class="status">Currently Airing</p>
  <p>Temporada de inverno</p>
  <script>var season = "the";</script>
  <img alt="Cover of the season" src="cover.png">
</body>
</html>"#;

/// HTML 测试辅助
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    pub fn parse(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8").expect("HTML should parse")
    }

    pub fn render(dom: &RcDom) -> String {
        String::from_utf8(serialize_document(&dom.document).expect("DOM should serialize"))
            .expect("serialized HTML is UTF-8")
    }

    /// 生成包含 `count` 段不同英文文本的页面
    pub fn page_with_paragraphs(count: usize) -> String {
        let body: String = (0..count)
            .map(|i| format!("<p>The episode number {}</p>", i))
            .collect();
        format!("<html><body>{}</body></html>", body)
    }
}

/// 记录每次请求的后端，按 `pt:` 前缀返回译文
#[derive(Default)]
pub struct RecordingBackend {
    pub calls: RefCell<Vec<Vec<String>>>,
    /// 每次请求前让出执行权的次数，用于制造并发窗口
    pub yields: Cell<usize>,
}

impl RecordingBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn slow(yields: usize) -> Rc<Self> {
        let backend = Self::default();
        backend.yields.set(yields);
        Rc::new(backend)
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.calls.borrow().iter().flatten().cloned().collect()
    }
}

impl TranslationBackend for RecordingBackend {
    fn translate_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> LocalBoxFuture<'a, TranslationResult<Vec<String>>> {
        async move {
            self.calls.borrow_mut().push(texts.to_vec());
            for _ in 0..self.yields.get() {
                tokio::task::yield_now().await;
            }
            Ok(texts.iter().map(|t| format!("pt:{}", t)).collect())
        }
        .boxed_local()
    }
}

/// 按映射函数逐条翻译，并记录请求
pub struct MappingBackend {
    map: Box<dyn Fn(&str) -> String>,
    pub calls: RefCell<Vec<Vec<String>>>,
}

impl MappingBackend {
    pub fn new(map: impl Fn(&str) -> String + 'static) -> Rc<Self> {
        Rc::new(Self {
            map: Box::new(map),
            calls: RefCell::new(Vec::new()),
        })
    }
}

impl TranslationBackend for MappingBackend {
    fn translate_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> LocalBoxFuture<'a, TranslationResult<Vec<String>>> {
        self.calls.borrow_mut().push(texts.to_vec());
        let translations = texts.iter().map(|t| (self.map)(t)).collect();
        async move { Ok(translations) }.boxed_local()
    }
}

/// 总是失败的后端
#[derive(Default)]
pub struct FailingBackend {
    pub calls: Cell<usize>,
}

impl TranslationBackend for FailingBackend {
    fn translate_batch<'a>(
        &'a self,
        _texts: &'a [String],
    ) -> LocalBoxFuture<'a, TranslationResult<Vec<String>>> {
        self.calls.set(self.calls.get() + 1);
        async { Err(TranslationError::NetworkError("connection refused".to_string())) }
            .boxed_local()
    }
}

/// 测试环境：内存存储 + 指定后端
pub struct TestEnvironment {
    pub store: Arc<MemoryStore>,
    pub translator: HtmlTranslator,
    pub control: TranslatorControl,
}

impl TestEnvironment {
    pub fn new(backend: Rc<dyn TranslationBackend>, batch_size: usize) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), backend, batch_size)
    }

    pub fn with_store(
        store: Arc<MemoryStore>,
        backend: Rc<dyn TranslationBackend>,
        batch_size: usize,
    ) -> Self {
        let shared: Arc<dyn KeyValueStore> = store.clone();
        let cache = Arc::new(TranslationCache::open(shared, "translation_cache"));
        let coordinator = TranslationCoordinator::new(cache, BatchTranslator::new(backend))
            .with_batch_size(batch_size);
        let translator =
            AutoTranslator::new(DomLocator::new(KeywordClassifier::english()), Rc::new(coordinator));
        let control = translator.control();

        Self {
            store,
            translator,
            control,
        }
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        self.translator.coordinator().cache()
    }

    /// 存储中持久化记录的原始 JSON
    pub fn persisted(&self) -> Option<serde_json::Value> {
        self.store
            .get("translation_cache")
            .expect("memory store never fails")
            .map(|raw| serde_json::from_str(&raw).expect("record is JSON"))
    }
}
