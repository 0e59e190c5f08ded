//! 批量翻译
//!
//! [`BatchTranslator`] 对上层保证：返回的译文与输入等长且顺序一致。
//! 任何失败（网络错误、非 2xx 状态、无法解码、数量不符）都会被记录为警告，
//! 然后原样返回输入文本。

use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::translation::config::TranslatorConfig;
use crate::translation::error::{TranslationError, TranslationResult};

/// 翻译服务请求体
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    pub texts: &'a [String],
}

/// 翻译服务响应体
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    pub translations: Vec<String>,
}

/// 翻译后端：一次调用对应一次网络请求
pub trait TranslationBackend {
    fn translate_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> LocalBoxFuture<'a, TranslationResult<Vec<String>>>;
}

/// 基于 HTTP JSON 接口的翻译后端
pub struct HttpTranslationBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranslationBackend {
    pub fn new(endpoint: &str, timeout: Duration) -> TranslationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TranslationError::ConfigError(format!("无法创建HTTP客户端: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn from_config(config: &TranslatorConfig) -> TranslationResult<Self> {
        Self::new(&config.api_url, config.request_timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, texts: &[String]) -> TranslationResult<Vec<String>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TranslateRequest { texts })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::HttpStatus(status.as_u16()));
        }

        let body: TranslateResponse = response.json().await?;
        Ok(body.translations)
    }
}

impl TranslationBackend for HttpTranslationBackend {
    fn translate_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> LocalBoxFuture<'a, TranslationResult<Vec<String>>> {
        self.post(texts).boxed_local()
    }
}

/// 翻译器统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslatorStatsSnapshot {
    pub requests: usize,
    pub texts_sent: usize,
    pub fallbacks: usize,
}

#[derive(Debug, Default)]
struct TranslatorStats {
    requests: AtomicUsize,
    texts_sent: AtomicUsize,
    fallbacks: AtomicUsize,
}

/// 带原文回退的批量翻译器
pub struct BatchTranslator {
    backend: Rc<dyn TranslationBackend>,
    stats: TranslatorStats,
}

impl BatchTranslator {
    pub fn new(backend: Rc<dyn TranslationBackend>) -> Self {
        Self {
            backend,
            stats: TranslatorStats::default(),
        }
    }

    /// 翻译一组文本，结果与输入按位置对齐
    ///
    /// 失败时返回原文，调用方无法区分“翻译失败”与“译文恰好等于原文”。
    pub async fn translate(&self, texts: &[String]) -> Vec<String> {
        if texts.is_empty() {
            return Vec::new();
        }

        self.stats.requests.fetch_add(1, Ordering::Relaxed);
        self.stats
            .texts_sent
            .fetch_add(texts.len(), Ordering::Relaxed);

        let result = self
            .backend
            .translate_batch(texts)
            .await
            .and_then(|translations| {
                if translations.len() == texts.len() {
                    Ok(translations)
                } else {
                    Err(TranslationError::ResponseMismatch {
                        expected: texts.len(),
                        actual: translations.len(),
                    })
                }
            });

        match result {
            Ok(translations) => translations,
            Err(e) => {
                self.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    "翻译失败（{:?}，可重试: {}），保留 {} 条原文: {}",
                    e.category(),
                    e.is_retryable(),
                    texts.len(),
                    e
                );
                texts.to_vec()
            }
        }
    }

    pub fn stats(&self) -> TranslatorStatsSnapshot {
        TranslatorStatsSnapshot {
            requests: self.stats.requests.load(Ordering::Relaxed),
            texts_sent: self.stats.texts_sent.load(Ordering::Relaxed),
            fallbacks: self.stats.fallbacks.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Scripted {
        result: Box<dyn Fn(&[String]) -> TranslationResult<Vec<String>>>,
        calls: Cell<usize>,
    }

    impl TranslationBackend for Scripted {
        fn translate_batch<'a>(
            &'a self,
            texts: &'a [String],
        ) -> LocalBoxFuture<'a, TranslationResult<Vec<String>>> {
            self.calls.set(self.calls.get() + 1);
            let result = (self.result)(texts);
            async move { result }.boxed_local()
        }
    }

    fn translator(
        result: impl Fn(&[String]) -> TranslationResult<Vec<String>> + 'static,
    ) -> (BatchTranslator, Rc<Scripted>) {
        let backend = Rc::new(Scripted {
            result: Box::new(result),
            calls: Cell::new(0),
        });
        (BatchTranslator::new(backend.clone()), backend)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_successful_translation_is_returned() {
        let (translator, backend) =
            translator(|texts| Ok(texts.iter().map(|t| format!("pt:{}", t)).collect()));

        let out = translator.translate(&strings(&["Season", "Score"])).await;
        assert_eq!(out, strings(&["pt:Season", "pt:Score"]));
        assert_eq!(backend.calls.get(), 1);
        assert_eq!(translator.stats().fallbacks, 0);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_originals() {
        let (translator, _) = translator(|_| Err(TranslationError::HttpStatus(502)));

        let input = strings(&["Season", "Score"]);
        assert_eq!(translator.translate(&input).await, input);
        assert_eq!(translator.stats().fallbacks, 1);
    }

    #[tokio::test]
    async fn test_length_mismatch_falls_back_to_originals() {
        let (translator, _) = translator(|_| Ok(strings(&["só um"])));

        let input = strings(&["Season", "Score"]);
        assert_eq!(translator.translate(&input).await, input);
    }

    #[tokio::test]
    async fn test_empty_input_skips_network() {
        let (translator, backend) = translator(|_| Ok(Vec::new()));

        assert!(translator.translate(&[]).await.is_empty());
        assert_eq!(backend.calls.get(), 0);
        assert_eq!(translator.stats().requests, 0);
    }
}
