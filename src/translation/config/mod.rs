//! 翻译配置管理模块
//!
//! 提供配置常量、配置结构体以及从文件/环境变量加载配置的管理器

pub mod manager;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

pub use manager::ConfigManager;

/// 翻译配置常量
pub mod constants {
    /// 每个批次最多携带的文本条数
    pub const DEFAULT_BATCH_SIZE: usize = 50;
    pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_WATCH_INTERVAL_MS: u64 = 250;
    pub const DEFAULT_API_URL: &str = "http://localhost:8000/core/api/translate/";

    /// 持久化缓存记录所在的固定键
    pub const CACHE_RECORD_KEY: &str = "translation_cache";
    pub const DEFAULT_CACHE_PATH: &str = "~/.cache/autotranslate/cache.redb";

    /// 会被翻译的元素属性
    pub const TRANSLATABLE_ATTRS: &[&str] = &["title", "alt", "placeholder", "aria-label"];

    /// 整棵子树都不参与翻译的元素
    pub const SKIP_ELEMENTS: &[&str] = &["script", "style", "code", "pre", "noscript", "template"];

    /// 带有此 class 的元素整棵子树都不翻译
    pub const NO_TRANSLATE_CLASS: &str = "no-translate";

    pub const CONFIG_PATHS: &[&str] = &[
        "autotranslate.toml",
        ".autotranslate.toml",
        "~/.config/autotranslate/config.toml",
        "/etc/autotranslate/config.toml",
    ];

    pub const ENV_PREFIX: &str = "AUTOTRANSLATE";
}

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// 翻译服务地址，接受 `{"texts": [...]}` 的 POST 请求
    pub api_url: String,
    pub batch_size: usize,
    /// 变更通知的防抖延迟（毫秒）
    pub debounce_ms: u64,
    pub request_timeout_secs: u64,
    /// 监听文件变化时的轮询间隔（毫秒）
    pub watch_interval_ms: u64,
    /// 持久化缓存的 redb 文件路径，未设置时仅使用内存存储
    pub cache_path: Option<String>,
    pub cache_key: String,
    /// 覆盖默认的源语言关键词表
    pub keywords: Option<Vec<String>>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            batch_size: constants::DEFAULT_BATCH_SIZE,
            debounce_ms: constants::DEFAULT_DEBOUNCE_MS,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            watch_interval_ms: constants::DEFAULT_WATCH_INTERVAL_MS,
            cache_path: None,
            cache_key: constants::CACHE_RECORD_KEY.to_string(),
            keywords: None,
        }
    }
}

impl TranslatorConfig {
    /// 创建指定翻译服务地址的默认配置
    pub fn with_api_url(api_url: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            ..Self::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.batch_size == 0 {
            return Err(TranslationError::ConfigError("批次大小不能为0".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(TranslationError::ConfigError("请求超时必须大于0".to_string()));
        }

        if self.watch_interval_ms == 0 {
            return Err(TranslationError::ConfigError("轮询间隔必须大于0".to_string()));
        }

        if self.cache_key.trim().is_empty() {
            return Err(TranslationError::ConfigError("缓存键不能为空".to_string()));
        }

        let url = url::Url::parse(&self.api_url).map_err(|e| {
            TranslationError::ConfigError(format!("翻译服务地址无效 {}: {}", self.api_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TranslationError::ConfigError(format!(
                "翻译服务地址必须使用 http 或 https: {}",
                self.api_url
            )));
        }

        if let Some(keywords) = &self.keywords {
            if keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(TranslationError::ConfigError("关键词表不能为空".to_string()));
            }
        }

        Ok(())
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms)
    }

    /// 展开 `~` 后的缓存文件路径
    pub fn resolved_cache_path(&self) -> Option<PathBuf> {
        self.cache_path
            .as_deref()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
    }
}
