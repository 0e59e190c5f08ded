//! 翻译模块统一错误处理
//!
//! 核心流程本身从不向调用方抛出错误：缓存读写失败降级为空缓存或不持久化，
//! 翻译失败降级为原文直通。这里的错误类型只在各个边界（存储、后端、配置）
//! 内部流转，便于在降级前精确记录日志。

use std::fmt;

use thiserror::Error;

/// 翻译错误类型
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 网络错误
    #[error("网络错误: {0}")]
    NetworkError(String),

    /// 翻译服务返回非成功状态码
    #[error("翻译服务返回状态码 {0}")]
    HttpStatus(u16),

    /// 译文数量与原文数量不一致
    #[error("译文数量不匹配: 期望 {expected}，得到 {actual}")]
    ResponseMismatch { expected: usize, actual: usize },

    /// 存储错误
    #[error("存储错误: {0}")]
    StorageError(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    SerializationError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(String),
}

impl TranslationError {
    /// 检查错误是否可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslationError::NetworkError(_) => true,
            TranslationError::HttpStatus(code) => *code >= 500 || *code == 429,
            TranslationError::StorageError(_) => true,
            TranslationError::IoError(_) => true,
            TranslationError::ResponseMismatch { .. } => false,
            TranslationError::ConfigError(_) => false,
            TranslationError::SerializationError(_) => false,
            TranslationError::ParseError(_) => false,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            TranslationError::ConfigError(_) => ErrorCategory::Configuration,
            TranslationError::NetworkError(_) => ErrorCategory::Network,
            TranslationError::HttpStatus(_) => ErrorCategory::Service,
            TranslationError::ResponseMismatch { .. } => ErrorCategory::Service,
            TranslationError::StorageError(_) => ErrorCategory::Storage,
            TranslationError::SerializationError(_) => ErrorCategory::Serialization,
            TranslationError::ParseError(_) => ErrorCategory::Parsing,
            TranslationError::IoError(_) => ErrorCategory::Storage,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let new_msg = |msg: String| format!("{} (上下文: {})", msg, context);

        match self {
            TranslationError::ConfigError(msg) => TranslationError::ConfigError(new_msg(msg)),
            TranslationError::NetworkError(msg) => TranslationError::NetworkError(new_msg(msg)),
            TranslationError::StorageError(msg) => TranslationError::StorageError(new_msg(msg)),
            TranslationError::SerializationError(msg) => {
                TranslationError::SerializationError(new_msg(msg))
            }
            TranslationError::ParseError(msg) => TranslationError::ParseError(new_msg(msg)),
            TranslationError::IoError(msg) => TranslationError::IoError(new_msg(msg)),
            other => other,
        }
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Service,
    Storage,
    Serialization,
    Parsing,
}

impl From<std::io::Error> for TranslationError {
    fn from(error: std::io::Error) -> Self {
        TranslationError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for TranslationError {
    fn from(error: serde_json::Error) -> Self {
        TranslationError::SerializationError(format!("JSON序列化错误: {}", error))
    }
}

impl From<toml::de::Error> for TranslationError {
    fn from(error: toml::de::Error) -> Self {
        TranslationError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(error: config::ConfigError) -> Self {
        TranslationError::ConfigError(error.to_string())
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            TranslationError::SerializationError(format!("响应解码失败: {}", error))
        } else if let Some(status) = error.status() {
            TranslationError::HttpStatus(status.as_u16())
        } else {
            TranslationError::NetworkError(error.to_string())
        }
    }
}

macro_rules! storage_error_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for TranslationError {
                fn from(error: $ty) -> Self {
                    TranslationError::StorageError(error.to_string())
                }
            }
        )*
    };
}

storage_error_from!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// 错误结果类型别名
pub type TranslationResult<T> = Result<T, TranslationError>;
