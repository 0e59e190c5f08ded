//! 源语言识别
//!
//! 判定一段文本是否像源语言（英文）。识别策略通过 [`Classifier`] 注入，
//! 默认实现按关键词匹配。

use regex::Regex;

use crate::translation::error::{TranslationError, TranslationResult};

/// 常见英文词以及番剧目录页面的高频词汇
pub const DEFAULT_ENGLISH_KEYWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "her", "was", "one", "our",
    "out", "day", "get", "has", "him", "his", "how", "man", "new", "now", "old", "see", "time",
    "two", "way", "who", "boy", "did", "its", "let", "put", "say", "she", "too", "use", "episode",
    "episodes", "season", "seasons", "genre", "genres", "studio", "status", "ongoing",
    "completed", "airing", "aired", "score", "rank", "popularity", "members", "favorites",
    "synopsis", "background", "premiered", "broadcast", "producer", "licensor", "source",
    "duration", "rating", "action", "adventure", "comedy", "drama", "fantasy", "horror",
    "mystery", "romance", "sci-fi", "slice", "life", "sports", "supernatural", "thriller",
    "currently", "finished", "winter", "spring", "summer", "fall", "opening", "ending", "theme",
    "character", "characters", "voice", "actor", "staff",
];

/// 去掉这些字符后剩余的字符数才计入有效长度
const IGNORED_SYMBOLS: &str = ".,!?-()[]{}";

const MIN_TEXT_CHARS: usize = 3;

/// 源语言判定
pub trait Classifier {
    fn is_source_language(&self, text: &str) -> bool;
}

impl<F> Classifier for F
where
    F: Fn(&str) -> bool,
{
    fn is_source_language(&self, text: &str) -> bool {
        self(text)
    }
}

/// 基于关键词的源语言判定
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    pattern: Regex,
}

impl KeywordClassifier {
    /// 使用默认英文关键词表
    pub fn english() -> Self {
        Self::with_keywords(DEFAULT_ENGLISH_KEYWORDS)
            .expect("default keyword list always compiles")
    }

    pub fn with_keywords<S: AsRef<str>>(keywords: &[S]) -> TranslationResult<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .map(|k| regex::escape(&k))
            .collect();

        if alternatives.is_empty() {
            return Err(TranslationError::ConfigError("关键词表不能为空".to_string()));
        }

        let pattern = Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
            .map_err(|e| TranslationError::ConfigError(format!("关键词表无法编译: {}", e)))?;

        Ok(Self { pattern })
    }

    fn has_enough_letters(text: &str) -> bool {
        text.chars()
            .filter(|c| !(c.is_ascii_digit() || c.is_whitespace() || IGNORED_SYMBOLS.contains(*c)))
            .count()
            >= MIN_TEXT_CHARS
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::english()
    }
}

impl Classifier for KeywordClassifier {
    fn is_source_language(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_TEXT_CHARS || !Self::has_enough_letters(trimmed) {
            return false;
        }

        self.pattern.is_match(&trimmed.to_lowercase())
    }
}
