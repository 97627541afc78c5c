use crate::config::toml_config::KeywordConfig;
use crate::domain::model::LexicalSignals;

/// 小寫並壓縮空白
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// 關鍵字集合；以子字串比對，不做斷詞
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    phrases: Vec<String>,
}

impl KeywordSet {
    pub fn new(phrases: &[String]) -> Self {
        Self {
            phrases: phrases
                .iter()
                .map(|p| normalize_text(p))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// `normalized` 必須已經過 `normalize_text`
    pub fn matches(&self, normalized: &str) -> bool {
        self.first_match(normalized).is_some()
    }

    pub fn first_match(&self, normalized: &str) -> Option<&str> {
        self.phrases
            .iter()
            .find(|phrase| normalized.contains(phrase.as_str()))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct LexicalExtractor {
    negative: KeywordSet,
    high_confidence: KeywordSet,
    topic_a: KeywordSet,
    topic_b: KeywordSet,
    geography: KeywordSet,
}

impl LexicalExtractor {
    pub fn new(config: &KeywordConfig) -> Self {
        Self {
            negative: KeywordSet::new(&config.negative),
            high_confidence: KeywordSet::new(&config.high_confidence),
            topic_a: KeywordSet::new(&config.topic_a),
            topic_b: KeywordSet::new(&config.topic_b),
            geography: KeywordSet::new(&config.geography),
        }
    }

    pub fn extract(&self, text: &str) -> LexicalSignals {
        self.extract_normalized(&normalize_text(text))
    }

    pub fn extract_normalized(&self, normalized: &str) -> LexicalSignals {
        LexicalSignals {
            has_negative: self.negative.matches(normalized),
            has_high_confidence: self.high_confidence.matches(normalized),
            has_topic_a: self.topic_a.matches(normalized),
            has_topic_b: self.topic_b.matches(normalized),
            has_geography: self.geography.matches(normalized),
        }
    }

    /// 命中的負面關鍵字，僅供除錯日誌使用
    pub fn negative_match<'a>(&'a self, normalized: &str) -> Option<&'a str> {
        self.negative.first_match(normalized)
    }
}
