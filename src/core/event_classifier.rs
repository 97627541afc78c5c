use crate::config::toml_config::EventTermsConfig;
use crate::core::lexical::{normalize_text, KeywordSet};
use crate::domain::model::{EventCandidate, RawResult};

/// 判斷文字是否描述一場實際舉辦的活動
///
/// 兩類詞彙都沒有出現時判定為非活動。
#[derive(Debug, Clone)]
pub struct EventClassifier {
    event_terms: KeywordSet,
    non_event_terms: KeywordSet,
}

impl EventClassifier {
    pub fn new(config: &EventTermsConfig) -> Self {
        Self {
            event_terms: KeywordSet::new(&config.event_terms),
            non_event_terms: KeywordSet::new(&config.non_event_terms),
        }
    }

    pub fn is_event(&self, text: &str) -> bool {
        self.is_event_normalized(&normalize_text(text))
    }

    fn is_event_normalized(&self, normalized: &str) -> bool {
        let has_event_term = self.event_terms.matches(normalized);
        let has_non_event_term = self.non_event_terms.matches(normalized);

        if has_non_event_term && !has_event_term {
            return false;
        }
        has_event_term
    }

    /// 活動管線的閘門：以標題加摘要判斷
    pub fn candidate(&self, result: &RawResult) -> EventCandidate {
        EventCandidate {
            result: result.clone(),
            is_event: self.is_event(&result.combined_text()),
        }
    }
}
