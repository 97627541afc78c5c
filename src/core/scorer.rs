use crate::config::toml_config::{ScoringConfig, ThresholdConfig};
use crate::domain::model::{DomainVerdict, LexicalSignals, RelevanceVerdict, Routing, ScoreRule};

pub const NEGATIVE_KEYWORD_SCORE: i32 = 15;
pub const HIGH_CONFIDENCE_SCORE: i32 = 95;
pub const DUAL_TOPIC_GEOGRAPHY_SCORE: i32 = 85;
pub const DUAL_TOPIC_SCORE: i32 = 60;
pub const SINGLE_TOPIC_GEOGRAPHY_SCORE: i32 = 50;
pub const SINGLE_TOPIC_SCORE: i32 = 25;
pub const NO_SIGNAL_SCORE: i32 = 10;

/// 規則判斷所需的輸入
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub domain: DomainVerdict,
    pub signals: &'a LexicalSignals,
}

/// (條件, 分數) 的評分規則
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub kind: ScoreRule,
    pub score: i32,
    predicate: fn(&RuleInput<'_>) -> bool,
}

impl Rule {
    pub fn applies(&self, input: &RuleInput<'_>) -> bool {
        (self.predicate)(input)
    }
}

fn single_topic(signals: &LexicalSignals) -> bool {
    signals.has_topic_a ^ signals.has_topic_b
}

fn dual_topic(signals: &LexicalSignals) -> bool {
    signals.has_topic_a && signals.has_topic_b
}

/// 依序評估規則，第一條成立的規則決定分數
#[derive(Debug, Clone)]
pub struct Scorer {
    rules: Vec<Rule>,
    thresholds: ThresholdConfig,
}

impl Scorer {
    pub fn new(config: &ScoringConfig, thresholds: ThresholdConfig) -> Self {
        let mut rules = vec![
            Rule {
                kind: ScoreRule::DomainBlocked,
                score: RelevanceVerdict::BLOCKED_SCORE,
                predicate: |i| i.domain == DomainVerdict::Blocked,
            },
            Rule {
                kind: ScoreRule::NegativeKeyword,
                score: NEGATIVE_KEYWORD_SCORE,
                predicate: |i| i.signals.has_negative && !i.signals.has_high_confidence,
            },
            Rule {
                kind: ScoreRule::HighConfidence,
                score: HIGH_CONFIDENCE_SCORE,
                predicate: |i| i.signals.has_high_confidence,
            },
            Rule {
                kind: ScoreRule::DualTopicWithGeography,
                score: DUAL_TOPIC_GEOGRAPHY_SCORE,
                predicate: |i| dual_topic(i.signals) && i.signals.has_geography,
            },
        ];

        if let Some(score) = config.trusted_fast_path_score {
            rules.push(Rule {
                kind: ScoreRule::TrustedFastPath,
                score,
                predicate: |i| {
                    i.domain == DomainVerdict::Trusted
                        && (i.signals.has_topic_a || i.signals.has_topic_b)
                },
            });
        }

        rules.extend([
            Rule {
                kind: ScoreRule::DualTopic,
                score: DUAL_TOPIC_SCORE,
                predicate: |i| dual_topic(i.signals),
            },
            Rule {
                kind: ScoreRule::SingleTopicWithGeography,
                score: SINGLE_TOPIC_GEOGRAPHY_SCORE,
                predicate: |i| single_topic(i.signals) && i.signals.has_geography,
            },
            Rule {
                kind: ScoreRule::SingleTopic,
                score: SINGLE_TOPIC_SCORE,
                predicate: |i| single_topic(i.signals),
            },
            Rule {
                kind: ScoreRule::NoSignal,
                score: NO_SIGNAL_SCORE,
                predicate: |_| true,
            },
        ]);

        Self { rules, thresholds }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn score(&self, domain: DomainVerdict, signals: &LexicalSignals) -> RelevanceVerdict {
        let input = RuleInput { domain, signals };
        // 最後一條規則恆成立，找不到只可能是規則表被清空
        let (kind, score) = self
            .rules
            .iter()
            .find(|rule| rule.applies(&input))
            .map(|rule| (rule.kind, rule.score))
            .unwrap_or((ScoreRule::NoSignal, NO_SIGNAL_SCORE));

        RelevanceVerdict {
            score,
            routing: self.route(score),
            rule: kind,
        }
    }

    /// -1 一律拒絕，其餘依門檻分流
    pub fn route(&self, score: i32) -> Routing {
        if score == RelevanceVerdict::BLOCKED_SCORE {
            Routing::AutoReject
        } else if score >= self.thresholds.auto_accept {
            Routing::AutoAccept
        } else if score >= self.thresholds.escalate {
            Routing::Escalate
        } else {
            Routing::AutoReject
        }
    }
}
