use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// 搜尋或爬取來源提供的原始結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawResult {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub discovered_at: Option<DateTime<Utc>>,
}

impl RawResult {
    pub fn new(url: impl Into<String>, title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
            discovered_at: None,
        }
    }

    /// 用於關鍵字比對的文字：標題 + 摘要
    pub fn combined_text(&self) -> String {
        format!("{} {}", self.title, self.snippet)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainVerdict {
    Blocked,
    Trusted,
    Neutral,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalSignals {
    pub has_negative: bool,
    pub has_high_confidence: bool,
    pub has_topic_a: bool,
    pub has_topic_b: bool,
    pub has_geography: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Routing {
    AutoReject,
    Escalate,
    AutoAccept,
}

/// 命中的評分規則
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreRule {
    DomainBlocked,
    NegativeKeyword,
    HighConfidence,
    DualTopicWithGeography,
    TrustedFastPath,
    DualTopic,
    SingleTopicWithGeography,
    SingleTopic,
    NoSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    pub score: i32,
    pub routing: Routing,
    pub rule: ScoreRule,
}

impl RelevanceVerdict {
    pub const BLOCKED_SCORE: i32 = -1;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCandidate {
    pub result: RawResult,
    pub is_event: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    Url,
    Snippet,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDate {
    pub date: NaiveDate,
    pub source: DateSource,
}

/// 正規化後的 URL，作為去重與持久化的鍵
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    News,
    Events,
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineKind::News => f.write_str("news"),
            PipelineKind::Events => f.write_str("events"),
        }
    }
}

/// 拒絕原因；`Display` 輸出即為 reason code
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    MalformedInput { field: &'static str },
    DomainBlocklist,
    NotEvent,
    WeakKeywords,
    NegativeKeyword,
    LowScore(i32),
    AlreadySeen,
    AdjudicatorRejected { confidence: f64 },
    AdjudicatorFailure { detail: String },
}

impl RejectReason {
    /// 基礎設施失敗，而非內容不相關
    pub fn is_infrastructure_failure(&self) -> bool {
        matches!(self, RejectReason::AdjudicatorFailure { .. })
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MalformedInput { field } => write!(f, "malformed_input:{}", field),
            RejectReason::DomainBlocklist => f.write_str("domain_blocklist"),
            RejectReason::NotEvent => f.write_str("not_event"),
            RejectReason::WeakKeywords => f.write_str("weak_keywords"),
            RejectReason::NegativeKeyword => f.write_str("negative_keyword"),
            RejectReason::LowScore(score) => write!(f, "low_score:{}", score),
            RejectReason::AlreadySeen => f.write_str("already_seen"),
            RejectReason::AdjudicatorRejected { confidence } => {
                write!(f, "adjudicator_rejected:{}", confidence)
            }
            RejectReason::AdjudicatorFailure { .. } => f.write_str("adjudicator_failure"),
        }
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// 裁決者附帶的說明與分類建議
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicatorNotes {
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub suggested_category: Option<String>,
    #[serde(default)]
    pub suggested_tags: Vec<String>,
}

/// 一次裁決的完整回覆
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub confidence: f64,
    pub notes: AdjudicatorNotes,
}

impl Assessment {
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence,
            notes: AdjudicatorNotes::default(),
        }
    }
}

/// 接受的決策來源
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Decision {
    Rules,
    Adjudicator {
        confidence: f64,
        notes: AdjudicatorNotes,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptedItem {
    pub result: RawResult,
    pub verdict: RelevanceVerdict,
    pub decision: Decision,
    pub date: Option<ResolvedDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedItem {
    pub result: RawResult,
    pub reason: RejectReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineResult {
    pub accepted: Vec<AcceptedItem>,
    pub rejected: Vec<RejectedItem>,
}

/// 每次執行的診斷計數
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub raw: usize,
    pub malformed: usize,
    pub duplicates: usize,
    pub rejected_domain: usize,
    pub rejected_not_event: usize,
    pub rejected_weak_keywords: usize,
    pub rejected_negative_keyword: usize,
    pub rejected_low_score: usize,
    pub rejected_already_seen: usize,
    pub escalated: usize,
    pub adjudicator_accepted: usize,
    pub adjudicator_rejected: usize,
    pub adjudicator_failures: usize,
    pub adjudication_skipped: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub dated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub kind: PipelineKind,
    pub run_date: NaiveDate,
    pub result: PipelineResult,
    pub counters: RunCounters,
}
