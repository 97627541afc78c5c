use crate::config::toml_config::SieveConfig;
use crate::core::date_resolver::DateResolver;
use crate::core::dedup::{dedup_key, dedupe_by};
use crate::core::domain_classifier::DomainClassifier;
use crate::core::event_classifier::EventClassifier;
use crate::core::lexical::{normalize_text, LexicalExtractor};
use crate::core::scorer::Scorer;
use crate::domain::model::{
    AcceptedItem, Assessment, Decision, DomainVerdict, PipelineKind, PipelineOutcome,
    PipelineResult, RawResult, RejectReason, RejectedItem, RelevanceVerdict, Routing, RunCounters,
    ScoreRule,
};
use crate::domain::ports::{Adjudicator, SeenUrls};
use crate::utils::error::Result;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// 規則階段的分流結果
#[derive(Debug)]
enum Triage {
    Accept(RelevanceVerdict),
    Escalate(RelevanceVerdict),
    Reject(RejectReason),
}

/// 單筆送審的結果
#[derive(Debug)]
enum Adjudication {
    Confirmed(Assessment),
    Declined(f64),
    Failed(String),
    Skipped,
}

/// 串接各分類元件，執行一次完整的篩選
pub struct Orchestrator {
    config: Arc<SieveConfig>,
    kind: PipelineKind,
    domains: DomainClassifier,
    lexical: LexicalExtractor,
    events: EventClassifier,
    scorer: Scorer,
    dates: DateResolver,
    adjudicator: Arc<dyn Adjudicator>,
    seen: Option<Arc<dyn SeenUrls>>,
    run_timeout: Option<Duration>,
    today: NaiveDate,
}

impl Orchestrator {
    /// 配置錯誤在此即失敗，不會處理任何資料
    pub fn new(
        config: Arc<SieveConfig>,
        kind: PipelineKind,
        adjudicator: Arc<dyn Adjudicator>,
        seen: Option<Arc<dyn SeenUrls>>,
        today: NaiveDate,
    ) -> Result<Self> {
        config.validate_config()?;

        Ok(Self {
            domains: DomainClassifier::new(&config.domains),
            lexical: LexicalExtractor::new(&config.keywords),
            events: EventClassifier::new(&config.events),
            scorer: Scorer::new(&config.scoring, config.thresholds(kind)),
            dates: DateResolver::new(&config.dates)?,
            run_timeout: config.run_timeout(),
            config,
            kind,
            adjudicator,
            seen,
            today,
        })
    }

    /// 覆寫配置中的執行逾時
    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = Some(timeout);
        self
    }

    pub async fn run(&self, raw: Vec<RawResult>) -> PipelineOutcome {
        let deadline = self.run_timeout.map(|timeout| Instant::now() + timeout);
        let mut counters = RunCounters {
            raw: raw.len(),
            ..Default::default()
        };
        let mut accepted: Vec<(usize, AcceptedItem)> = Vec::new();
        let mut rejected: Vec<(usize, RejectedItem)> = Vec::new();

        tracing::info!("[{}] Processing {} raw results", self.kind, raw.len());

        let mut well_formed = Vec::with_capacity(raw.len());
        for (index, result) in raw.into_iter().enumerate() {
            match malformed_field(&result) {
                Some(field) => {
                    tracing::debug!("Malformed result #{} (missing {})", index, field);
                    rejected.push((
                        index,
                        RejectedItem {
                            result,
                            reason: RejectReason::MalformedInput { field },
                        },
                    ));
                }
                None => well_formed.push((index, result)),
            }
        }

        let before = well_formed.len();
        let unique = dedupe_by(
            well_formed,
            |(_, result)| result.url.as_str(),
            self.config.dedup.retain_query,
        );
        counters.duplicates = before - unique.len();
        tracing::info!(
            "[{}] {} unique results after removing {} duplicates",
            self.kind,
            unique.len(),
            counters.duplicates
        );

        let mut escalations = Vec::new();
        for (index, result) in unique {
            match self.triage(&result) {
                Triage::Accept(verdict) => {
                    tracing::debug!("Accepted by rules ({}): {}", verdict.score, result.url);
                    accepted.push((index, self.accept(result, verdict, Decision::Rules)));
                }
                Triage::Escalate(verdict) => {
                    counters.escalated += 1;
                    if self.already_seen(&result) {
                        tracing::debug!("Skipping already persisted URL: {}", result.url);
                        rejected.push((
                            index,
                            RejectedItem {
                                result,
                                reason: RejectReason::AlreadySeen,
                            },
                        ));
                    } else {
                        escalations.push((index, result, verdict));
                    }
                }
                Triage::Reject(reason) => {
                    tracing::debug!("Rejected ({}): {}", reason, result.url);
                    rejected.push((index, RejectedItem { result, reason }));
                }
            }
        }

        tracing::info!(
            "[{}] Rules decided {} accepted, {} rejected; {} escalated for adjudication",
            self.kind,
            accepted.len(),
            rejected.len(),
            escalations.len()
        );

        for (index, result, verdict, adjudication) in self.adjudicate_all(escalations, deadline).await
        {
            match adjudication {
                Adjudication::Confirmed(Assessment { confidence, notes }) => {
                    let decision = Decision::Adjudicator { confidence, notes };
                    accepted.push((index, self.accept(result, verdict, decision)));
                }
                Adjudication::Declined(confidence) => {
                    rejected.push((
                        index,
                        RejectedItem {
                            result,
                            reason: RejectReason::AdjudicatorRejected { confidence },
                        },
                    ));
                }
                Adjudication::Failed(detail) => {
                    tracing::warn!("Adjudicator failure for {}: {}", result.url, detail);
                    rejected.push((
                        index,
                        RejectedItem {
                            result,
                            reason: RejectReason::AdjudicatorFailure { detail },
                        },
                    ));
                }
                Adjudication::Skipped => {
                    counters.adjudication_skipped += 1;
                    rejected.push((
                        index,
                        RejectedItem {
                            result,
                            reason: RejectReason::AdjudicatorFailure {
                                detail: "run deadline reached before the call was issued"
                                    .to_string(),
                            },
                        },
                    ));
                }
            }
        }

        if counters.adjudication_skipped > 0 {
            tracing::warn!(
                "[{}] Run deadline reached, {} escalations were not adjudicated",
                self.kind,
                counters.adjudication_skipped
            );
        }

        accepted.sort_by_key(|(index, _)| *index);
        rejected.sort_by_key(|(index, _)| *index);

        for (_, item) in &accepted {
            if item.date.is_some() {
                counters.dated += 1;
            }
            if matches!(item.decision, Decision::Adjudicator { .. }) {
                counters.adjudicator_accepted += 1;
            }
        }
        for (_, item) in &rejected {
            tally_rejection(&mut counters, &item.reason);
        }
        counters.accepted = accepted.len();
        counters.rejected = rejected.len();

        tracing::info!(
            "[{}] Run finished: {} raw, {} accepted, {} rejected ({} malformed, {} duplicates, {} adjudicator failures)",
            self.kind,
            counters.raw,
            counters.accepted,
            counters.rejected,
            counters.malformed,
            counters.duplicates,
            counters.adjudicator_failures
        );

        PipelineOutcome {
            kind: self.kind,
            run_date: self.today,
            result: PipelineResult {
                accepted: accepted.into_iter().map(|(_, item)| item).collect(),
                rejected: rejected.into_iter().map(|(_, item)| item).collect(),
            },
            counters,
        }
    }

    /// 網域檢查最先執行；封鎖的網域不會進入任何文字判斷
    fn triage(&self, result: &RawResult) -> Triage {
        let domain = self.domains.classify(&result.url);
        if domain == DomainVerdict::Blocked {
            return Triage::Reject(RejectReason::DomainBlocklist);
        }

        if self.kind == PipelineKind::Events {
            let candidate = self.events.candidate(result);
            if !candidate.is_event {
                tracing::debug!("Not an event: {}", candidate.result.url);
                return Triage::Reject(RejectReason::NotEvent);
            }
        }

        let normalized = normalize_text(&result.combined_text());

        let signals = self.lexical.extract_normalized(&normalized);

        if self.kind == PipelineKind::Events && !(signals.has_topic_a && signals.has_topic_b) {
            return Triage::Reject(RejectReason::WeakKeywords);
        }

        let verdict = self.scorer.score(domain, &signals);
        match verdict.routing {
            Routing::AutoAccept => Triage::Accept(verdict),
            Routing::Escalate => Triage::Escalate(verdict),
            Routing::AutoReject => Triage::Reject(match verdict.rule {
                ScoreRule::DomainBlocked => RejectReason::DomainBlocklist,
                ScoreRule::NegativeKeyword => {
                    if let Some(keyword) = self.lexical.negative_match(&normalized) {
                        tracing::debug!("Negative keyword '{}' in {}", keyword, result.url);
                    }
                    RejectReason::NegativeKeyword
                }
                _ => RejectReason::LowScore(verdict.score),
            }),
        }
    }

    fn accept(&self, result: RawResult, verdict: RelevanceVerdict, decision: Decision) -> AcceptedItem {
        let date = match self.kind {
            PipelineKind::Events => {
                self.dates
                    .resolve(&result.url, &result.snippet, &result.title, self.today)
            }
            PipelineKind::News => None,
        };
        AcceptedItem {
            result,
            verdict,
            decision,
            date,
        }
    }

    fn already_seen(&self, result: &RawResult) -> bool {
        self.seen.as_ref().is_some_and(|seen| {
            seen.contains(&dedup_key(&result.url, self.config.dedup.retain_query))
        })
    }

    /// 依設定的併發上限送審；結果順序與輸入一致
    async fn adjudicate_all(
        &self,
        escalations: Vec<(usize, RawResult, RelevanceVerdict)>,
        deadline: Option<Instant>,
    ) -> Vec<(usize, RawResult, RelevanceVerdict, Adjudication)> {
        if escalations.is_empty() {
            return Vec::new();
        }

        let adjudicator = self.adjudicator.as_ref();
        let threshold = self.config.adjudication.confirmation_threshold;

        stream::iter(escalations)
            .map(move |(index, result, verdict)| async move {
                let outcome = adjudicate_one(adjudicator, &result, threshold, deadline).await;
                (index, result, verdict, outcome)
            })
            .buffered(self.config.adjudication.concurrency.max(1))
            .collect()
            .await
    }
}

async fn adjudicate_one(
    adjudicator: &dyn Adjudicator,
    result: &RawResult,
    threshold: f64,
    deadline: Option<Instant>,
) -> Adjudication {
    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
        return Adjudication::Skipped;
    }

    let call = adjudicator.assess(&result.title, &result.snippet, &result.url);
    let response = match deadline {
        Some(deadline) => match timeout_at(deadline, call).await {
            Ok(response) => response,
            Err(_) => return Adjudication::Failed("run deadline reached".to_string()),
        },
        None => call.await,
    };

    match response {
        Ok(assessment) if !(0.0..=100.0).contains(&assessment.confidence) => {
            Adjudication::Failed(format!("confidence {} out of range", assessment.confidence))
        }
        Ok(assessment) if assessment.confidence >= threshold => {
            Adjudication::Confirmed(assessment)
        }
        Ok(assessment) => Adjudication::Declined(assessment.confidence),
        Err(e) => Adjudication::Failed(e.to_string()),
    }
}

/// 回傳缺少的必要欄位
fn malformed_field(result: &RawResult) -> Option<&'static str> {
    if result.url.trim().is_empty() {
        Some("url")
    } else if result.title.trim().is_empty() && result.snippet.trim().is_empty() {
        Some("text")
    } else {
        None
    }
}

fn tally_rejection(counters: &mut RunCounters, reason: &RejectReason) {
    match reason {
        RejectReason::MalformedInput { .. } => counters.malformed += 1,
        RejectReason::DomainBlocklist => counters.rejected_domain += 1,
        RejectReason::NotEvent => counters.rejected_not_event += 1,
        RejectReason::WeakKeywords => counters.rejected_weak_keywords += 1,
        RejectReason::NegativeKeyword => counters.rejected_negative_keyword += 1,
        RejectReason::LowScore(_) => counters.rejected_low_score += 1,
        RejectReason::AlreadySeen => counters.rejected_already_seen += 1,
        RejectReason::AdjudicatorRejected { .. } => counters.adjudicator_rejected += 1,
        RejectReason::AdjudicatorFailure { .. } => counters.adjudicator_failures += 1,
    }
}
