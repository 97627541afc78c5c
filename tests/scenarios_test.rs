use async_trait::async_trait;
use chrono::NaiveDate;
use relevance_sieve::core::date_resolver::DateResolver;
use relevance_sieve::core::dedup::{dedup_key, dedupe};
use relevance_sieve::core::domain_classifier::DomainClassifier;
use relevance_sieve::core::lexical::LexicalExtractor;
use relevance_sieve::core::scorer::Scorer;
use relevance_sieve::domain::model::{Decision, DomainVerdict, Routing};
use relevance_sieve::domain::ports::Adjudicator;
use relevance_sieve::{Orchestrator, PipelineKind, RawResult, Result, SieveConfig};
use std::sync::Arc;
use std::time::Duration;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
}

fn score(kind: PipelineKind, url: &str, text: &str) -> (DomainVerdict, i32, Routing) {
    let config = SieveConfig::default();
    let domain = DomainClassifier::new(&config.domains).classify(url);
    let signals = LexicalExtractor::new(&config.keywords).extract(text);
    let verdict = Scorer::new(&config.scoring, config.thresholds(kind)).score(domain, &signals);
    (domain, verdict.score, verdict.routing)
}

#[test]
fn scenario_blocked_encyclopedia_page() {
    for text in ["Q-Tip: American musician", "Black queer pride London", ""] {
        let (domain, value, routing) = score(
            PipelineKind::News,
            "https://en.wikipedia.org/wiki/Q-Tip_(musician)",
            text,
        );
        assert_eq!(domain, DomainVerdict::Blocked);
        assert_eq!(value, -1);
        assert_eq!(routing, Routing::AutoReject);
    }
}

#[test]
fn scenario_high_confidence_phrase() {
    let (domain, value, routing) = score(
        PipelineKind::News,
        "https://news.example.org/pride",
        "Black Queer Pride Event - London",
    );
    assert_eq!(domain, DomainVerdict::Neutral);
    assert_eq!(value, 95);
    assert_eq!(routing, Routing::AutoAccept);
}

#[test]
fn scenario_negative_keyword() {
    let (_, value, routing) = score(
        PipelineKind::News,
        "https://news.example.org/communities",
        "Black Communities in America",
    );
    assert_eq!(value, 15);
    assert_eq!(routing, Routing::AutoReject);
}

#[test]
fn scenario_dual_topic_with_geography_on_trusted_domain() {
    let (domain, value, routing) = score(
        PipelineKind::News,
        "https://www.outsavvy.com/event/123",
        "Black LGBTQ+ London community event",
    );
    assert_eq!(domain, DomainVerdict::Trusted);
    assert_eq!(value, 85);
    assert_eq!(routing, Routing::AutoAccept);
}

#[tokio::test]
async fn scenario_blocked_gaming_wiki_in_events_pipeline() {
    let orchestrator = Orchestrator::new(
        Arc::new(SieveConfig::default()),
        PipelineKind::Events,
        Arc::new(relevance_sieve::DisabledAdjudicator),
        None,
        today(),
    )
    .unwrap();

    let outcome = orchestrator
        .run(vec![RawResult::new(
            "https://misery.fandom.com/wiki/Misery",
            "Misery — indie game, queer character",
            "",
        )])
        .await;

    assert!(outcome.result.accepted.is_empty());
    assert_eq!(outcome.result.rejected[0].reason.to_string(), "domain_blocklist");
    assert_eq!(outcome.counters.rejected_domain, 1);
    assert_eq!(outcome.counters.rejected_not_event, 0);
}

#[test]
fn scenario_duplicate_urls() {
    assert_eq!(
        dedup_key("http://Example.com/e/1", false),
        dedup_key("http://example.com/e/1/", false)
    );

    let survivors = dedupe(
        vec![
            RawResult::new("http://Example.com/e/1", "first", ""),
            RawResult::new("http://example.com/e/1/", "second", ""),
        ],
        false,
    );
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].title, "first");
    assert_eq!(dedupe(survivors.clone(), false), survivors);
}

#[test]
fn dates_are_always_valid_calendar_dates() {
    let resolver = DateResolver::new(&SieveConfig::default().dates).unwrap();
    for day in 1..=31 {
        for month in 1..=12 {
            let snippet = format!("On 2026-{:02}-{:02}", month, day);
            if let Some(resolved) = resolver.resolve("", &snippet, "", today()) {
                assert_eq!(
                    NaiveDate::from_ymd_opt(2026, month, day),
                    Some(resolved.date)
                );
            }
        }
    }
    assert!(resolver.resolve("", "2026-02-30", "", today()).is_none());
    assert!(resolver.resolve("", "2028-02-29", "", today()).is_some());
    assert!(resolver.resolve("", "2026-02-29", "", today()).is_none());
}

/// 先送出的項目回應較慢
struct ReverseLatencyAdjudicator;

#[async_trait]
impl Adjudicator for ReverseLatencyAdjudicator {
    async fn adjudicate(&self, title: &str, _snippet: &str, _url: &str) -> Result<f64> {
        let position: u64 = title
            .rsplit(' ')
            .next()
            .and_then(|n| n.parse().ok())
            .unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(20 * (5 - position.min(5)))).await;
        Ok(90.0)
    }
}

#[tokio::test]
async fn orchestrator_preserves_input_order_across_concurrent_adjudication() {
    let mut config = SieveConfig::default();
    config.adjudication.concurrency = 4;
    let orchestrator = Orchestrator::new(
        Arc::new(config),
        PipelineKind::News,
        Arc::new(ReverseLatencyAdjudicator),
        None,
        today(),
    )
    .unwrap();

    let mut input = Vec::new();
    for i in 1..=4 {
        // 兩個主題皆命中、無地理詞：60 分，送審
        input.push(RawResult::new(
            format!("https://x.example/escalate/{}", i),
            format!("Black and gay voices {}", i),
            "",
        ));
        input.push(RawResult::new(
            format!("https://x.example/rules/{}", i),
            format!("QTIPOC meetup {}", i),
            "",
        ));
    }

    let outcome = orchestrator.run(input.clone()).await;

    let accepted: Vec<&str> = outcome
        .result
        .accepted
        .iter()
        .map(|item| item.result.url.as_str())
        .collect();
    let expected: Vec<&str> = input.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(accepted, expected);
    assert_eq!(
        outcome
            .result
            .accepted
            .iter()
            .filter(|item| matches!(item.decision, Decision::Adjudicator { .. }))
            .count(),
        4
    );
}
