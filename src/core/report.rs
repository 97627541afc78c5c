use crate::domain::model::{DateSource, Decision, PipelineOutcome, ScoreRule};
use crate::utils::error::{Result, SieveError};
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const ACCEPTED_FILE: &str = "accepted.csv";
pub const REJECTED_FILE: &str = "rejected.csv";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, Serialize)]
struct AcceptedRow<'a> {
    url: &'a str,
    title: &'a str,
    score: i32,
    rule: ScoreRule,
    decided_by: &'static str,
    confidence: Option<f64>,
    event_date: Option<NaiveDate>,
    date_source: Option<DateSource>,
    reasoning: Option<&'a str>,
    suggested_category: Option<&'a str>,
    suggested_tags: String,
}

#[derive(Debug, Serialize)]
struct RejectedRow<'a> {
    url: &'a str,
    title: &'a str,
    reason: String,
    infrastructure_failure: bool,
}

pub fn accepted_csv(outcome: &PipelineOutcome) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for item in &outcome.result.accepted {
        let (decided_by, confidence, notes) = match &item.decision {
            Decision::Rules => ("rules", None, None),
            Decision::Adjudicator { confidence, notes } => {
                ("adjudicator", Some(*confidence), Some(notes))
            }
        };
        writer.serialize(AcceptedRow {
            url: &item.result.url,
            title: &item.result.title,
            score: item.verdict.score,
            rule: item.verdict.rule,
            decided_by,
            confidence,
            event_date: item.date.map(|d| d.date),
            date_source: item.date.map(|d| d.source),
            reasoning: notes.and_then(|n| n.reasoning.as_deref()),
            suggested_category: notes.and_then(|n| n.suggested_category.as_deref()),
            suggested_tags: notes.map(|n| n.suggested_tags.join(";")).unwrap_or_default(),
        })?;
    }
    finish_csv(writer)
}

pub fn rejected_csv(outcome: &PipelineOutcome) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for item in &outcome.result.rejected {
        writer.serialize(RejectedRow {
            url: &item.result.url,
            title: &item.result.title,
            reason: item.reason.to_string(),
            infrastructure_failure: item.reason.is_infrastructure_failure(),
        })?;
    }
    finish_csv(writer)
}

pub fn summary_json(outcome: &PipelineOutcome) -> Result<String> {
    let summary = serde_json::json!({
        "pipeline": outcome.kind,
        "run_date": outcome.run_date,
        "counters": outcome.counters,
    });
    Ok(serde_json::to_string_pretty(&summary)?)
}

/// 將執行結果打包成 ZIP
pub fn build_report(outcome: &PipelineOutcome) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>(ACCEPTED_FILE, FileOptions::default())?;
    zip.write_all(accepted_csv(outcome)?.as_bytes())?;

    zip.start_file::<_, ()>(REJECTED_FILE, FileOptions::default())?;
    zip.write_all(rejected_csv(outcome)?.as_bytes())?;

    zip.start_file::<_, ()>(SUMMARY_FILE, FileOptions::default())?;
    zip.write_all(summary_json(outcome)?.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| SieveError::ProcessingError {
        message: format!("Failed to flush CSV output: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| SieveError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}
