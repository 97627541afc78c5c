use crate::config::toml_config::AdjudicationConfig;
use crate::domain::model::{AdjudicatorNotes, Assessment};
use crate::domain::ports::Adjudicator;
use crate::utils::error::{Result, SieveError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct AdjudicationRequest<'a> {
    title: &'a str,
    snippet: &'a str,
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct AdjudicationResponse {
    relevance_score: f64,
    #[serde(flatten)]
    notes: AdjudicatorNotes,
}

/// 透過 HTTP 呼叫外部 LLM 服務評分
pub struct HttpAdjudicator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpAdjudicator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
            timeout,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// 沒有設定 endpoint 時回傳 `None`
    pub fn from_config(config: &AdjudicationConfig) -> Option<Self> {
        let endpoint = config.endpoint.as_ref()?;
        let adjudicator = Self::new(
            endpoint.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        );
        Some(match &config.api_key {
            Some(key) => adjudicator.with_api_key(key.clone()),
            None => adjudicator,
        })
    }
}

#[async_trait]
impl Adjudicator for HttpAdjudicator {
    async fn adjudicate(&self, title: &str, snippet: &str, url: &str) -> Result<f64> {
        self.assess(title, snippet, url)
            .await
            .map(|assessment| assessment.confidence)
    }

    async fn assess(&self, title: &str, snippet: &str, url: &str) -> Result<Assessment> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&AdjudicationRequest {
                title,
                snippet,
                url,
            })
            .timeout(self.timeout);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        tracing::debug!("Adjudicating {} via {}", url, self.endpoint);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SieveError::AdjudicatorError {
                message: format!("HTTP {}: {}", status.as_u16(), body),
            });
        }

        let reply: AdjudicationResponse = response.json().await?;
        let score = reply.relevance_score;
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(SieveError::AdjudicatorError {
                message: format!("relevance_score {} outside 0-100", score),
            });
        }

        Ok(Assessment {
            confidence: score,
            notes: reply.notes,
        })
    }
}

/// 未設定裁決服務時使用；每次呼叫都失敗
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAdjudicator;

#[async_trait]
impl Adjudicator for DisabledAdjudicator {
    async fn adjudicate(&self, _title: &str, _snippet: &str, _url: &str) -> Result<f64> {
        Err(SieveError::AdjudicatorError {
            message: "no adjudication endpoint configured".to_string(),
        })
    }
}
