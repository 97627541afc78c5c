use crate::domain::model::{Assessment, DedupKey, PipelineOutcome, RawResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn report_name(&self) -> &str;
}

/// 外部語意裁決者（LLM），回傳 0-100 的信心分數
#[async_trait]
pub trait Adjudicator: Send + Sync {
    async fn adjudicate(&self, title: &str, snippet: &str, url: &str) -> Result<f64>;

    /// 信心分數加上裁決者的說明；預設沒有說明
    async fn assess(&self, title: &str, snippet: &str, url: &str) -> Result<Assessment> {
        self.adjudicate(title, snippet, url).await.map(Assessment::new)
    }
}

/// 已持久化的 URL 索引，避免重複送審
pub trait SeenUrls: Send + Sync {
    fn contains(&self, key: &DedupKey) -> bool;
}

impl SeenUrls for HashSet<DedupKey> {
    fn contains(&self, key: &DedupKey) -> bool {
        HashSet::contains(self, key)
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawResult>>;
    async fn transform(&self, data: Vec<RawResult>) -> Result<PipelineOutcome>;
    async fn load(&self, outcome: PipelineOutcome) -> Result<String>;
}
