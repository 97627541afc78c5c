use crate::core::dedup::dedup_key;
use crate::core::orchestrator::Orchestrator;
use crate::core::report::build_report;
use crate::core::{ConfigProvider, Pipeline, PipelineOutcome, RawResult, Storage};
use crate::domain::model::DedupKey;
use crate::utils::error::{Result, SieveError};
use serde_json::Value;
use std::collections::HashSet;

/// 從 JSON 檔讀取一批結果，篩選後輸出 ZIP 報表
pub struct BatchPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) source: S,
    pub(crate) sink: S,
    pub(crate) config: C,
    pub(crate) orchestrator: Orchestrator,
}

impl<S: Storage, C: ConfigProvider> BatchPipeline<S, C> {
    pub fn new(source: S, sink: S, config: C, orchestrator: Orchestrator) -> Self {
        Self {
            source,
            sink,
            config,
            orchestrator,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BatchPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawResult>> {
        tracing::debug!("Reading raw results from: {}", self.config.input_path());
        let bytes = self.source.read_file(self.config.input_path()).await?;
        parse_raw_results(&bytes)
    }

    async fn transform(&self, data: Vec<RawResult>) -> Result<PipelineOutcome> {
        Ok(self.orchestrator.run(data).await)
    }

    async fn load(&self, outcome: PipelineOutcome) -> Result<String> {
        let report = build_report(&outcome)?;
        let report_name = self.config.report_name();

        tracing::debug!("Writing report ({} bytes) to storage", report.len());
        self.sink.write_file(report_name, &report).await?;

        Ok(format!(
            "{}/{}",
            self.config.output_path().trim_end_matches('/'),
            report_name
        ))
    }
}

/// 解析 JSON 陣列；欄位型別錯誤的項目保留為空欄位，由後續流程標記為 malformed
pub fn parse_raw_results(bytes: &[u8]) -> Result<Vec<RawResult>> {
    let json: Value = serde_json::from_slice(bytes)?;
    let Value::Array(items) = json else {
        return Err(SieveError::ProcessingError {
            message: "Input must be a JSON array of search results".to_string(),
        });
    };

    let results = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match serde_json::from_value::<RawResult>(item.clone()) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Input item #{} does not match the expected shape: {}", index, e);
                let text = |field: &str| {
                    item.get(field)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                RawResult::new(text("url"), text("title"), text("snippet"))
            }
        })
        .collect();

    Ok(results)
}

/// 讀取已持久化 URL 清單（每行一個，`#` 開頭為註解）
pub async fn load_seen_urls<S: Storage>(
    storage: &S,
    path: &str,
    retain_query: bool,
) -> Result<HashSet<DedupKey>> {
    let bytes = storage.read_file(path).await?;
    let content = String::from_utf8_lossy(&bytes);

    let seen: HashSet<DedupKey> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| dedup_key(line, retain_query))
        .collect();

    tracing::info!("Loaded {} previously persisted URLs from {}", seen.len(), path);
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DisabledAdjudicator;
    use crate::config::toml_config::SieveConfig;
    use crate::domain::model::PipelineKind;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get(path).await.ok_or_else(|| {
                SieveError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    path.to_string(),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.put(path, data).await;
            Ok(())
        }
    }

    struct TestConfig;

    impl ConfigProvider for TestConfig {
        fn input_path(&self) -> &str {
            "results.json"
        }

        fn output_path(&self) -> &str {
            "./output/"
        }

        fn report_name(&self) -> &str {
            "report.zip"
        }
    }

    fn pipeline(source: MockStorage, sink: MockStorage) -> BatchPipeline<MockStorage, TestConfig> {
        let orchestrator = Orchestrator::new(
            Arc::new(SieveConfig::default()),
            PipelineKind::News,
            Arc::new(DisabledAdjudicator),
            None,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .unwrap();
        BatchPipeline::new(source, sink, TestConfig, orchestrator)
    }

    #[test]
    fn test_parse_keeps_badly_typed_items() {
        let results = parse_raw_results(
            br#"[
                {"url": "https://a.example/1", "title": "A", "snippet": "s"},
                {"url": 42, "title": "B"},
                "not an object"
            ]"#,
        )
        .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "A");
        assert_eq!(results[1].url, "");
        assert_eq!(results[1].title, "B");
        assert_eq!(results[2], RawResult::new("", "", ""));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(
            parse_raw_results(br#"{"url": "x"}"#),
            Err(SieveError::ProcessingError { .. })
        ));
        assert!(matches!(
            parse_raw_results(b"not json"),
            Err(SieveError::SerializationError(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_transform_load() {
        let source = MockStorage::default();
        let sink = MockStorage::default();
        source
            .put(
                "results.json",
                br#"[{"url": "https://news.example/1", "title": "Black Queer Pride Event - London"}]"#,
            )
            .await;

        let p = pipeline(source, sink.clone());
        let raw = p.extract().await.unwrap();
        let outcome = p.transform(raw).await.unwrap();
        assert_eq!(outcome.counters.accepted, 1);

        let path = p.load(outcome).await.unwrap();
        assert_eq!(path, "./output/report.zip");
        assert!(sink.get("report.zip").await.is_some());
    }

    #[tokio::test]
    async fn test_load_seen_urls_uses_dedup_key() {
        let storage = MockStorage::default();
        storage
            .put(
                "seen.txt",
                b"# persisted\nhttps://www.Example.com/e/1/\n\n  http://example.com/e/2#x  \n",
            )
            .await;

        let seen = load_seen_urls(&storage, "seen.txt", false).await.unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&dedup_key("http://example.com/e/1", false)));
        assert!(seen.contains(&dedup_key("https://example.com/e/2", false)));
        assert!(seen.contains(&dedup_key("https://www.example.com/e/2/", false)));
    }
}
