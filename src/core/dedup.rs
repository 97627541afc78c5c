use crate::domain::model::{DedupKey, RawResult};
use std::collections::HashSet;
use url::Url;

/// 產生去重用的標準化 URL
///
/// 主機小寫並去除開頭的 "www."，保留路徑大小寫，去除結尾斜線與 fragment；scheme 不列入比對。
/// 無法解析的 URL 以去除前後空白的原文作為鍵值。
pub fn dedup_key(url: &str, retain_query: bool) -> DedupKey {
    let trimmed = url.trim();
    let parsed = match Url::parse(trimmed) {
        Ok(parsed) if parsed.has_host() => parsed,
        _ => return DedupKey::new(trimmed),
    };

    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let mut key = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if let Some(port) = parsed.port() {
        key.push_str(&format!(":{}", port));
    }
    key.push_str(parsed.path().trim_end_matches('/'));

    if retain_query {
        if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
            key.push('?');
            key.push_str(query);
        }
    }

    DedupKey::new(key)
}

/// 保留每個鍵值第一次出現的項目，且不改變順序
pub fn dedupe(results: Vec<RawResult>, retain_query: bool) -> Vec<RawResult> {
    dedupe_by(results, |result| result.url.as_str(), retain_query)
}

/// 同 `dedupe`，但可用於帶有額外資訊（例如原始索引）的項目
pub fn dedupe_by<T, F>(items: Vec<T>, url_of: F, retain_query: bool) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(dedup_key(url_of(item), retain_query)))
        .collect()
}
