use crate::config::toml_config::DomainConfig;
use crate::domain::model::DomainVerdict;
use url::Url;

/// 依封鎖／信任清單分類網域
#[derive(Debug, Clone)]
pub struct DomainClassifier {
    blocked: Vec<String>,
    trusted: Vec<String>,
}

impl DomainClassifier {
    pub fn new(config: &DomainConfig) -> Self {
        Self {
            blocked: config.blocked.iter().map(|d| normalize_entry(d)).collect(),
            trusted: config.trusted.iter().map(|d| normalize_entry(d)).collect(),
        }
    }

    /// 封鎖清單優先於信任清單；無法解析的主機一律視為 Neutral
    pub fn classify(&self, url: &str) -> DomainVerdict {
        let Some(host) = extract_host(url) else {
            return DomainVerdict::Neutral;
        };

        if self.blocked.iter().any(|entry| host_matches(&host, entry)) {
            DomainVerdict::Blocked
        } else if self.trusted.iter().any(|entry| host_matches(&host, entry)) {
            DomainVerdict::Trusted
        } else {
            DomainVerdict::Neutral
        }
    }
}

/// 取出小寫主機名稱並去除開頭的 "www."
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?.trim_end_matches('.').to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

fn normalize_entry(entry: &str) -> String {
    let entry = entry.trim().trim_end_matches('.').to_lowercase();
    let entry = entry.strip_prefix("*.").unwrap_or(&entry);
    entry.strip_prefix("www.").unwrap_or(entry).to_string()
}

/// 完全相同，或以 ".entry" 結尾（以標籤為界）
fn host_matches(host: &str, entry: &str) -> bool {
    if entry.is_empty() {
        return false;
    }
    host == entry
        || host
            .strip_suffix(entry)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
