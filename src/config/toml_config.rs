use crate::domain::model::PipelineKind;
use crate::utils::error::{Result, SieveError};
use crate::utils::validation::{
    validate_entries, validate_non_empty_list, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 一次執行所使用的完整設定，執行期間唯讀
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SieveConfig {
    pub domains: DomainConfig,
    pub keywords: KeywordConfig,
    pub events: EventTermsConfig,
    pub scoring: ScoringConfig,
    pub adjudication: AdjudicationConfig,
    pub dedup: DedupConfig,
    pub dates: DateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    pub blocked: Vec<String>,
    pub trusted: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub negative: Vec<String>,
    pub high_confidence: Vec<String>,
    pub topic_a: Vec<String>,
    pub topic_b: Vec<String>,
    pub geography: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventTermsConfig {
    pub event_terms: Vec<String>,
    pub non_event_terms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub auto_accept: i32,
    pub escalate: i32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            auto_accept: 80,
            escalate: 45,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub news: ThresholdConfig,
    pub events: ThresholdConfig,
    /// 設定後，受信任網域且命中任一主題時直接給此分數
    pub trusted_fast_path_score: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjudicationConfig {
    pub endpoint: Option<String>,
    /// 以 Bearer token 送出；可用 `${VAR}` 從環境變數帶入
    pub api_key: Option<String>,
    pub confirmation_threshold: f64,
    pub concurrency: usize,
    pub request_timeout_seconds: u64,
    pub run_timeout_seconds: Option<u64>,
}

impl Default for AdjudicationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            confirmation_threshold: 75.0,
            concurrency: 4,
            request_timeout_seconds: 30,
            run_timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub retain_query: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DateConfig {
    pub min_year: i32,
    pub max_year: i32,
}

impl Default for DateConfig {
    fn default() -> Self {
        Self {
            min_year: 2000,
            max_year: 2100,
        }
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            blocked: owned(&[
                "wikipedia.org",
                "fandom.com",
                "imdb.com",
                "ign.com",
                "gamespot.com",
                "steampowered.com",
                "itch.io",
                "twitch.tv",
                "rottentomatoes.com",
                "genius.com",
                "discogs.com",
                "allmusic.com",
                "last.fm",
                "spotify.com",
            ]),
            trusted: owned(&[
                "outsavvy.com",
                "eventbrite.co.uk",
                "eventbrite.com",
                "moonlightexperiences.com",
                "londonlgbtqcentre.org",
                "designmynight.com",
                "ukblackpride.org.uk",
                "blkoutuk.com",
                "pinknews.co.uk",
                "gal-dem.com",
                "theguardian.com",
                "bbc.co.uk",
            ]),
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            negative: owned(&[
                "america",
                "american",
                "usa",
                "video game",
                "gameplay",
                "playstation",
                "xbox",
                "nintendo",
                "lyrics",
                "album review",
                "box office",
                "celebrity gossip",
                "fantasy football",
            ]),
            high_confidence: owned(&[
                "black queer",
                "black gay",
                "black trans",
                "black lesbian",
                "black bisexual",
                "black nonbinary",
                "black non-binary",
                "qtipoc",
                "qpoc",
                "blkout",
                "blackout uk",
                "uk black pride",
                "african diaspora lgbtq",
                "caribbean lgbtq",
                "windrush lgbtq",
                "black british queer",
            ]),
            topic_a: owned(&[
                "black",
                "african",
                "caribbean",
                "windrush",
                "diaspora",
                "afro",
                "nigerian",
                "jamaican",
                "ghanaian",
                "somali",
            ]),
            topic_b: owned(&[
                "lgbtq",
                "queer",
                "gay",
                "lesbian",
                "trans",
                "bisexual",
                "pride",
                "nonbinary",
                "non-binary",
                "drag",
                "same-sex",
            ]),
            geography: owned(&[
                "uk",
                "britain",
                "british",
                "london",
                "manchester",
                "birmingham",
                "bristol",
                "leeds",
                "glasgow",
                "edinburgh",
                "cardiff",
            ]),
        }
    }
}

impl Default for EventTermsConfig {
    fn default() -> Self {
        Self {
            event_terms: owned(&[
                "event",
                "party",
                "night",
                "club",
                "gathering",
                "show",
                "performance",
                "live",
                "happening",
                "gig",
                "club night",
                "celebration",
                "festival",
                "pride",
            ]),
            non_event_terms: owned(&[
                "musician",
                "band",
                "game",
                "character",
                "tv show",
                "movie",
                "film",
                "wikipedia",
                "tutorial",
                "guide",
                "tips",
                "tricks",
            ]),
        }
    }
}

impl SieveConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SieveError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，未提供的區段使用內建預設值
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SieveError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ADJUDICATOR_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SieveError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 依管線種類取得路由門檻
    pub fn thresholds(&self, kind: PipelineKind) -> ThresholdConfig {
        match kind {
            PipelineKind::News => self.scoring.news,
            PipelineKind::Events => self.scoring.events,
        }
    }

    pub fn run_timeout(&self) -> Option<std::time::Duration> {
        self.adjudication
            .run_timeout_seconds
            .map(std::time::Duration::from_secs)
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.adjudication.request_timeout_seconds)
    }

    /// 驗證配置的合理性；任何錯誤都必須在處理第一筆資料前回報
    pub fn validate_config(&self) -> Result<()> {
        validate_entries("domains.blocked", &self.domains.blocked)?;
        validate_entries("domains.trusted", &self.domains.trusted)?;

        validate_entries("keywords.negative", &self.keywords.negative)?;
        validate_non_empty_list("keywords.high_confidence", &self.keywords.high_confidence)?;
        validate_non_empty_list("keywords.topic_a", &self.keywords.topic_a)?;
        validate_non_empty_list("keywords.topic_b", &self.keywords.topic_b)?;
        validate_non_empty_list("keywords.geography", &self.keywords.geography)?;

        validate_non_empty_list("events.event_terms", &self.events.event_terms)?;
        validate_entries("events.non_event_terms", &self.events.non_event_terms)?;

        validate_thresholds("scoring.news", self.scoring.news)?;
        validate_thresholds("scoring.events", self.scoring.events)?;
        if let Some(score) = self.scoring.trusted_fast_path_score {
            validate_range("scoring.trusted_fast_path_score", score, 0, 100)?;
        }

        let adjudication = &self.adjudication;
        if let Some(endpoint) = &adjudication.endpoint {
            validate_url("adjudication.endpoint", endpoint)?;
        }
        if !adjudication.confirmation_threshold.is_finite() {
            return Err(SieveError::InvalidConfigValueError {
                field: "adjudication.confirmation_threshold".to_string(),
                value: adjudication.confirmation_threshold.to_string(),
                reason: "Value must be a finite number".to_string(),
            });
        }
        validate_range(
            "adjudication.confirmation_threshold",
            adjudication.confirmation_threshold,
            0.0,
            100.0,
        )?;
        validate_positive_number("adjudication.concurrency", adjudication.concurrency, 1)?;
        validate_positive_number(
            "adjudication.request_timeout_seconds",
            adjudication.request_timeout_seconds as usize,
            1,
        )?;
        if let Some(run_timeout) = adjudication.run_timeout_seconds {
            validate_positive_number("adjudication.run_timeout_seconds", run_timeout as usize, 1)?;
        }

        validate_range("dates.min_year", self.dates.min_year, 1, 9999)?;
        validate_range("dates.max_year", self.dates.max_year, self.dates.min_year, 9999)?;

        Ok(())
    }
}

fn validate_thresholds(field: &str, thresholds: ThresholdConfig) -> Result<()> {
    validate_range(&format!("{}.escalate", field), thresholds.escalate, 0, 100)?;
    validate_range(
        &format!("{}.auto_accept", field),
        thresholds.auto_accept,
        thresholds.escalate,
        100,
    )
}

impl Validate for SieveConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
