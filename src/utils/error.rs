use thiserror::Error;

#[derive(Error, Debug)]
pub enum SieveError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Adjudicator error: {message}")]
    AdjudicatorError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

/// 錯誤分類，用於日誌與監控
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Storage,
    Data,
}

/// 錯誤嚴重程度，CLI 依此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SieveError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SieveError::ConfigError { .. }
            | SieveError::ConfigValidationError { .. }
            | SieveError::InvalidConfigValueError { .. }
            | SieveError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SieveError::HttpError(_) | SieveError::AdjudicatorError { .. } => {
                ErrorCategory::Network
            }
            SieveError::IoError(_) | SieveError::ZipError(_) => ErrorCategory::Storage,
            SieveError::CsvError(_)
            | SieveError::SerializationError(_)
            | SieveError::ProcessingError { .. } => ErrorCategory::Data,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Critical,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Storage => ErrorSeverity::Critical,
            ErrorCategory::Data => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML configuration: keyword lists must not be empty and thresholds must be ordered"
            }
            ErrorCategory::Network => "Check the adjudicator endpoint and retry the run",
            ErrorCategory::Storage => "Check that the input file exists and the output path is writable",
            ErrorCategory::Data => "Check that the input file is a JSON array of search results",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SieveError::MissingConfigError { field } => {
                format!("設定缺少必要欄位: {}", field)
            }
            SieveError::InvalidConfigValueError { field, reason, .. } => {
                format!("設定值無效 ({}): {}", field, reason)
            }
            SieveError::ConfigValidationError { field, message } => {
                format!("設定檔驗證失敗 ({}): {}", field, message)
            }
            SieveError::IoError(e) => format!("檔案讀寫失敗: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SieveError>;
