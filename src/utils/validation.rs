use crate::utils::error::{Result, SieveError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SieveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SieveError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SieveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SieveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 關鍵字清單不得為空，且不得含有空白項目
pub fn validate_non_empty_list(field_name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(SieveError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    validate_entries(field_name, values)
}

/// 清單可以為空，但每一項都必須有內容
pub fn validate_entries(field_name: &str, values: &[String]) -> Result<()> {
    if let Some(blank) = values.iter().find(|v| v.trim().is_empty()) {
        return Err(SieveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: blank.clone(),
            reason: "Entries cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SieveError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("adjudication.endpoint", "https://example.com").is_ok());
        assert!(validate_url("adjudication.endpoint", "http://example.com").is_ok());
        assert!(validate_url("adjudication.endpoint", "").is_err());
        assert!(validate_url("adjudication.endpoint", "invalid-url").is_err());
        assert!(validate_url("adjudication.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("adjudication.concurrency", 5, 1).is_ok());
        assert!(validate_positive_number("adjudication.concurrency", 0, 1).is_err());
    }

    #[test]
    fn test_validate_non_empty_list() {
        assert!(validate_non_empty_list("keywords.topic_a", &["black".to_string()]).is_ok());
        assert!(matches!(
            validate_non_empty_list("keywords.topic_a", &[]),
            Err(SieveError::MissingConfigError { .. })
        ));
        assert!(validate_non_empty_list("keywords.topic_a", &["  ".to_string()]).is_err());
        assert!(validate_entries("keywords.negative", &[]).is_ok());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("threshold", 75.0, 0.0, 100.0).is_ok());
        assert!(validate_range("threshold", 101.0, 0.0, 100.0).is_err());
        assert!(validate_range("threshold", -1, 0, 100).is_err());
    }
}
