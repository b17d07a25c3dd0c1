use crate::utils::error::{Result, TaskerError};
use std::time::Duration;
use url::Url;

/// Upper bound for any seconds-valued setting: one day.
pub const MAX_SECONDS: f64 = 86_400.0;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TaskerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TaskerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TaskerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(TaskerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(TaskerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(TaskerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Seconds-valued settings: finite, not negative and at most [`MAX_SECONDS`].
/// `allow_zero` is false for timeouts.
pub fn validate_seconds(field_name: &str, value: f64, allow_zero: bool) -> Result<()> {
    let positive = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !(value.is_finite() && positive) {
        return Err(TaskerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: if allow_zero {
                "Value must be zero or a positive number of seconds".to_string()
            } else {
                "Value must be a positive number of seconds".to_string()
            },
        });
    }
    if value > MAX_SECONDS {
        return Err(TaskerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must not exceed {} seconds", MAX_SECONDS),
        });
    }
    Ok(())
}

/// Validates a seconds setting and converts it without panicking.
pub fn seconds_to_duration(field_name: &str, value: f64, allow_zero: bool) -> Result<Duration> {
    validate_seconds(field_name, value, allow_zero)?;
    Duration::try_from_secs_f64(value).map_err(|e| TaskerError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| TaskerError::MissingConfigError {
        field: field_name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("signin_url", "https://example.com/sign").is_ok());
        assert!(validate_url("signin_url", "http://example.com").is_ok());
        assert!(validate_url("signin_url", "").is_err());
        assert!(validate_url("signin_url", "not a url").is_err());
        assert!(validate_url("signin_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_seconds() {
        assert!(validate_seconds("timeout", 30.0, false).is_ok());
        assert!(validate_seconds("timeout", 0.0, false).is_err());
        assert!(validate_seconds("request_interval", 0.0, true).is_ok());
        assert!(validate_seconds("request_interval", -1.0, true).is_err());
        assert!(validate_seconds("retry_interval", f64::NAN, true).is_err());
        assert!(validate_seconds("timeout", MAX_SECONDS, false).is_ok());
        assert!(validate_seconds("timeout", 1e30, false).is_err());
    }

    #[test]
    fn test_seconds_to_duration() {
        assert_eq!(
            seconds_to_duration("timeout", 1.5, false).unwrap(),
            Duration::from_millis(1500)
        );
        assert_eq!(
            seconds_to_duration("request_interval", 0.0, true).unwrap(),
            Duration::ZERO
        );
        assert!(matches!(
            seconds_to_duration("timeout", 1e30, false),
            Err(TaskerError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("max_workers", 5, 1).is_ok());
        assert!(validate_positive_number("max_workers", 0, 1).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("x".to_string());
        assert_eq!(validate_required_field("signin_url", &present).unwrap(), "x");
        let missing: Option<String> = None;
        assert!(matches!(
            validate_required_field("signin_url", &missing),
            Err(TaskerError::MissingConfigError { .. })
        ));
    }
}
