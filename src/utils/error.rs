use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskerError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error in {path}: {message}")]
    TomlError { path: String, message: String },

    #[error("No {kind} file found")]
    MissingConfigFile { kind: String },

    #[error("Unsupported config file extension: {extension}")]
    UnsupportedExtension { extension: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required config field: {field}")]
    MissingConfigError { field: String },

    #[error("Config section '{section}' has the wrong shape: {message}")]
    ConfigTypeError { section: String, message: String },

    #[error("No account '{user}' configured for site '{site}'")]
    UnknownAccount { site: String, user: String },

    #[error("{method} {url} failed after {attempts} attempt(s): {reason}")]
    RequestFailed {
        method: String,
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Task '{task}' failed: {reason}")]
    TaskFailed { task: String, reason: String },

    #[error("Invalid commit message: {reason}")]
    CommitMessage { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Io,
    Task,
    Convention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TaskerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TaskerError::TomlError { .. }
            | TaskerError::MissingConfigFile { .. }
            | TaskerError::UnsupportedExtension { .. }
            | TaskerError::InvalidConfigValueError { .. }
            | TaskerError::MissingConfigError { .. }
            | TaskerError::ConfigTypeError { .. }
            | TaskerError::UnknownAccount { .. } => ErrorCategory::Configuration,
            TaskerError::HttpError(_) | TaskerError::RequestFailed { .. } => {
                ErrorCategory::Network
            }
            TaskerError::IoError(_)
            | TaskerError::SerializationError(_)
            | TaskerError::CsvError(_) => ErrorCategory::Io,
            TaskerError::TaskFailed { .. } => ErrorCategory::Task,
            TaskerError::CommitMessage { .. } => ErrorCategory::Convention,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Task | ErrorCategory::Convention | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// Exit code the CLI uses for this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            TaskerError::MissingConfigFile { kind } => format!(
                "Pass the {} path explicitly, place it in the working directory, or run with --init",
                kind
            ),
            TaskerError::UnsupportedExtension { .. } => {
                "Use a .toml or .json config file".to_string()
            }
            TaskerError::TomlError { .. } => "Check the file for TOML syntax errors".to_string(),
            TaskerError::InvalidConfigValueError { field, .. }
            | TaskerError::MissingConfigError { field } => {
                format!("Fix the '{}' entry in your config file", field)
            }
            TaskerError::ConfigTypeError { section, .. } => {
                format!("Make sure '{}' is a table with correctly typed values", section)
            }
            TaskerError::UnknownAccount { site, .. } => {
                format!("Add the account under [{}.accounts] in the accounts file", site)
            }
            TaskerError::HttpError(_) | TaskerError::RequestFailed { .. } => {
                "Check network connectivity, or raise retry_times/timeout in [global.requests]"
                    .to_string()
            }
            TaskerError::TaskFailed { .. } => {
                "Check that the account cookies are still valid".to_string()
            }
            TaskerError::CommitMessage { .. } => {
                "Use '<type>(<scope>): <description>' with type one of feat, fix, docs, style, refactor, test, chore"
                    .to_string()
            }
            TaskerError::IoError(_)
            | TaskerError::SerializationError(_)
            | TaskerError::CsvError(_) => {
                "Check file permissions and free disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Io => format!("File system problem: {}", self),
            ErrorCategory::Task => format!("Task problem: {}", self),
            ErrorCategory::Convention => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_maps_to_exit_code() {
        let err = TaskerError::MissingConfigFile {
            kind: "site config".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.exit_code(), 1);

        let err = TaskerError::RequestFailed {
            method: "GET".to_string(),
            url: "http://localhost".to_string(),
            attempts: 4,
            reason: "503".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);

        let err = TaskerError::IoError(std::io::Error::other("disk full"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_user_friendly_message_mentions_cause() {
        let err = TaskerError::UnknownAccount {
            site: "forum".to_string(),
            user: "bob".to_string(),
        };
        let message = err.user_friendly_message();
        assert!(message.starts_with("Configuration problem"));
        assert!(message.contains("bob"));
        assert!(err.recovery_suggestion().contains("[forum.accounts]"));
    }
}
