use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a task reports back when it finishes without error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskOutput {
    pub status_code: Option<u16>,
    pub detail: String,
}

impl TaskOutput {
    pub fn new(status_code: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            status_code,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Succeeded,
    Failed,
    Skipped,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRecord {
    pub task: String,
    pub status: TaskStatus,
    pub status_code: Option<u16>,
    pub detail: String,
    pub duration_ms: u64,
}

/// Outcome of one account's task sequence on one site.
#[derive(Debug, Clone, Serialize)]
pub struct SiteRunReport {
    pub site: String,
    pub account: String,
    pub username: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub tasks: Vec<TaskRecord>,
}

impl SiteRunReport {
    pub fn succeeded(&self) -> bool {
        self.tasks.iter().all(|t| t.status == TaskStatus::Succeeded)
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    pub fn first_failure(&self) -> Option<&TaskRecord> {
        self.tasks.iter().find(|t| t.status == TaskStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Disabled,
    NoImplementation,
    NoAccounts,
    InvalidConfig(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Disabled => f.write_str("disabled"),
            SkipReason::NoImplementation => f.write_str("no implementation and no signin_url"),
            SkipReason::NoAccounts => f.write_str("no accounts configured"),
            SkipReason::InvalidConfig(reason) => write!(f, "invalid config: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSite {
    pub site: String,
    pub reason: SkipReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(task: &str, status: TaskStatus) -> TaskRecord {
        TaskRecord {
            task: task.to_string(),
            status,
            status_code: None,
            detail: String::new(),
            duration_ms: 0,
        }
    }

    #[test]
    fn test_report_status_helpers() {
        let mut report = SiteRunReport {
            site: "forum".to_string(),
            account: "main".to_string(),
            username: "alice".to_string(),
            started_at: Utc::now(),
            duration_ms: 3,
            tasks: vec![record("signin", TaskStatus::Succeeded)],
        };
        assert!(report.succeeded());
        assert!(report.first_failure().is_none());

        report.tasks.push(record("check", TaskStatus::Failed));
        report.tasks.push(record("extra", TaskStatus::Skipped));
        assert!(!report.succeeded());
        assert_eq!(report.count(TaskStatus::Skipped), 1);
        assert_eq!(report.first_failure().unwrap().task, "check");
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(SkippedSite {
            site: "x".to_string(),
            reason: SkipReason::NoAccounts,
        })
        .unwrap();
        assert_eq!(json["reason"], "no_accounts");
        assert_eq!(serde_json::to_value(TaskStatus::Failed).unwrap(), "failed");
    }
}
