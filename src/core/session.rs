use crate::adapters::http::HttpClient;
use crate::config::models::{Account, RequesterConfig, SiteConfig};
use crate::domain::model::{SiteRunReport, TaskRecord, TaskStatus};
use crate::domain::ports::{Site, Task};
use crate::utils::error::Result;
use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Instant;

/// Everything a task needs to act for one account on one site.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub site_name: String,
    pub account_key: String,
    pub site: SiteConfig,
    pub requester: RequesterConfig,
    pub account: Account,
    pub http: HttpClient,
}

impl SiteContext {
    pub fn new(
        site_name: impl Into<String>,
        account_key: impl Into<String>,
        site: SiteConfig,
        requester: RequesterConfig,
        account: Account,
    ) -> Result<Self> {
        let http = HttpClient::new(requester.clone(), account.cookie_header().as_deref())?;
        Ok(Self {
            site_name: site_name.into(),
            account_key: account_key.into(),
            site,
            requester,
            account,
            http,
        })
    }

    pub fn enabled(&self) -> bool {
        self.site.enabled
    }

    pub fn username(&self) -> &str {
        &self.account.username
    }

    pub fn password(&self) -> &str {
        &self.account.password
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.account.cookies
    }

    /// `site/account`, used as a log prefix.
    pub fn label(&self) -> String {
        format!("{}/{}", self.site_name, self.account_key)
    }
}

/// One account's run through a site's task sequence.
pub struct SiteSession {
    ctx: SiteContext,
    tasks: Vec<Box<dyn Task>>,
}

impl SiteSession {
    pub fn new(site: &dyn Site, ctx: SiteContext) -> Self {
        let tasks = site.build_task_sequence(&ctx);
        Self { ctx, tasks }
    }

    pub fn context(&self) -> &SiteContext {
        &self.ctx
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Runs the tasks in order. The first failure stops the sequence and the
    /// remaining tasks are recorded as skipped.
    pub async fn run_all_tasks(&self) -> SiteRunReport {
        let label = self.ctx.label();
        let started_at = Utc::now();
        let started = Instant::now();
        let interval = self.ctx.http.request_interval();
        let mut records = Vec::with_capacity(self.tasks.len());
        let mut failed = false;

        for (index, task) in self.tasks.iter().enumerate() {
            if failed {
                records.push(TaskRecord {
                    task: task.name().to_string(),
                    status: TaskStatus::Skipped,
                    status_code: None,
                    detail: "previous task failed".to_string(),
                    duration_ms: 0,
                });
                continue;
            }

            if index > 0 && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }

            tracing::info!("[{}] Running task '{}'", label, task.name());
            let task_started = Instant::now();
            let outcome = task.run(&self.ctx).await;
            let duration_ms = task_started.elapsed().as_millis() as u64;

            let record = match outcome {
                Ok(output) => {
                    tracing::info!("[{}] Task '{}' succeeded: {}", label, task.name(), output.detail);
                    TaskRecord {
                        task: task.name().to_string(),
                        status: TaskStatus::Succeeded,
                        status_code: output.status_code,
                        detail: output.detail,
                        duration_ms,
                    }
                }
                Err(e) => {
                    tracing::error!("[{}] Task '{}' failed: {}", label, task.name(), e);
                    failed = true;
                    TaskRecord {
                        task: task.name().to_string(),
                        status: TaskStatus::Failed,
                        status_code: None,
                        detail: e.to_string(),
                        duration_ms,
                    }
                }
            };
            records.push(record);
        }

        SiteRunReport {
            site: self.ctx.site_name.clone(),
            account: self.ctx.account_key.clone(),
            username: self.ctx.account.username.clone(),
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            tasks: records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TaskOutput;
    use crate::utils::error::TaskerError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingTask {
        name: String,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Task for CountingTask {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(&self, ctx: &SiteContext) -> Result<TaskOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TaskerError::TaskFailed {
                    task: self.name.clone(),
                    reason: format!("refused for {}", ctx.username()),
                });
            }
            Ok(TaskOutput::new(Some(200), format!("done for {}", ctx.username())))
        }
    }

    struct ScriptedSite {
        plan: Vec<(&'static str, bool)>,
        calls: Arc<AtomicUsize>,
    }

    impl Site for ScriptedSite {
        fn name(&self) -> &str {
            "scripted"
        }

        fn build_task_sequence(&self, _ctx: &SiteContext) -> Vec<Box<dyn Task>> {
            self.plan
                .iter()
                .map(|(name, fail)| {
                    Box::new(CountingTask {
                        name: name.to_string(),
                        fail: *fail,
                        calls: self.calls.clone(),
                    }) as Box<dyn Task>
                })
                .collect()
        }
    }

    fn context() -> SiteContext {
        let account = Account {
            username: "alice".to_string(),
            password: "pw".to_string(),
            cookies: BTreeMap::from([("sid".to_string(), "1".to_string())]),
        };
        let requester = RequesterConfig {
            request_interval: 0.0,
            ..Default::default()
        };
        SiteContext::new("scripted", "main", SiteConfig::default(), requester, account).unwrap()
    }

    #[test]
    fn test_context_accessors() {
        let ctx = context();
        assert!(ctx.enabled());
        assert_eq!(ctx.username(), "alice");
        assert_eq!(ctx.password(), "pw");
        assert_eq!(ctx.cookies()["sid"], "1");
        assert_eq!(ctx.label(), "scripted/main");
    }

    #[tokio::test]
    async fn test_all_tasks_run_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let site = ScriptedSite {
            plan: vec![("signin", false), ("check", false)],
            calls: calls.clone(),
        };
        let session = SiteSession::new(&site, context());
        assert_eq!(session.task_names(), vec!["signin", "check"]);

        let report = session.run_all_tasks().await;
        assert!(report.succeeded());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(report.tasks[0].detail, "done for alice");
        assert_eq!(report.tasks[1].status_code, Some(200));
        assert_eq!(report.username, "alice");
    }

    #[tokio::test]
    async fn test_failure_skips_remaining_tasks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let site = ScriptedSite {
            plan: vec![("signin", true), ("check", false), ("claim", false)],
            calls: calls.clone(),
        };
        let report = SiteSession::new(&site, context()).run_all_tasks().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.tasks[0].status, TaskStatus::Failed);
        assert!(report.tasks[0].detail.contains("refused for alice"));
        assert_eq!(report.count(TaskStatus::Skipped), 2);
    }
}
