use crate::config::adapter::{AccountsAdapter, ConfigAdapter};
use crate::config::models::{Account, RequesterConfig, SiteConfig, TaskerConfig};
use crate::core::registry::SiteRegistry;
use crate::core::session::{SiteContext, SiteSession};
use crate::domain::model::{SiteRunReport, SkipReason, SkippedSite, TaskRecord, TaskStatus};
use crate::domain::ports::{Site, Storage};
use crate::utils::error::{Result, TaskerError};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// One (site, account) pair ready to run.
#[derive(Clone)]
pub struct PlannedJob {
    pub site_name: String,
    pub account_key: String,
    pub site: Arc<dyn Site>,
    pub site_config: SiteConfig,
    pub account: Account,
}

#[derive(Clone, Default)]
pub struct TaskerPlan {
    pub jobs: Vec<PlannedJob>,
    pub skipped_sites: Vec<SkippedSite>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskerSummary {
    pub execution_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub reports: Vec<SiteRunReport>,
    pub skipped_sites: Vec<SkippedSite>,
}

impl TaskerSummary {
    pub fn succeeded_jobs(&self) -> usize {
        self.reports.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed_jobs(&self) -> usize {
        self.reports.len() - self.succeeded_jobs()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_jobs() == 0
    }

    pub fn to_summary_map(&self) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();
        summary.insert("execution_id".to_string(), self.execution_id.clone().into());
        summary.insert("total_jobs".to_string(), self.reports.len().into());
        summary.insert("succeeded_jobs".to_string(), self.succeeded_jobs().into());
        summary.insert("failed_jobs".to_string(), self.failed_jobs().into());
        summary.insert("skipped_sites".to_string(), self.skipped_sites.len().into());
        summary.insert("total_duration_ms".to_string(), self.duration_ms.into());

        let sites: Vec<serde_json::Value> = self
            .reports
            .iter()
            .map(|r| serde_json::Value::String(format!("{}/{}", r.site, r.account)))
            .collect();
        summary.insert("executed".to_string(), serde_json::Value::Array(sites));
        summary
    }
}

/// `run_<date>_<time>_<millis>`, unique across runs started in the same second.
pub fn new_execution_id() -> String {
    format!("run_{}", Utc::now().format("%Y%m%d_%H%M%S_%3f"))
}

pub struct Tasker {
    registry: SiteRegistry,
    requester: RequesterConfig,
    config: TaskerConfig,
}

impl Tasker {
    pub fn new(registry: SiteRegistry, requester: RequesterConfig, config: TaskerConfig) -> Self {
        Self {
            registry,
            requester,
            config,
        }
    }

    pub fn config(&self) -> &TaskerConfig {
        &self.config
    }

    /// Works out which (site, account) pairs to run. `only` restricts the
    /// sites when non-empty.
    pub fn plan(
        &self,
        config: &ConfigAdapter,
        accounts: &AccountsAdapter,
        only: &[String],
    ) -> TaskerPlan {
        let mut plan = TaskerPlan::default();
        let configured = config.site_names();

        for name in only {
            if !configured.contains(name) {
                tracing::warn!("[tasker] Requested site '{}' is not configured", name);
            }
        }

        for site_name in configured {
            if !only.is_empty() && !only.contains(&site_name) {
                continue;
            }

            let mut skip = |reason: SkipReason| {
                tracing::info!("[tasker] Skipping site '{}': {}", site_name, reason);
                plan.skipped_sites.push(SkippedSite {
                    site: site_name.clone(),
                    reason,
                });
            };

            let site_config = match config
                .site_config(&site_name)
                .and_then(|c| c.validate().map(|_| c))
            {
                Ok(site_config) => site_config,
                Err(e) => {
                    skip(SkipReason::InvalidConfig(e.to_string()));
                    continue;
                }
            };
            if !site_config.enabled {
                skip(SkipReason::Disabled);
                continue;
            }
            let Some(site) = self.registry.resolve(&site_name, &site_config) else {
                skip(SkipReason::NoImplementation);
                continue;
            };
            let site_accounts = match accounts.accounts(&site_name) {
                Some(site_accounts) if !site_accounts.is_empty() => site_accounts,
                _ => {
                    skip(SkipReason::NoAccounts);
                    continue;
                }
            };

            for (account_key, account) in site_accounts {
                plan.jobs.push(PlannedJob {
                    site_name: site_name.clone(),
                    account_key: account_key.clone(),
                    site: site.clone(),
                    site_config: site_config.clone(),
                    account: account.clone(),
                });
            }
        }

        plan
    }

    pub async fn run(
        &self,
        config: &ConfigAdapter,
        accounts: &AccountsAdapter,
        only: &[String],
    ) -> TaskerSummary {
        let plan = self.plan(config, accounts, only);
        self.execute(plan, new_execution_id()).await
    }

    pub async fn execute(&self, plan: TaskerPlan, execution_id: String) -> TaskerSummary {
        let started_at = Utc::now();
        let started = Instant::now();

        tracing::info!(
            "[tasker] Starting {} with {} job(s), parallel={}",
            execution_id,
            plan.jobs.len(),
            self.config.parallel
        );

        let reports = if self.config.parallel && plan.jobs.len() > 1 {
            self.execute_parallel(plan.jobs).await
        } else {
            let mut reports = Vec::with_capacity(plan.jobs.len());
            for job in plan.jobs {
                reports.push(run_job(job, self.requester.clone()).await);
            }
            reports
        };

        let summary = TaskerSummary {
            execution_id,
            started_at,
            duration_ms: started.elapsed().as_millis() as u64,
            reports,
            skipped_sites: plan.skipped_sites,
        };

        tracing::info!(
            "[tasker] Finished {}: {} succeeded, {} failed, {} site(s) skipped",
            summary.execution_id,
            summary.succeeded_jobs(),
            summary.failed_jobs(),
            summary.skipped_sites.len()
        );
        summary
    }

    async fn execute_parallel(&self, jobs: Vec<PlannedJob>) -> Vec<SiteRunReport> {
        let workers = self.config.max_workers.max(1);
        let semaphore = Arc::new(Semaphore::new(workers));
        let labels: Vec<(String, String)> = jobs
            .iter()
            .map(|j| (j.site_name.clone(), j.account_key.clone()))
            .collect();

        let mut joins = JoinSet::new();
        for (index, job) in jobs.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let requester = self.requester.clone();
            joins.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                (index, run_job(job, requester).await)
            });
        }

        let mut slots: Vec<Option<SiteRunReport>> = vec![None; labels.len()];
        while let Some(joined) = joins.join_next().await {
            match joined {
                Ok((index, report)) => slots[index] = Some(report),
                Err(e) => tracing::error!("[tasker] Worker crashed: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(labels)
            .map(|(slot, (site, account))| {
                slot.unwrap_or_else(|| setup_failure(site, account, "worker crashed".to_string()))
            })
            .collect()
    }
}

async fn run_job(job: PlannedJob, requester: RequesterConfig) -> SiteRunReport {
    let PlannedJob {
        site_name,
        account_key,
        site,
        site_config,
        account,
    } = job;

    match SiteContext::new(
        site_name.clone(),
        account_key.clone(),
        site_config,
        requester,
        account,
    ) {
        Ok(ctx) => SiteSession::new(site.as_ref(), ctx).run_all_tasks().await,
        Err(e) => {
            tracing::error!("[{}/{}] Could not prepare session: {}", site_name, account_key, e);
            setup_failure(site_name, account_key, e.to_string())
        }
    }
}

fn setup_failure(site: String, account: String, detail: String) -> SiteRunReport {
    SiteRunReport {
        site,
        account,
        username: String::new(),
        started_at: Utc::now(),
        duration_ms: 0,
        tasks: vec![TaskRecord {
            task: "setup".to_string(),
            status: TaskStatus::Failed,
            status_code: None,
            detail,
            duration_ms: 0,
        }],
    }
}

/// Writes the results JSON and/or the CSV report, as configured.
/// Returns the locations written.
pub async fn persist<S: Storage>(
    summary: &TaskerSummary,
    config: &TaskerConfig,
    storage: &S,
) -> Result<Vec<String>> {
    let mut written = Vec::new();

    if config.save_results {
        let name = format!("results_{}.json", summary.execution_id);
        let data = serde_json::to_vec_pretty(summary)?;
        storage.write_file(&name, &data).await?;
        written.push(storage.location(&name));
    }

    if config.generate_report {
        let name = format!("report_{}.csv", summary.execution_id);
        let data = render_csv_report(summary)?;
        storage.write_file(&name, &data).await?;
        written.push(storage.location(&name));
    }

    Ok(written)
}

pub fn render_csv_report(summary: &TaskerSummary) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["site", "account", "task", "status", "detail", "duration_ms"])?;
    for report in &summary.reports {
        for task in &report.tasks {
            writer.write_record([
                report.site.as_str(),
                report.account.as_str(),
                task.task.as_str(),
                task.status.as_str(),
                task.detail.as_str(),
                task.duration_ms.to_string().as_str(),
            ])?;
        }
    }
    writer
        .into_inner()
        .map_err(|e| TaskerError::IoError(e.into_error()))
}
