use clap::Parser;
use daily_tasker::config::paths::{self, APP_NAME};
use daily_tasker::config::{loader, LogLevel};
use daily_tasker::core::tasker::{persist, TaskerPlan};
use daily_tasker::utils::logger;
use daily_tasker::utils::validation::Validate;
use daily_tasker::{
    default_registry, AccountsAdapter, CliArgs, ConfigAdapter, ConfigLoader, LocalStorage,
    Result, Tasker, TaskerSummary,
};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let exit_code = match run(&args).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            tracing::error!(
                "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
                APP_NAME,
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            e.exit_code()
        }
    };

    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Returns whether every job succeeded.
async fn run(args: &CliArgs) -> Result<bool> {
    // INFO until the config file names a level
    let log = if args.log_json {
        logger::init_json_logger(args.verbose, LogLevel::Info)
    } else {
        logger::init_cli_logger(args.verbose, LogLevel::Info)
    };

    if args.init {
        let dir = paths::config_dir();
        let written = loader::write_templates(&dir, args.force)?;
        if written.is_empty() {
            println!("Config files already exist in {} (use --force to overwrite)", dir.display());
        }
        for path in written {
            println!("📝 Wrote {}", path.display());
        }
        return Ok(true);
    }

    let config_loader = ConfigLoader::new();
    let config = ConfigAdapter::new(config_loader.load_site_config(args.config.as_deref())?);

    let debug = config.debug_config().unwrap_or_default();
    log.set_level(args.verbose, debug.log_level);
    tracing::info!("🚀 Starting {}", APP_NAME);

    let requester = config.requester_config()?;
    requester.validate()?;

    let mut tasker_config = config.tasker_config()?;
    args.apply_overrides(&mut tasker_config);
    tasker_config.validate()?;

    let accounts =
        AccountsAdapter::new(config_loader.load_site_accounts(args.accounts.as_deref())?);

    let tasker = Tasker::new(default_registry(), requester, tasker_config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no requests will be sent");
        let plan = tasker.plan(&config, &accounts, &args.sites);
        display_plan(&plan);
        return Ok(true);
    }

    let summary = tasker.run(&config, &accounts, &args.sites).await;
    display_summary(&summary);

    let runtime = tasker.config();
    if runtime.save_results || runtime.generate_report {
        let storage = LocalStorage::new(&runtime.results_path);
        for location in persist(&summary, runtime, &storage).await? {
            println!("📁 Saved {}", location);
        }
    }

    Ok(summary.all_succeeded())
}

fn display_plan(plan: &TaskerPlan) {
    println!("📋 Planned jobs: {}", plan.jobs.len());
    for job in &plan.jobs {
        println!(
            "  • {}/{} via '{}' ({})",
            job.site_name,
            job.account_key,
            job.site.name(),
            job.account.username
        );
    }
    for skipped in &plan.skipped_sites {
        println!("  ⏭️ {} skipped: {}", skipped.site, skipped.reason);
    }
}

fn display_summary(summary: &TaskerSummary) {
    println!("🆔 Execution ID: {}", summary.execution_id);
    for report in &summary.reports {
        let mark = if report.succeeded() { "✅" } else { "❌" };
        println!(
            "  {} {}/{} ({} task(s), {} ms)",
            mark,
            report.site,
            report.account,
            report.tasks.len(),
            report.duration_ms
        );
        if let Some(failure) = report.first_failure() {
            println!("      {} failed: {}", failure.task, failure.detail);
        }
    }
    for skipped in &summary.skipped_sites {
        println!("  ⏭️ {} skipped: {}", skipped.site, skipped.reason);
    }
    println!(
        "📊 {} succeeded, {} failed, {} site(s) skipped",
        summary.succeeded_jobs(),
        summary.failed_jobs(),
        summary.skipped_sites.len()
    );
}
