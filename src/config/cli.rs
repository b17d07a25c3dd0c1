use crate::config::models::TaskerConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "daily-tasker")]
#[command(about = "Runs each configured site's daily tasks for every account")]
pub struct CliArgs {
    /// Site config file (.toml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Accounts file (.toml or .json)
    #[arg(short, long)]
    pub accounts: Option<PathBuf>,

    /// Only run these sites (repeatable or comma separated)
    #[arg(short, long = "site", value_delimiter = ',')]
    pub sites: Vec<String>,

    /// Run accounts in parallel regardless of the config file
    #[arg(long)]
    pub parallel: bool,

    /// Override [global.runtime] max_workers
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// Show what would run without sending any request
    #[arg(long)]
    pub dry_run: bool,

    /// Write template config files into the config directory and exit
    #[arg(long)]
    pub init: bool,

    /// Overwrite existing files when used with --init
    #[arg(long, requires = "init")]
    pub force: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Applies command-line overrides on top of the file's runtime settings.
    pub fn apply_overrides(&self, config: &mut TaskerConfig) {
        if self.parallel {
            config.parallel = true;
        }
        if let Some(workers) = self.max_workers {
            config.max_workers = workers;
        }
    }
}
