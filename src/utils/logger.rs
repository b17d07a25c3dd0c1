use crate::config::models::LogLevel;
use crate::config::paths::PACKAGE_NAME;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

fn build_filter(verbose: bool, level: LogLevel) -> EnvFilter {
    let directive = if verbose {
        format!("{}=debug,info", PACKAGE_NAME)
    } else {
        format!("{}={}", PACKAGE_NAME, level.as_directive())
    };

    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

/// Changes the installed filter once the config file has been read.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// `RUST_LOG` still wins over `level`.
    pub fn set_level(&self, verbose: bool, level: LogLevel) {
        if let Err(e) = self.filter.reload(build_filter(verbose, level)) {
            tracing::warn!("[logger] Could not change the log level: {}", e);
        }
    }
}

fn reloadable_filter(
    verbose: bool,
    level: LogLevel,
) -> (reload::Layer<EnvFilter, Registry>, LogHandle) {
    let (layer, filter) = reload::Layer::new(build_filter(verbose, level));
    (layer, LogHandle { filter })
}

pub fn init_cli_logger(verbose: bool, level: LogLevel) -> LogHandle {
    let (filter, handle) = reloadable_filter(verbose, level);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
    handle
}

/// JSON lines on stdout, for cron jobs feeding a log collector.
pub fn init_json_logger(verbose: bool, level: LogLevel) -> LogHandle {
    let (filter, handle) = reloadable_filter(verbose, level);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
    handle
}
