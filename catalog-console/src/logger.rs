//! Logging setup

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "catalog_console=info,catalog_client=info";

/// Initialize the logger, writing to a daily file when `log_dir` exists.
///
/// Console output goes to stderr so listings on stdout stay clean.
pub fn init_logger(log_dir: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        if dir.is_dir() {
            let file_appender = tracing_appender::rolling::daily(dir, "catalog-console");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("log directory {} does not exist, logging to stderr", dir.display());
    }

    subscriber.with_writer(std::io::stderr).init();
}
