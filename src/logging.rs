use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,adaptive_assessment=debug";
pub const DEFAULT_LOG_DIR: &str = "./logs";
pub const DEFAULT_FILE_PREFIX: &str = "assessment.log";

#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    /// EnvFilter directive, e.g. `warn,adaptive_assessment::engine=trace`.
    pub filter: String,
    pub file_enabled: bool,
    pub dir: PathBuf,
    pub file_prefix: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            file_enabled: false,
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
        }
    }
}

pub struct FileLogGuard {
    _guard: WorkerGuard,
}

fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|err| {
        eprintln!("invalid log filter {directive:?} ({err}), using {DEFAULT_FILTER:?}");
        EnvFilter::new(DEFAULT_FILTER)
    })
}

/// Installs the global subscriber: session events go to stderr so stdout
/// stays free for the JSON report. Keep the returned guard alive for the
/// lifetime of the process so buffered file logs are flushed.
pub fn init_tracing(settings: &LogSettings) -> Option<FileLogGuard> {
    let stderr_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    if settings.file_enabled {
        match std::fs::create_dir_all(&settings.dir) {
            Err(err) => {
                eprintln!(
                    "failed to create log directory {}: {err}",
                    settings.dir.display()
                );
            }
            Ok(()) => {
                let file_appender = RollingFileAppender::new(
                    Rotation::DAILY,
                    &settings.dir,
                    &settings.file_prefix,
                );
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                let file_layer = fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_target(true);

                tracing_subscriber::registry()
                    .with(env_filter(&settings.filter))
                    .with(stderr_layer)
                    .with(file_layer)
                    .init();

                return Some(FileLogGuard { _guard: guard });
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter(&settings.filter))
        .with(stderr_layer)
        .init();

    None
}
