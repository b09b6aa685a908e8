//!
//! Setup logging subsystem.
//!

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use super::config;
use crate::configs::workspace_path;

/// Keeps the non-blocking writers flushing until dropped.
#[derive(Debug)]
pub struct LogGuard {
    _log_guards: Vec<WorkerGuard>,
    installed: bool,
}

impl LogGuard {
    /// Whether this call installed the global subscriber. A later `setup`
    /// keeps the subscriber that is already in place.
    pub fn installed(&self) -> bool {
        self.installed
    }
}

/// Installs the global subscriber. Events from `crates_to_watch` are shown at
/// the configured console level, everything else at `WARN`. `RUST_LOG`
/// overrides the configured filtering directive.
pub fn setup<Str: AsRef<str>>(
    conf: &config::Log,
    crates_to_watch: impl IntoIterator<Item = Str>,
) -> LogGuard {
    let mut guards = Vec::new();

    let file_layer = conf.file.enabled.then(|| {
        let mut path = workspace_path();
        path.push(&conf.file.path);
        let file_appender = tracing_appender::rolling::hourly(&path, &conf.file.file_name);
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
        guards.push(guard);

        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(file_writer)
            .with_filter(filter::Targets::new().with_default(conf.file.level.into_level()))
    });

    let console_layer = if conf.console.enabled {
        let (console_writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        guards.push(guard);

        let level = conf.console.level.into_level();
        let console_filter = crates_to_watch.into_iter().fold(
            filter::Targets::new().with_default(tracing::Level::WARN),
            |targets, target| targets.with_target(target.as_ref(), level),
        );
        let layer = match conf.console.log_format {
            config::LogFormat::Default => fmt::layer()
                .with_timer(fmt::time::time())
                .with_span_events(fmt::format::FmtSpan::CLOSE)
                .pretty()
                .with_writer(console_writer)
                .boxed(),
            config::LogFormat::Json => fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(console_writer)
                .boxed(),
        };
        Some(layer.with_filter(console_filter))
    } else {
        None
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::TRACE.into())
        .parse_lossy(conf.console.filtering_directive.clone().unwrap_or_default());
    let env_filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directive) => EnvFilter::builder()
            .with_default_directive(tracing::Level::TRACE.into())
            .parse_lossy(directive),
        Err(_) => env_filter,
    };

    let installed = match tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
    {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(%error, "global subscriber already installed, keeping the existing one");
            false
        }
    };

    LogGuard {
        _log_guards: guards,
        installed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_setup_keeps_the_installed_subscriber() {
        let conf = config::Log {
            console: config::LogConsole {
                enabled: false,
                ..Default::default()
            },
            file: config::LogFile::default(),
        };
        let _first = setup(&conf, ["external_services"]);
        let second = setup(&conf, ["external_services"]);
        assert!(!second.installed());
    }
}
