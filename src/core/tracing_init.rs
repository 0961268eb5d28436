use crate::core::config::LoggingConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines go. The terminal chat keeps stdout for the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
}

pub fn init_tracing(config: &LoggingConfig, target: LogTarget) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let use_console = config.console || config.format == "console";

    if use_console {
        // Pretty console output for development/debug
        let layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_line_number(true);

        match target {
            LogTarget::Stdout => tracing_subscriber::registry()
                .with(env_filter)
                .with(layer.with_ansi(true).with_thread_ids(true))
                .init(),
            LogTarget::Stderr => tracing_subscriber::registry()
                .with(env_filter)
                .with(layer.with_ansi(false).with_writer(std::io::stderr))
                .init(),
        }
    } else {
        let layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true);

        match target {
            LogTarget::Stdout => tracing_subscriber::registry()
                .with(env_filter)
                .with(layer)
                .init(),
            LogTarget::Stderr => tracing_subscriber::registry()
                .with(env_filter)
                .with(layer.with_writer(std::io::stderr))
                .init(),
        }
    }
}
