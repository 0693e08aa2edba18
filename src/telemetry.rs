//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! Behavior:
//! - `[log] level` in zerog.toml controls the filter (e.g. "debug" or directives
//!   like "info,chat=debug,nav=debug,tower_http=info").
//! - `[log] format` selects "pretty" (default) or "json" structured logs.
//!
//! Targets used across the crate: `zerog_lesson`, `nav`, `quiz`, `chat`.

use tracing_subscriber::EnvFilter;

use crate::config::LogCfg;

/// Subscriber used while the config file itself is being read.
pub fn bootstrap_subscriber() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt().with_target(true).finish()
}

pub fn init_tracing(cfg: &LogCfg) {
    let filter = EnvFilter::try_new(&cfg.level).unwrap_or_else(|e| {
        eprintln!("invalid log level {:?} ({}); using \"info\"", cfg.level, e);
        EnvFilter::new("info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match cfg.format.as_str() {
        "json" => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
