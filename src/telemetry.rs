//! Tracing subscriber setup for the `deadlight` binary.

use crate::config::LogConfig;
use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured filter. A filter that doesn't parse falls back to
/// `info`. Safe to call multiple times, later calls are no-ops.
pub fn init(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter.as_str()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let _ = if config.json {
        builder.json().with_target(false).try_init()
    } else {
        builder.pretty().try_init()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_tolerate_repeated_init() {
        let config = LogConfig {
            filter: "not a [valid filter".to_owned(),
            json: true,
        };

        init(&config);
        init(&LogConfig::default());
        tracing::info!("still logging");
    }
}
