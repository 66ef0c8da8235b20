//! Shared logging setup for the GAP report binaries.

use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LIBRARY_TARGETS: [&str; 2] = ["gap_core", "gap_odbc"];

/// Logging configuration shared by the report binaries.
pub struct LogConfig<'a> {
    /// Binary crate name, used as a filter target (`management_summary`).
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(config: &LogConfig<'_>) -> String {
    let level = if config.verbose { "debug" } else { "info" };
    LIBRARY_TARGETS
        .iter()
        .copied()
        .chain(std::iter::once(config.app_name))
        .map(|target| format!("{}={level}", target.replace('-', "_")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize tracing with a stderr fmt layer.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(&config)));
    let directives = filter.to_string();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(config.verbose)
                .with_filter(filter),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    tracing::debug!(app = config.app_name, filter = %directives, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_names_libraries_and_app() {
        let config = LogConfig {
            app_name: "nvc_summarization",
            verbose: false,
        };
        assert_eq!(
            default_filter(&config),
            "gap_core=info,gap_odbc=info,nvc_summarization=info"
        );
    }

    #[test]
    fn subscriber_installs_once() {
        let config = || LogConfig {
            app_name: "gap_logging",
            verbose: true,
        };
        assert!(init_logging(config()).is_ok());
        assert!(init_logging(config()).is_err());
    }

    #[test]
    fn verbose_lowers_every_target_to_debug() {
        let config = LogConfig {
            app_name: "management-summary",
            verbose: true,
        };
        let filter = default_filter(&config);
        assert!(filter.ends_with("management_summary=debug"));
        assert!(!filter.contains("=info"));
    }
}
