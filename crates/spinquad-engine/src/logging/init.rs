use std::sync::Once;

/// Default directives when neither the config nor `RUST_LOG` sets a filter.
///
/// wgpu and naga are chatty at `info`; keep them to warnings.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Logger setup for the binary and for tests.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` directives, e.g. `"spinquad_engine=trace,wgpu_core=warn"`.
    /// Overrides `RUST_LOG` when set.
    pub filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Prefix lines with a millisecond timestamp.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

/// Picks the filter directives: explicit config, then `RUST_LOG`, then [`DEFAULT_FILTER`].
pub fn resolve_filter(configured: Option<&str>, env: Option<&str>) -> String {
    let set = |f: &&str| !f.trim().is_empty();
    configured
        .filter(set)
        .or(env.filter(set))
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

static LOGGER: Once = Once::new();

/// Installs the global `env_logger` once; later calls do nothing.
pub fn init_logging(config: LoggingConfig) {
    LOGGER.call_once(|| {
        let env = std::env::var("RUST_LOG").ok();
        let filter = resolve_filter(config.filter.as_deref(), env.as_deref());

        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&filter)
            .write_style(config.write_style);
        if config.timestamps {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp(None);
        }

        // A test harness may have installed its own logger.
        if builder.try_init().is_ok() {
            log::debug!("logger installed with filter '{filter}'");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_filter_wins_over_env() {
        assert_eq!(resolve_filter(Some("trace"), Some("warn")), "trace");
    }

    #[test]
    fn env_filter_used_without_config() {
        assert_eq!(resolve_filter(None, Some("spinquad_engine=debug")), "spinquad_engine=debug");
    }

    #[test]
    fn blank_filters_fall_back_to_default() {
        assert_eq!(resolve_filter(None, None), DEFAULT_FILTER);
        assert_eq!(resolve_filter(Some("  "), None), DEFAULT_FILTER);
        assert_eq!(resolve_filter(Some(""), Some("debug")), "debug");
    }

    #[test]
    fn repeated_init_is_ignored() {
        init_logging(LoggingConfig {
            filter: Some("warn".to_string()),
            ..LoggingConfig::default()
        });
        init_logging(LoggingConfig::default());
        assert!(LOGGER.is_completed());
    }
}
