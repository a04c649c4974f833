//! Service configuration loaded from environment variables.

const LOG_FILTER_VAR: &str = "VOLUNTEER_POINTS_LOG";
const MAX_CONCLUSION_BATCH_VAR: &str = "VOLUNTEER_POINTS_MAX_CONCLUSION_BATCH";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// `tracing` filter directives, e.g. `info` or `volunteer_points_service=debug`
    pub log_filter: String,
    /// Optional cap on the applications a single conclusion request can list, unlimited if unset
    pub max_conclusion_batch: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            max_conclusion_batch: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key-value source, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_filter = lookup(LOG_FILTER_VAR).unwrap_or(defaults.log_filter);
        let max_conclusion_batch = match lookup(MAX_CONCLUSION_BATCH_VAR) {
            Some(value) => match value.parse::<usize>() {
                Ok(max) if max > 0 => Some(max),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: MAX_CONCLUSION_BATCH_VAR,
                        value,
                    })
                }
            },
            None => defaults.max_conclusion_batch,
        };

        Ok(Self {
            log_filter,
            max_conclusion_batch,
        })
    }
}
