//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::segment::{split_path, ParamType, Segment};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;
    warn_degraded_params(&config);

    Ok(config)
}

fn warn_degraded_params(config: &AppConfig) {
    for route in &config.routes {
        for raw in split_path(&route.pattern, config.router.normalize_trailing_slash) {
            let Some(tag) = raw
                .strip_prefix('<')
                .and_then(|s| s.strip_suffix('>'))
                .and_then(|inner| inner.split_once(':'))
                .map(|(_, tag)| tag)
            else {
                continue;
            };
            if ParamType::parse_known(tag).is_none() {
                if let Segment::Param { name, .. } = Segment::parse(raw) {
                    tracing::warn!(
                        pattern = %route.pattern,
                        param = %name,
                        tag = %tag,
                        "Unknown parameter type, treated as generic"
                    );
                }
            }
        }
    }
}
