//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (leeway not negative)
//! - Check key file names and route patterns
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Unknown parameter types are not errors; they degrade to generic

use std::fmt;

use crate::config::schema::AppConfig;
use crate::routing::segment::{split_path, Segment};

/// One semantic problem, located by a dotted field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let policy = &config.jwt.policy;
    if policy.leeway_seconds < 0 {
        errors.push(ValidationError::new(
            "jwt.policy.leeway_seconds",
            "must not be negative",
        ));
    }

    let keys = &config.jwt.keys;
    if keys.spec.kid.trim().is_empty() {
        errors.push(ValidationError::new("jwt.keys.kid", "must not be empty"));
    }
    if keys.spec.private_key_file.trim().is_empty() {
        errors.push(ValidationError::new(
            "jwt.keys.private_key_file",
            "must not be empty",
        ));
    }
    if keys.spec.public_key_file.trim().is_empty() {
        errors.push(ValidationError::new(
            "jwt.keys.public_key_file",
            "must not be empty",
        ));
    }
    if !keys.spec.private_key_file.is_empty()
        && keys.spec.private_key_file == keys.spec.public_key_file
    {
        errors.push(ValidationError::new(
            "jwt.keys.public_key_file",
            "must differ from private_key_file",
        ));
    }

    for (i, route) in config.routes.iter().enumerate() {
        let field = format!("routes[{i}].pattern");
        if !route.pattern.starts_with('/') {
            errors.push(ValidationError::new(&field, "must start with '/'"));
        }

        let unnamed = split_path(&route.pattern, config.router.normalize_trailing_slash)
            .map(Segment::parse)
            .any(|segment| matches!(segment, Segment::Param { ref name, .. } if name.is_empty()));
        if unnamed {
            errors.push(ValidationError::new(&field, "parameter names must not be empty"));
        }
    }

    let format = config.observability.log_format.as_str();
    if format != "pretty" && format != "json" {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{format}', expected 'pretty' or 'json'"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
