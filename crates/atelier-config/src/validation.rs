//! Configuration validation module.
//!
//! Collects every problem in one pass so a bad deployment fails fast with
//! the full list.

use crate::AppConfig;
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// A required value is empty.
    Missing { name: String },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String },
    /// Argon2 parameters are outside the supported range.
    InvalidHashCost { value: u32, minimum: u32 },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
    /// At least one image must be generated per request.
    InvalidImageCount,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { name } => write!(f, "{name} is required"),
            Self::InvalidUrl { url_type, message } => write!(f, "Invalid {url_type} URL: {message}"),
            Self::NonPositiveTimeout { name } => write!(f, "Timeout '{name}' must be positive"),
            Self::InvalidHashCost { value, minimum } => {
                write!(f, "Invalid password hash memory cost: {value} KiB (minimum {minimum})")
            }
            Self::InvalidLogLevel { value } => write!(
                f,
                "Invalid log level: '{value}' (valid: trace, debug, info, warn, error)"
            ),
            Self::InvalidImageCount => write!(f, "providers.image_count must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Minimum Argon2 memory cost in KiB.
    const MIN_HASH_MEMORY_KIB: u32 = 8;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_database(&config.database, &mut errors);
        Self::validate_security(&config.security, &mut errors);
        Self::validate_providers(&config.providers, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_database(config: &crate::DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.url.is_empty() {
            errors.push(ConfigValidationError::Missing {
                name: "database.url".to_string(),
            });
        } else if !config.url.starts_with("mongodb://") && !config.url.starts_with("mongodb+srv://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with mongodb:// or mongodb+srv://".to_string(),
            });
        }

        if config.name.is_empty() {
            errors.push(ConfigValidationError::Missing {
                name: "database.name".to_string(),
            });
        }

        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
            });
        }
    }

    fn validate_security(config: &crate::SecurityConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.password_hash_memory_kib < Self::MIN_HASH_MEMORY_KIB {
            errors.push(ConfigValidationError::InvalidHashCost {
                value: config.password_hash_memory_kib,
                minimum: Self::MIN_HASH_MEMORY_KIB,
            });
        }
        if config.verification_ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "security.verification_ttl_secs".to_string(),
            });
        }
    }

    fn validate_providers(config: &crate::ProvidersConfig, errors: &mut Vec<ConfigValidationError>) {
        if let Err(e) = Url::parse(&config.image_api_url) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "image_api".to_string(),
                message: e.to_string(),
            });
        }
        if config.image_count == 0 {
            errors.push(ConfigValidationError::InvalidImageCount);
        }
        if config.email_sender.is_empty() {
            errors.push(ConfigValidationError::Missing {
                name: "providers.email_sender".to_string(),
            });
        }
    }

    fn validate_observability(config: &crate::ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
    }
}

/// Formats validation errors for display.
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}
