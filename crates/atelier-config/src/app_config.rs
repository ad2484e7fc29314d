//! Application configuration structures.

use atelier_core::telemetry::{LogFormat, TelemetryConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Document database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Password hashing and verification codes.
    #[serde(default)]
    pub security: SecurityConfig,

    /// External image and email providers.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Application name, also used as the product name in emails.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "Generic".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

impl AppMetadata {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL of the document database.
    pub url: String,
    /// Database name.
    pub name: String,
    /// CA bundle for TLS connections.
    pub tls_ca_file: Option<String>,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            name: "generic".to_string(),
            tls_ca_file: None,
            connect_timeout_secs: 30,
        }
    }
}

impl DatabaseConfig {
    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Security configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB.
    pub password_hash_memory_kib: u32,
    /// Argon2 iterations.
    pub password_hash_iterations: u32,
    /// Minimum delay between two verification emails, in seconds.
    pub verification_resend_secs: u64,
    /// Lifetime of a verification code, in seconds.
    pub verification_ttl_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            password_hash_memory_kib: 19_456,
            password_hash_iterations: 2,
            verification_resend_secs: 60,
            verification_ttl_secs: 86_400,
        }
    }
}

impl SecurityConfig {
    /// Returns the resend interval as a Duration.
    #[must_use]
    pub const fn verification_resend_interval(&self) -> Duration {
        Duration::from_secs(self.verification_resend_secs)
    }

    /// Returns the code lifetime as a Duration.
    #[must_use]
    pub const fn verification_ttl(&self) -> Duration {
        Duration::from_secs(self.verification_ttl_secs)
    }
}

/// External provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Base URL of the image generation API.
    pub image_api_url: String,
    /// API key for the image generation API.
    pub image_api_key: Option<String>,
    /// Number of images generated per request when the caller gives none.
    pub image_count: usize,
    /// Sender address of outgoing emails.
    pub email_sender: String,
    /// Region of the email provider.
    pub email_region: String,
}

/// Sender address shipped in the defaults.
pub const DEFAULT_EMAIL_SENDER: &str = "no-reply@example.com";

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            image_api_url: "https://api.openai.com/v1".to_string(),
            image_api_key: None,
            image_count: 3,
            email_sender: DEFAULT_EMAIL_SENDER.to_string(),
            email_region: "us-east-1".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl ObservabilityConfig {
    /// Telemetry settings derived from this section.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            filter: format!("{},atelier=debug", self.log_level.to_lowercase()),
            format: self.log_format,
            ..TelemetryConfig::default()
        }
    }
}
