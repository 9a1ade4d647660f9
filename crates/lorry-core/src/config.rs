//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub booking: BookingConfig,
    pub mail: MailConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Authentication configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,

    /// JWT token expiration in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_secs: i64,
}

fn default_jwt_expiration() -> i64 {
    1800 // 30 minutes
}

/// Booking-specific configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    /// Status assigned to newly created bookings
    #[serde(default = "default_status")]
    pub default_status: String,

    /// Maximum LR allocation attempts before the conflict is surfaced
    #[serde(default = "default_allocation_retries")]
    pub lr_allocation_retries: u32,

    /// Upper bound for list page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: i64,
}

fn default_status() -> String {
    "in-transit".to_string()
}

fn default_allocation_retries() -> u32 {
    5
}

fn default_max_page_size() -> i64 {
    100
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_status: default_status(),
            lr_allocation_retries: default_allocation_retries(),
            max_page_size: default_max_page_size(),
        }
    }
}

/// Outbound mail configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// Sender address for system mail
    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Inbox that receives contact-form queries
    #[serde(default = "default_operator_inbox")]
    pub operator_inbox: String,
}

fn default_from_address() -> String {
    "no-reply@lorryline.example".to_string()
}

fn default_operator_inbox() -> String {
    "info@lorryline.example".to_string()
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_address: default_from_address(),
            operator_inbox: default_operator_inbox(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.max_connections", 10)?
            .set_default("auth.jwt_expiration_secs", 1800)?
            .set_default("booking.default_status", "in-transit")?
            .set_default("booking.lr_allocation_retries", 5)?
            .set_default("booking.max_page_size", 100)?
            .set_default("mail.from_address", default_from_address())?
            .set_default("mail.operator_inbox", default_operator_inbox())?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with LORRY_ prefix
            .add_source(
                Environment::with_prefix("LORRY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_booking_config() {
        let config = BookingConfig::default();
        assert_eq!(config.default_status, "in-transit");
        assert_eq!(config.lr_allocation_retries, 5);
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn test_default_mail_config() {
        let config = MailConfig::default();
        assert!(!config.from_address.is_empty());
        assert!(!config.operator_inbox.is_empty());
    }
}
