use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::PricingPolicy;
use crate::services::{Merchant, SimulatedGateway};

const ENV_PREFIX: &str = "ELECTRICALS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading error: {message}")]
    LoadError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub payments: PaymentsConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

/// Merchant identity, pricing rules and catalog housekeeping
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_merchant_name")]
    pub merchant_name: String,
    #[serde(default = "default_merchant_vpa")]
    pub merchant_vpa: String,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
    #[serde(default = "default_shipping_fee")]
    pub shipping_fee: Decimal,
    #[serde(default = "default_free_shipping_threshold")]
    pub free_shipping_threshold: Decimal,
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
    #[serde(default = "default_seed_catalog")]
    pub seed_catalog: bool,
}

/// Behaviour of the simulated payment gateway
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default = "default_upi_success_rate")]
    pub upi_success_rate: f64,
    #[serde(default = "default_card_success_rate")]
    pub card_success_rate: f64,
    #[serde(default = "default_settle_min_delay_ms")]
    pub settle_min_delay_ms: u64,
    #[serde(default = "default_settle_max_delay_ms")]
    pub settle_max_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_service_version")]
    pub service_version: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub enable_json_logging: bool,
}

/// Deserialize one section from `ELECTRICALS_*` environment variables
fn load_section<T: DeserializeOwned>(section: &str) -> Result<T, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::Environment::with_prefix(ENV_PREFIX))
        .build()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to load {} config: {}", section, e),
        })?;

    settings
        .try_deserialize()
        .map_err(|e| ConfigError::LoadError {
            message: format!("Failed to deserialize {} config: {}", section, e),
        })
}

impl Config {
    pub fn from_environment() -> Result<Self, ConfigError> {
        info!("Loading configuration from environment");

        let config = Config {
            server: ServerConfig::from_env()?,
            store: StoreConfig::from_env()?,
            payments: PaymentsConfig::from_env()?,
            observability: ObservabilityConfig::from_env()?,
        };

        config.validate()?;

        info!("Configuration loaded successfully");
        debug!("Configuration: {:?}", config);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("Server port cannot be 0"));
        }
        if self.server.request_timeout_seconds == 0 {
            return Err(invalid("Request timeout cannot be 0"));
        }
        if self.store.merchant_vpa.trim().is_empty() {
            return Err(invalid("Merchant VPA cannot be empty"));
        }
        if self.store.tax_rate < Decimal::ZERO || self.store.tax_rate > Decimal::ONE {
            return Err(invalid("Tax rate must be between 0 and 1"));
        }
        if self.store.shipping_fee < Decimal::ZERO {
            return Err(invalid("Shipping fee cannot be negative"));
        }
        for (name, rate) in [
            ("UPI success rate", self.payments.upi_success_rate),
            ("Card success rate", self.payments.card_success_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::ValidationError {
                    message: format!("{} must be between 0 and 1", name),
                });
            }
        }
        if self.payments.settle_min_delay_ms > self.payments.settle_max_delay_ms {
            return Err(invalid("Settlement min delay cannot exceed max delay"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError {
        message: message.to_string(),
    }
}

impl ServerConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        load_section("server")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StoreConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        load_section("store")
    }

    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            tax_rate: self.tax_rate,
            shipping_fee: self.shipping_fee,
            free_shipping_threshold: self.free_shipping_threshold,
        }
    }

    pub fn merchant(&self) -> Merchant {
        Merchant {
            name: self.merchant_name.clone(),
            vpa: self.merchant_vpa.clone(),
        }
    }
}

impl PaymentsConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        load_section("payments")
    }

    pub fn gateway(&self) -> SimulatedGateway {
        SimulatedGateway {
            upi_success_rate: self.upi_success_rate,
            card_success_rate: self.card_success_rate,
            min_delay: Duration::from_millis(self.settle_min_delay_ms),
            max_delay: Duration::from_millis(self.settle_max_delay_ms),
        }
    }
}

impl ObservabilityConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        load_section("observability")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_timeout(),
            max_request_size: default_max_request_size(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            merchant_name: default_merchant_name(),
            merchant_vpa: default_merchant_vpa(),
            tax_rate: default_tax_rate(),
            shipping_fee: default_shipping_fee(),
            free_shipping_threshold: default_free_shipping_threshold(),
            low_stock_threshold: default_low_stock_threshold(),
            seed_catalog: default_seed_catalog(),
        }
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            upi_success_rate: default_upi_success_rate(),
            card_success_rate: default_card_success_rate(),
            settle_min_delay_ms: default_settle_min_delay_ms(),
            settle_max_delay_ms: default_settle_max_delay_ms(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_version: default_service_version(),
            otlp_endpoint: None,
            log_level: default_log_level(),
            enable_json_logging: false,
        }
    }
}

// Default value functions
pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    8080
}

pub(crate) fn default_timeout() -> u64 {
    30
}

pub(crate) fn default_max_request_size() -> usize {
    1024 * 1024 // 1MB
}

pub(crate) fn default_merchant_name() -> String {
    "Electricals Madurai".to_string()
}

pub(crate) fn default_merchant_vpa() -> String {
    "electricals@okaxis".to_string()
}

pub(crate) fn default_tax_rate() -> Decimal {
    Decimal::new(18, 2)
}

pub(crate) fn default_shipping_fee() -> Decimal {
    Decimal::new(50, 0)
}

pub(crate) fn default_free_shipping_threshold() -> Decimal {
    Decimal::new(999, 0)
}

pub(crate) fn default_low_stock_threshold() -> u32 {
    10
}

pub(crate) fn default_seed_catalog() -> bool {
    true
}

pub(crate) fn default_upi_success_rate() -> f64 {
    0.9
}

pub(crate) fn default_card_success_rate() -> f64 {
    0.95
}

pub(crate) fn default_settle_min_delay_ms() -> u64 {
    2000
}

pub(crate) fn default_settle_max_delay_ms() -> u64 {
    5000
}

pub(crate) fn default_service_name() -> String {
    "electricals-store".to_string()
}

pub(crate) fn default_service_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests;
