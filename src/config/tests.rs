#[cfg(test)]
mod config_tests {
    use crate::config::{
        default_free_shipping_threshold, default_host, default_log_level,
        default_max_request_size, default_merchant_vpa, default_port, default_service_name,
        default_settle_max_delay_ms, default_settle_min_delay_ms, default_tax_rate,
        default_timeout, Config, ConfigError, PaymentsConfig, ServerConfig, StoreConfig,
    };
    use rust_decimal_macros::dec;
    use std::env;
    use std::time::Duration;

    #[test]
    fn test_store_config_from_env() {
        env::set_var("ELECTRICALS_MERCHANT_NAME", "Test Electricals");
        env::set_var("ELECTRICALS_LOW_STOCK_THRESHOLD", "5");
        env::set_var("ELECTRICALS_SEED_CATALOG", "false");

        let config = StoreConfig::from_env().unwrap();

        assert_eq!(config.merchant_name, "Test Electricals");
        assert_eq!(config.low_stock_threshold, 5);
        assert!(!config.seed_catalog);
        assert_eq!(config.merchant_vpa, default_merchant_vpa());

        // Clean up
        env::remove_var("ELECTRICALS_MERCHANT_NAME");
        env::remove_var("ELECTRICALS_LOW_STOCK_THRESHOLD");
        env::remove_var("ELECTRICALS_SEED_CATALOG");
    }

    #[test]
    fn test_payments_config_from_env() {
        env::set_var("ELECTRICALS_UPI_SUCCESS_RATE", "0.5");
        env::set_var("ELECTRICALS_SETTLE_MAX_DELAY_MS", "100");

        let config = PaymentsConfig::from_env().unwrap();

        assert_eq!(config.upi_success_rate, 0.5);
        assert_eq!(config.settle_max_delay_ms, 100);

        let gateway = config.gateway();
        assert_eq!(gateway.max_delay, Duration::from_millis(100));

        env::remove_var("ELECTRICALS_UPI_SUCCESS_RATE");
        env::remove_var("ELECTRICALS_SETTLE_MAX_DELAY_MS");
    }

    #[test]
    fn test_server_config_request_timeout() {
        let config = ServerConfig {
            host: "localhost".to_string(),
            port: 8080,
            request_timeout_seconds: 45,
            max_request_size: 1024,
        };

        assert_eq!(config.request_timeout(), Duration::from_secs(45));
        assert_eq!(config.bind_address(), "localhost:8080");
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let pricing = config.store.pricing_policy();
        assert_eq!(pricing.tax_rate, dec!(0.18));
        assert_eq!(pricing.free_shipping_threshold, dec!(999));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));

        let mut config = Config::default();
        config.payments.card_success_rate = 1.5;
        match config.validate() {
            Err(ConfigError::ValidationError { message }) => {
                assert!(message.contains("Card success rate"))
            }
            _ => panic!("Expected ValidationError"),
        }

        let mut config = Config::default();
        config.store.tax_rate = dec!(1.2);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.payments.settle_min_delay_ms = 10_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::ValidationError {
            message: "Invalid configuration".to_string(),
        };
        assert_eq!(error.to_string(), "Validation error: Invalid configuration");
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_host(), "0.0.0.0");
        assert_eq!(default_port(), 8080);
        assert_eq!(default_timeout(), 30);
        assert_eq!(default_max_request_size(), 1024 * 1024);
        assert_eq!(default_tax_rate(), dec!(0.18));
        assert_eq!(default_free_shipping_threshold(), dec!(999));
        assert_eq!(default_settle_min_delay_ms(), 2000);
        assert_eq!(default_settle_max_delay_ms(), 5000);
        assert_eq!(default_service_name(), "electricals-store");
        assert_eq!(default_log_level(), "info");
    }
}
