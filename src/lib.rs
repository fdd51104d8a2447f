pub mod app;
pub mod config;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod services;

pub use app::{create_app, AppServices};
pub use config::{Config, ConfigError};
pub use observability::{init_observability, shutdown_observability, Metrics};
