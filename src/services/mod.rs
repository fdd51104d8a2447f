// Services module - business logic layer

pub mod analytics_service;
pub mod booking_service;
pub mod cart_service;
pub mod order_service;
pub mod payment_service;
pub mod product_service;

#[cfg(test)]
mod mocks;

pub use analytics_service::AnalyticsService;
pub use booking_service::BookingService;
pub use cart_service::CartService;
pub use order_service::OrderService;
pub use payment_service::{Merchant, PaymentGateway, PaymentService, Settlement, SimulatedGateway};
pub use product_service::ProductService;
