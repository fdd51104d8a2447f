pub mod admin;
pub mod api;
pub mod bookings;
pub mod cart;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod orders;
pub mod payments;

pub use admin::{create_admin_router, create_sample_products, AdminState};
pub use api::create_product_router;
pub use bookings::create_booking_router;
pub use cart::create_cart_router;
pub use errors::{service_error_to_response, ApiError, ApiResult};
pub use health::health_check;
pub use metrics::metrics_handler;
pub use middleware::{request_validation_middleware, security_headers_middleware, RequestLimits};
pub use orders::create_order_router;
pub use payments::create_payment_router;
