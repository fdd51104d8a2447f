// Repositories module - data access layer backed by process memory

pub mod booking_repository;
pub mod cart_repository;
pub mod order_repository;
pub mod payment_repository;
pub mod product_repository;


pub use booking_repository::{BookingRepository, InMemoryBookingRepository};
pub use cart_repository::{CartRepository, InMemoryCartRepository};
pub use order_repository::{InMemoryOrderRepository, OrderRepository};
pub use payment_repository::{InMemoryPaymentRepository, PaymentRepository};
pub use product_repository::{InMemoryProductRepository, ProductRepository};

/// Span wrapping a single storage call, tagged like a database client span
pub(crate) fn storage_span(collection: &'static str, operation: &'static str) -> tracing::Span {
    tracing::debug_span!(
        "storage",
        "db.system" = "memory",
        "db.collection" = collection,
        "db.operation" = operation,
        "otel.kind" = "client",
        "otel.name" = format!("memory.{}.{}", collection, operation),
    )
}
