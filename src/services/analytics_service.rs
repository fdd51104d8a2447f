use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{ProductFilters, ServiceResult, StoreAnalytics};
use crate::repositories::{BookingRepository, OrderRepository, ProductRepository};

/// Admin dashboard figures
pub struct AnalyticsService {
    product_repository: Arc<dyn ProductRepository>,
    order_repository: Arc<dyn OrderRepository>,
    booking_repository: Arc<dyn BookingRepository>,
    low_stock_threshold: u32,
}

impl AnalyticsService {
    pub fn new(
        product_repository: Arc<dyn ProductRepository>,
        order_repository: Arc<dyn OrderRepository>,
        booking_repository: Arc<dyn BookingRepository>,
        low_stock_threshold: u32,
    ) -> Self {
        Self {
            product_repository,
            order_repository,
            booking_repository,
            low_stock_threshold,
        }
    }

    #[instrument(skip(self))]
    pub async fn analytics(&self) -> ServiceResult<StoreAnalytics> {
        let products = self
            .product_repository
            .find_all(ProductFilters::default())
            .await?;
        let orders = self.order_repository.find_all().await?;
        let bookings = self.booking_repository.find_all().await?;

        let analytics = StoreAnalytics::compute(
            &products,
            &orders,
            &bookings,
            self.low_stock_threshold,
            Utc::now(),
        );

        crate::info_with_trace!(
            "Computed analytics over {} orders and {} bookings",
            analytics.total_orders,
            analytics.total_bookings
        );
        Ok(analytics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProductRequest, Product, RepositoryError, ServiceError};
    use crate::services::mocks::{
        MockTestBookingRepository, MockTestOrderRepository, MockTestProductRepository,
    };
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn product(stock: u32) -> Product {
        Product::new(CreateProductRequest {
            name: "Digital Multimeter".to_string(),
            description: "Auto-ranging multimeter with backlight".to_string(),
            price: dec!(1499),
            category: "tools".to_string(),
            images: vec![],
            stock,
            rating: 4.6,
            brand: "Fluke".to_string(),
            specs: BTreeMap::new(),
            featured: true,
        })
    }

    #[tokio::test]
    async fn test_analytics_counts_low_stock() {
        let mut products = MockTestProductRepository::new();
        let mut orders = MockTestOrderRepository::new();
        let mut bookings = MockTestBookingRepository::new();

        products
            .expect_find_all()
            .times(1)
            .returning(|_| Ok(vec![product(3), product(10), product(50)]));
        orders.expect_find_all().times(1).returning(|| Ok(vec![]));
        bookings.expect_find_all().times(1).returning(|| Ok(vec![]));

        let service = AnalyticsService::new(
            Arc::new(products),
            Arc::new(orders),
            Arc::new(bookings),
            10,
        );
        let analytics = service.analytics().await.unwrap();

        assert_eq!(analytics.total_products, 3);
        assert_eq!(analytics.low_stock_products, 1);
        assert_eq!(analytics.total_revenue, dec!(0));
    }

    #[tokio::test]
    async fn test_analytics_propagates_storage_errors() {
        let mut products = MockTestProductRepository::new();
        products.expect_find_all().returning(|_| {
            Err(RepositoryError::ConstraintViolation {
                message: "store unavailable".to_string(),
            })
        });

        let service = AnalyticsService::new(
            Arc::new(products),
            Arc::new(MockTestOrderRepository::new()),
            Arc::new(MockTestBookingRepository::new()),
            10,
        );

        assert!(matches!(
            service.analytics().await,
            Err(ServiceError::Repository { .. })
        ));
    }
}
