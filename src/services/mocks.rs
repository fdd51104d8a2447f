//! mockall doubles of the repository traits, shared by the service tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::mock;

use crate::models::{
    Cart, Order, Payment, PaymentStatus, Product, ProductFilters, RepositoryError, ServiceBooking,
};
use crate::repositories::{
    BookingRepository, CartRepository, OrderRepository, PaymentRepository, ProductRepository,
};
use crate::services::{PaymentGateway, Settlement};

mock! {
    pub TestProductRepository {}

    #[async_trait]
    impl ProductRepository for TestProductRepository {
        async fn find_all(&self, filters: ProductFilters) -> Result<Vec<Product>, RepositoryError>;
        async fn find_by_id(&self, id: &str) -> Result<Option<Product>, RepositoryError>;
        async fn create(&self, product: Product) -> Result<Product, RepositoryError>;
        async fn update(&self, product: Product) -> Result<Product, RepositoryError>;
        async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
        async fn count(&self) -> Result<usize, RepositoryError>;
        async fn reserve_stock(&self, lines: &[(String, u32)]) -> Result<Vec<Product>, RepositoryError>;
        async fn replace_all(&self, products: Vec<Product>) -> Result<usize, RepositoryError>;
    }
}

mock! {
    pub TestCartRepository {}

    #[async_trait]
    impl CartRepository for TestCartRepository {
        async fn find_cart(&self, user_id: &str) -> Result<Option<Cart>, RepositoryError>;
        async fn save_cart(&self, cart: Cart) -> Result<Cart, RepositoryError>;
        async fn delete_cart(&self, user_id: &str) -> Result<(), RepositoryError>;
        async fn cart_exists(&self, user_id: &str) -> Result<bool, RepositoryError>;
        async fn count_carts(&self) -> Result<usize, RepositoryError>;
    }
}

mock! {
    pub TestOrderRepository {}

    #[async_trait]
    impl OrderRepository for TestOrderRepository {
        async fn create(&self, order: Order) -> Result<Order, RepositoryError>;
        async fn find_by_id(&self, id: &str) -> Result<Option<Order>, RepositoryError>;
        async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>, RepositoryError>;
        async fn find_all(&self) -> Result<Vec<Order>, RepositoryError>;
        async fn update(&self, order: Order) -> Result<Order, RepositoryError>;
    }
}

mock! {
    pub TestBookingRepository {}

    #[async_trait]
    impl BookingRepository for TestBookingRepository {
        async fn create(&self, booking: ServiceBooking) -> Result<ServiceBooking, RepositoryError>;
        async fn find_by_id(&self, id: &str) -> Result<Option<ServiceBooking>, RepositoryError>;
        async fn find_by_user(&self, user_id: &str) -> Result<Vec<ServiceBooking>, RepositoryError>;
        async fn find_all(&self) -> Result<Vec<ServiceBooking>, RepositoryError>;
        async fn update(&self, booking: ServiceBooking) -> Result<ServiceBooking, RepositoryError>;
    }
}

mock! {
    pub TestPaymentRepository {}

    #[async_trait]
    impl PaymentRepository for TestPaymentRepository {
        async fn create(&self, payment: Payment) -> Result<Payment, RepositoryError>;
        async fn find_by_id(&self, id: &str) -> Result<Option<Payment>, RepositoryError>;
        async fn find_created_between(
            &self,
            from: Option<DateTime<Utc>>,
            to: Option<DateTime<Utc>>,
        ) -> Result<Vec<Payment>, RepositoryError>;
        async fn transition(
            &self,
            id: &str,
            next: PaymentStatus,
            failure_reason: Option<String>,
        ) -> Result<Option<Payment>, RepositoryError>;
    }
}

mock! {
    pub TestPaymentGateway {}

    #[async_trait]
    impl PaymentGateway for TestPaymentGateway {
        async fn settle(&self, payment: &Payment) -> Settlement;
    }
}
