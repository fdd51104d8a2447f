use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn, Instrument};

use super::storage_span;
use crate::models::{Order, RepositoryError, RepositoryResult};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: Order) -> RepositoryResult<Order>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Order>>;

    /// Orders placed by one user, newest first
    async fn find_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Order>>;

    /// Every order, newest first
    async fn find_all(&self) -> RepositoryResult<Vec<Order>>;

    async fn update(&self, order: Order) -> RepositoryResult<Order>;
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    orders
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    #[instrument(skip(self, order), fields(order_id = %order.id, user_id = %order.user_id))]
    async fn create(&self, order: Order) -> RepositoryResult<Order> {
        let mut orders = self
            .orders
            .write()
            .instrument(storage_span("orders", "put"))
            .await;

        if orders.contains_key(&order.id) {
            warn!("Order already exists");
            return Err(RepositoryError::AlreadyExists {
                id: order.id.clone(),
            });
        }

        orders.insert(order.id.clone(), order.clone());
        info!("Order stored");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Order>> {
        let order = async { self.orders.read().await.get(id).cloned() }
            .instrument(storage_span("orders", "get"))
            .await;
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: &str) -> RepositoryResult<Vec<Order>> {
        let orders: Vec<Order> = async {
            self.orders
                .read()
                .await
                .values()
                .filter(|order| order.user_id == user_id)
                .cloned()
                .collect()
        }
        .instrument(storage_span("orders", "query"))
        .await;
        Ok(newest_first(orders))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Order>> {
        let orders: Vec<Order> = async { self.orders.read().await.values().cloned().collect() }
            .instrument(storage_span("orders", "scan"))
            .await;
        Ok(newest_first(orders))
    }

    #[instrument(skip(self, order), fields(order_id = %order.id, status = %order.status))]
    async fn update(&self, order: Order) -> RepositoryResult<Order> {
        let mut orders = self
            .orders
            .write()
            .instrument(storage_span("orders", "put"))
            .await;

        match orders.get_mut(&order.id) {
            Some(existing) => {
                *existing = order.clone();
                info!("Order updated");
                Ok(order)
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}
