use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, instrument, Instrument};

use super::storage_span;
use crate::models::{Cart, RepositoryError, RepositoryResult};

/// Trait defining the interface for cart data access operations
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Find a cart by user ID
    async fn find_cart(&self, user_id: &str) -> RepositoryResult<Option<Cart>>;

    /// Save a cart (create or update)
    async fn save_cart(&self, cart: Cart) -> RepositoryResult<Cart>;

    /// Delete a cart
    async fn delete_cart(&self, user_id: &str) -> RepositoryResult<()>;

    /// Check if a cart exists for a user
    async fn cart_exists(&self, user_id: &str) -> RepositoryResult<bool>;

    /// Count total number of carts
    async fn count_carts(&self) -> RepositoryResult<usize>;
}

#[derive(Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<HashMap<String, Cart>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    #[instrument(skip(self))]
    async fn find_cart(&self, user_id: &str) -> RepositoryResult<Option<Cart>> {
        let cart = async { self.carts.read().await.get(user_id).cloned() }
            .instrument(storage_span("carts", "get"))
            .await;

        match &cart {
            Some(_) => info!("Cart found"),
            None => info!("Cart not found"),
        }
        Ok(cart)
    }

    #[instrument(skip(self, cart), fields(user_id = %cart.user_id, item_count = cart.items.len()))]
    async fn save_cart(&self, cart: Cart) -> RepositoryResult<Cart> {
        async {
            self.carts
                .write()
                .await
                .insert(cart.user_id.clone(), cart.clone())
        }
        .instrument(storage_span("carts", "put"))
        .await;

        info!("Cart saved");
        Ok(cart)
    }

    #[instrument(skip(self))]
    async fn delete_cart(&self, user_id: &str) -> RepositoryResult<()> {
        let removed = async { self.carts.write().await.remove(user_id) }
            .instrument(storage_span("carts", "delete"))
            .await;

        match removed {
            Some(_) => {
                info!("Cart deleted");
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn cart_exists(&self, user_id: &str) -> RepositoryResult<bool> {
        Ok(self.carts.read().await.contains_key(user_id))
    }

    async fn count_carts(&self) -> RepositoryResult<usize> {
        Ok(self.carts.read().await.len())
    }
}
