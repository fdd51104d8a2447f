use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::models::{
    validate_user_id, AddCartItemRequest, Cart, CartItem, CartItemResponse, CartResponse,
    PricingPolicy, Product, ServiceError, ServiceResult, UpdateCartItemRequest, Validate,
    MAX_CART_QUANTITY,
};
use crate::observability::Metrics;
use crate::repositories::{CartRepository, ProductRepository};

/// Service for managing shopping carts
pub struct CartService {
    cart_repository: Arc<dyn CartRepository>,
    product_repository: Arc<dyn ProductRepository>,
    pricing: PricingPolicy,
    metrics: Option<Arc<Metrics>>,
}

impl CartService {
    pub fn new(
        cart_repository: Arc<dyn CartRepository>,
        product_repository: Arc<dyn ProductRepository>,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            cart_repository,
            product_repository,
            pricing,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record<T>(&self, operation: &str, result: &ServiceResult<T>) {
        if let Some(metrics) = &self.metrics {
            metrics.record_cart_operation(operation, result.is_ok());
        }
    }

    /// Get a user's cart; users without one get an empty cart
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_cart(&self, user_id: &str) -> ServiceResult<CartResponse> {
        info!("Getting cart for user");
        validate_user_id(user_id)?;

        let cart = self.load_or_new(user_id).await?;
        let response = self.cart_to_response(cart).await?;

        info!("Cart retrieved with {} items", response.items.len());
        Ok(response)
    }

    /// Add an item to the cart
    #[instrument(skip(self, request), fields(user_id = %user_id, product_id = %request.product_id, quantity = request.quantity))]
    pub async fn add_item(
        &self,
        user_id: &str,
        request: AddCartItemRequest,
    ) -> ServiceResult<CartResponse> {
        let result = self.add_item_inner(user_id, request).await;
        self.record("add_item", &result);
        result
    }

    async fn add_item_inner(
        &self,
        user_id: &str,
        request: AddCartItemRequest,
    ) -> ServiceResult<CartResponse> {
        info!("Adding item to cart");

        validate_user_id(user_id)?;
        request.validate()?;

        let product = self.find_product(&request.product_id).await?;
        if !product.is_available() {
            return Err(ServiceError::ProductUnavailable {
                product_id: product.id,
            });
        }

        let mut cart = self.load_or_new(user_id).await?;
        let wanted = cart.get_item_quantity(&product.id) + request.quantity;

        if wanted > MAX_CART_QUANTITY {
            return Err(ServiceError::ValidationError {
                message: format!("Quantity cannot exceed {}", MAX_CART_QUANTITY),
            });
        }
        if product.stock < wanted {
            return Err(ServiceError::InsufficientStock {
                product_id: product.id,
                requested: wanted,
                available: product.stock,
            });
        }

        cart.add_item(product.id.clone(), request.quantity, product.price);
        let cart = self.cart_repository.save_cart(cart).await?;

        info!("Item added to cart successfully");
        self.cart_to_response(cart).await
    }

    /// Set the quantity of a line; zero removes it
    #[instrument(skip(self, request), fields(user_id = %user_id, product_id = %product_id, quantity = request.quantity))]
    pub async fn update_item(
        &self,
        user_id: &str,
        product_id: &str,
        request: UpdateCartItemRequest,
    ) -> ServiceResult<CartResponse> {
        let result = self.update_item_inner(user_id, product_id, request).await;
        self.record("update_item", &result);
        result
    }

    async fn update_item_inner(
        &self,
        user_id: &str,
        product_id: &str,
        request: UpdateCartItemRequest,
    ) -> ServiceResult<CartResponse> {
        info!("Updating cart item quantity");

        validate_user_id(user_id)?;
        request.validate()?;

        let mut cart = self.load_existing(user_id).await?;
        if !cart.contains_item(product_id) {
            return Err(ServiceError::CartItemNotFound {
                product_id: product_id.to_string(),
                user_id: user_id.to_string(),
            });
        }

        if request.quantity > 0 {
            let product = self.find_product(product_id).await?;
            if product.stock < request.quantity {
                return Err(ServiceError::InsufficientStock {
                    product_id: product.id,
                    requested: request.quantity,
                    available: product.stock,
                });
            }
        }

        cart.update_item_quantity(product_id, request.quantity);
        let cart = self.cart_repository.save_cart(cart).await?;

        info!("Cart item updated successfully");
        self.cart_to_response(cart).await
    }

    /// Remove an item from the cart
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_item(&self, user_id: &str, product_id: &str) -> ServiceResult<CartResponse> {
        info!("Removing item from cart");
        validate_user_id(user_id)?;

        let mut cart = self.load_existing(user_id).await?;
        if !cart.remove_item(product_id) {
            return Err(ServiceError::CartItemNotFound {
                product_id: product_id.to_string(),
                user_id: user_id.to_string(),
            });
        }

        let cart = self.cart_repository.save_cart(cart).await?;
        self.record::<()>("remove_item", &Ok(()));

        info!("Item removed from cart successfully");
        self.cart_to_response(cart).await
    }

    /// Clear all items from the cart
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn clear_cart(&self, user_id: &str) -> ServiceResult<()> {
        info!("Clearing cart");
        validate_user_id(user_id)?;

        let mut cart = match self.cart_repository.find_cart(user_id).await? {
            Some(cart) => cart,
            None => {
                info!("Cart not found, nothing to clear");
                return Ok(());
            }
        };

        cart.clear();
        self.cart_repository.save_cart(cart).await?;

        info!("Cart cleared successfully");
        Ok(())
    }

    /// Delete the entire cart
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_cart(&self, user_id: &str) -> ServiceResult<()> {
        info!("Deleting cart");
        validate_user_id(user_id)?;

        if !self.cart_repository.cart_exists(user_id).await? {
            return Err(ServiceError::CartNotFound {
                user_id: user_id.to_string(),
            });
        }

        self.cart_repository.delete_cart(user_id).await?;

        info!("Cart deleted successfully");
        Ok(())
    }

    /// Human-readable problems that would block checkout
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn validate_cart(&self, user_id: &str) -> ServiceResult<Vec<String>> {
        info!("Validating cart contents");

        let cart = match self.cart_repository.find_cart(user_id).await? {
            Some(cart) => cart,
            None => return Ok(vec![]),
        };

        let mut issues = Vec::new();
        for item in &cart.items {
            match self.product_repository.find_by_id(&item.product_id).await? {
                Some(product) if !product.is_available() => {
                    issues.push(format!("{} is out of stock", product.name));
                }
                Some(product) if product.stock < item.quantity => {
                    issues.push(format!(
                        "Insufficient stock for {}: requested {}, available {}",
                        product.name, item.quantity, product.stock
                    ));
                }
                Some(_) => {}
                None => {
                    issues.push(format!("Product {} no longer exists", item.product_id));
                }
            }
        }

        info!("Cart validation found {} issues", issues.len());
        Ok(issues)
    }

    /// Raw cart for checkout; errors when the user has no cart
    pub(crate) async fn load_existing(&self, user_id: &str) -> ServiceResult<Cart> {
        self.cart_repository
            .find_cart(user_id)
            .await?
            .ok_or_else(|| ServiceError::CartNotFound {
                user_id: user_id.to_string(),
            })
    }

    pub(crate) async fn save(&self, cart: Cart) -> ServiceResult<Cart> {
        Ok(self.cart_repository.save_cart(cart).await?)
    }

    pub fn pricing(&self) -> PricingPolicy {
        self.pricing
    }

    async fn load_or_new(&self, user_id: &str) -> ServiceResult<Cart> {
        Ok(match self.cart_repository.find_cart(user_id).await? {
            Some(cart) => cart,
            None => {
                info!("Cart not found, starting an empty cart");
                Cart::new(user_id.to_string())
            }
        })
    }

    async fn find_product(&self, product_id: &str) -> ServiceResult<Product> {
        self.product_repository
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::ProductNotFound {
                id: product_id.to_string(),
            })
    }

    /// Convert Cart to CartResponse with product details and pricing
    async fn cart_to_response(&self, cart: Cart) -> ServiceResult<CartResponse> {
        let mut items = Vec::with_capacity(cart.items.len());

        for cart_item in &cart.items {
            let product = self.product_repository.find_by_id(&cart_item.product_id).await?;
            if product.is_none() {
                warn!("Product not found for cart item: {}", cart_item.product_id);
            }
            items.push(item_response(cart_item, product.as_ref()));
        }

        Ok(CartResponse {
            user_id: cart.user_id.clone(),
            items,
            total_items: cart.total_items(),
            pricing: self.pricing.quote(cart.subtotal()),
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        })
    }
}

fn item_response(cart_item: &CartItem, product: Option<&Product>) -> CartItemResponse {
    CartItemResponse {
        product_id: cart_item.product_id.clone(),
        name: product
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Product not found".to_string()),
        image: product.map(Product::primary_image).unwrap_or_default(),
        quantity: cart_item.quantity,
        unit_price: cart_item.unit_price,
        total_price: cart_item.total_price(),
        is_available: product.map_or(false, |p| p.stock >= cart_item.quantity),
        added_at: cart_item.added_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateProductRequest;
    use crate::services::mocks::{MockTestCartRepository, MockTestProductRepository};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn pricing() -> PricingPolicy {
        PricingPolicy {
            tax_rate: dec!(0.18),
            shipping_fee: dec!(50),
            free_shipping_threshold: dec!(999),
        }
    }

    fn create_test_product() -> Product {
        let mut product = Product::new(CreateProductRequest {
            name: "MCB Circuit Breaker".to_string(),
            description: "Single pole miniature circuit breaker".to_string(),
            price: dec!(450),
            category: "breakers".to_string(),
            images: vec!["mcb.jpg".to_string()],
            stock: 10,
            rating: 4.7,
            brand: "Schneider Electric".to_string(),
            specs: BTreeMap::new(),
            featured: false,
        });
        product.id = "P001".to_string();
        product
    }

    fn create_test_cart() -> Cart {
        let mut cart = Cart::new("user123".to_string());
        cart.add_item("P001".to_string(), 2, dec!(450));
        cart
    }

    #[tokio::test]
    async fn test_get_cart_existing() {
        let mut mock_cart_repo = MockTestCartRepository::new();
        let mut mock_product_repo = MockTestProductRepository::new();
        let test_cart = create_test_cart();
        let test_product = create_test_product();

        mock_cart_repo
            .expect_find_cart()
            .with(mockall::predicate::eq("user123".to_string()))
            .times(1)
            .returning(move |_| Ok(Some(test_cart.clone())));

        mock_product_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq("P001".to_string()))
            .times(1)
            .returning(move |_| Ok(Some(test_product.clone())));

        let service = CartService::new(
            Arc::new(mock_cart_repo),
            Arc::new(mock_product_repo),
            pricing(),
        );

        let cart_response = service.get_cart("user123").await.unwrap();
        assert_eq!(cart_response.items.len(), 1);
        assert_eq!(cart_response.total_items, 2);
        assert_eq!(cart_response.items[0].image, "mcb.jpg");
        assert_eq!(cart_response.pricing.subtotal, dec!(900));
        assert_eq!(cart_response.pricing.tax, dec!(162.00));
        assert_eq!(cart_response.pricing.shipping, dec!(50));
        assert_eq!(cart_response.pricing.total, dec!(1112.00));
    }

    #[tokio::test]
    async fn test_get_cart_not_found_returns_empty() {
        let mut mock_cart_repo = MockTestCartRepository::new();
        mock_cart_repo.expect_find_cart().times(1).returning(|_| Ok(None));

        let service = CartService::new(
            Arc::new(mock_cart_repo),
            Arc::new(MockTestProductRepository::new()),
            pricing(),
        );

        let cart_response = service.get_cart("user123").await.unwrap();
        assert!(cart_response.items.is_empty());
        assert_eq!(cart_response.pricing.total, dec!(0));
    }

    #[tokio::test]
    async fn test_add_item_success() {
        let mut mock_cart_repo = MockTestCartRepository::new();
        let mut mock_product_repo = MockTestProductRepository::new();
        let test_product = create_test_product();

        mock_cart_repo.expect_find_cart().times(1).returning(|_| Ok(None));
        mock_cart_repo
            .expect_save_cart()
            .times(1)
            .returning(|cart| Ok(cart));
        mock_product_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq("P001".to_string()))
            .returning(move |_| Ok(Some(test_product.clone())));

        let service = CartService::new(
            Arc::new(mock_cart_repo),
            Arc::new(mock_product_repo),
            pricing(),
        );

        let request = AddCartItemRequest {
            product_id: "P001".to_string(),
            quantity: 3,
        };
        let cart = service.add_item("user123", request).await.unwrap();

        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.items[0].unit_price, dec!(450));
        assert!(cart.items[0].is_available);
        assert_eq!(cart.pricing.shipping, dec!(0));
    }

    #[tokio::test]
    async fn test_add_item_product_not_found() {
        let mut mock_product_repo = MockTestProductRepository::new();
        mock_product_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq("P999".to_string()))
            .times(1)
            .returning(|_| Ok(None));

        let service = CartService::new(
            Arc::new(MockTestCartRepository::new()),
            Arc::new(mock_product_repo),
            pricing(),
        );

        let request = AddCartItemRequest {
            product_id: "P999".to_string(),
            quantity: 1,
        };

        match service.add_item("user123", request).await {
            Err(ServiceError::ProductNotFound { id }) => assert_eq!(id, "P999"),
            _ => panic!("Expected ProductNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_add_item_counts_existing_quantity_against_stock() {
        let mut mock_cart_repo = MockTestCartRepository::new();
        let mut mock_product_repo = MockTestProductRepository::new();
        let test_cart = create_test_cart();
        let test_product = create_test_product();

        mock_cart_repo
            .expect_find_cart()
            .returning(move |_| Ok(Some(test_cart.clone())));
        mock_cart_repo.expect_save_cart().never();
        mock_product_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(test_product.clone())));

        let service = CartService::new(
            Arc::new(mock_cart_repo),
            Arc::new(mock_product_repo),
            pricing(),
        );

        let request = AddCartItemRequest {
            product_id: "P001".to_string(),
            quantity: 9,
        };

        match service.add_item("user123", request).await {
            Err(ServiceError::InsufficientStock {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, 11);
                assert_eq!(available, 10);
            }
            _ => panic!("Expected InsufficientStock error"),
        }
    }

    #[tokio::test]
    async fn test_add_item_out_of_stock() {
        let mut mock_product_repo = MockTestProductRepository::new();
        let mut test_product = create_test_product();
        test_product.stock = 0;
        mock_product_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(test_product.clone())));

        let service = CartService::new(
            Arc::new(MockTestCartRepository::new()),
            Arc::new(mock_product_repo),
            pricing(),
        );

        let request = AddCartItemRequest {
            product_id: "P001".to_string(),
            quantity: 1,
        };
        assert!(matches!(
            service.add_item("user123", request).await,
            Err(ServiceError::ProductUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_add_item_rejects_zero_quantity() {
        let service = CartService::new(
            Arc::new(MockTestCartRepository::new()),
            Arc::new(MockTestProductRepository::new()),
            pricing(),
        );

        let request = AddCartItemRequest {
            product_id: "P001".to_string(),
            quantity: 0,
        };
        assert!(matches!(
            service.add_item("user123", request).await,
            Err(ServiceError::ValidationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_item_to_zero_removes_line() {
        let mut mock_cart_repo = MockTestCartRepository::new();
        let test_cart = create_test_cart();

        mock_cart_repo
            .expect_find_cart()
            .times(1)
            .returning(move |_| Ok(Some(test_cart.clone())));
        mock_cart_repo
            .expect_save_cart()
            .times(1)
            .returning(|cart| Ok(cart));

        let service = CartService::new(
            Arc::new(mock_cart_repo),
            Arc::new(MockTestProductRepository::new()),
            pricing(),
        );

        let cart = service
            .update_item("user123", "P001", UpdateCartItemRequest { quantity: 0 })
            .await
            .unwrap();
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn test_remove_missing_item() {
        let mut mock_cart_repo = MockTestCartRepository::new();
        mock_cart_repo
            .expect_find_cart()
            .returning(|_| Ok(Some(Cart::new("user123".to_string()))));

        let service = CartService::new(
            Arc::new(mock_cart_repo),
            Arc::new(MockTestProductRepository::new()),
            pricing(),
        );

        assert!(matches!(
            service.remove_item("user123", "P001").await,
            Err(ServiceError::CartItemNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_cart_not_found() {
        let mut mock_cart_repo = MockTestCartRepository::new();
        mock_cart_repo
            .expect_cart_exists()
            .with(mockall::predicate::eq("user123".to_string()))
            .returning(|_| Ok(false));
        mock_cart_repo.expect_delete_cart().never();

        let service = CartService::new(
            Arc::new(mock_cart_repo),
            Arc::new(MockTestProductRepository::new()),
            pricing(),
        );

        assert!(matches!(
            service.delete_cart("user123").await,
            Err(ServiceError::CartNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_validate_cart_with_issues() {
        let mut mock_cart_repo = MockTestCartRepository::new();
        let mut mock_product_repo = MockTestProductRepository::new();
        let mut test_cart = create_test_cart();
        test_cart.add_item("P404".to_string(), 1, dec!(10));
        let mut test_product = create_test_product();
        test_product.stock = 1;

        mock_cart_repo
            .expect_find_cart()
            .returning(move |_| Ok(Some(test_cart.clone())));
        mock_product_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq("P001".to_string()))
            .returning(move |_| Ok(Some(test_product.clone())));
        mock_product_repo
            .expect_find_by_id()
            .with(mockall::predicate::eq("P404".to_string()))
            .returning(|_| Ok(None));

        let service = CartService::new(
            Arc::new(mock_cart_repo),
            Arc::new(mock_product_repo),
            pricing(),
        );

        let issues = service.validate_cart("user123").await.unwrap();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("Insufficient stock"));
        assert!(issues[1].contains("P404"));
    }
}
