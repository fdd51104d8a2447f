use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    validate_user_id, CheckoutRequest, CreateOrderRequest, Order, OrderItem, OrderStatus,
    PaymentStatus, PricingPolicy, RepositoryError, ServiceError, ServiceResult, Validate,
};
use crate::observability::Metrics;
use crate::repositories::{CartRepository, OrderRepository, ProductRepository};

/// Checkout and order lifecycle
pub struct OrderService {
    order_repository: Arc<dyn OrderRepository>,
    product_repository: Arc<dyn ProductRepository>,
    cart_repository: Arc<dyn CartRepository>,
    pricing: PricingPolicy,
    metrics: Option<Arc<Metrics>>,
}

impl OrderService {
    pub fn new(
        order_repository: Arc<dyn OrderRepository>,
        product_repository: Arc<dyn ProductRepository>,
        cart_repository: Arc<dyn CartRepository>,
        pricing: PricingPolicy,
    ) -> Self {
        Self {
            order_repository,
            product_repository,
            cart_repository,
            pricing,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record(&self, operation: &str, payment_method: &str, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_order_operation(operation, payment_method, success);
        }
    }

    /// Turn the user's cart into a pending order.
    ///
    /// Stock for every line is checked and decremented in one step, so a
    /// shortfall on any line leaves the catalog untouched. The cart is
    /// cleared once the order is stored.
    #[instrument(skip(self, request), fields(user_id = %user_id, payment_method = %request.payment_method))]
    pub async fn checkout(&self, user_id: &str, request: CheckoutRequest) -> ServiceResult<Order> {
        let method = request.payment_method.to_string();
        let result = self.checkout_inner(user_id, request).await;
        self.record("checkout", &method, result.is_ok());
        result
    }

    async fn checkout_inner(&self, user_id: &str, request: CheckoutRequest) -> ServiceResult<Order> {
        crate::info_with_trace!("Starting checkout");

        validate_user_id(user_id)?;
        request.validate()?;

        let mut cart = match self.cart_repository.find_cart(user_id).await? {
            Some(cart) if !cart.is_empty() => cart,
            _ => {
                return Err(ServiceError::EmptyCart {
                    user_id: user_id.to_string(),
                })
            }
        };

        let lines: Vec<(String, u32)> = cart
            .items
            .iter()
            .map(|item| (item.product_id.clone(), item.quantity))
            .collect();

        let reserved = self
            .product_repository
            .reserve_stock(&lines)
            .await
            .map_err(|err| match err {
                RepositoryError::StockShortfall {
                    product_id,
                    requested,
                    available,
                } => {
                    crate::warn_with_trace!("Checkout rejected, insufficient stock for {}", product_id);
                    ServiceError::InsufficientStock {
                        product_id,
                        requested,
                        available,
                    }
                }
                other => ServiceError::from(other),
            })?;

        let products: HashMap<&str, _> = reserved.iter().map(|p| (p.id.as_str(), p)).collect();
        let items: Vec<OrderItem> = cart
            .items
            .iter()
            .filter_map(|item| {
                products.get(item.product_id.as_str()).map(|product| OrderItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                    quantity: item.quantity,
                    image: product.primary_image(),
                })
            })
            .collect();

        let subtotal = items.iter().map(OrderItem::line_total).sum();
        let pricing = self.pricing.quote(subtotal);

        let order = Order::from_checkout(user_id.to_string(), items, pricing, request);
        let order = self.order_repository.create(order).await?;

        cart.clear();
        self.cart_repository.save_cart(cart).await?;

        crate::info_with_trace!(
            "Checkout completed, order {} total {}",
            order.id,
            order.total
        );
        Ok(order)
    }

    /// Store a client-priced order after checking it is self-consistent
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn create_order(&self, request: CreateOrderRequest) -> ServiceResult<Order> {
        crate::info_with_trace!("Creating order");
        let method = request.payment_method.to_string();

        if let Err(err) = request.validate() {
            self.record("create", &method, false);
            return Err(err.into());
        }

        let order = self.order_repository.create(Order::new(request)).await?;
        self.record("create", &method, true);

        crate::info_with_trace!("Order created with ID: {}", order.id);
        Ok(order)
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: &str) -> ServiceResult<Order> {
        self.order_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::OrderNotFound { id: id.to_string() })
    }

    /// Orders placed by a user, newest first
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_orders(&self, user_id: &str) -> ServiceResult<Vec<Order>> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::AuthenticationRequired);
        }

        let orders = self.order_repository.find_by_user(user_id).await?;
        crate::info_with_trace!("Found {} orders for user", orders.len());
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> ServiceResult<Vec<Order>> {
        Ok(self.order_repository.find_all().await?)
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> ServiceResult<Order> {
        let mut order = self.get_order(id).await?;
        let method = order.payment_method.to_string();

        if !order.status.can_transition_to(status) {
            crate::warn_with_trace!("Rejected order status change {} -> {}", order.status, status);
            self.record("update_status", &method, false);
            return Err(ServiceError::InvalidStatusTransition {
                entity: "order".to_string(),
                from: order.status.to_string(),
                to: status.to_string(),
            });
        }

        order.set_status(status);
        let order = self.order_repository.update(order).await?;
        self.record("update_status", &method, true);

        crate::info_with_trace!("Order status updated to {}", order.status);
        Ok(order)
    }

    /// Link a payment to an order and mirror its status
    #[instrument(skip(self), fields(order_id = %order_id, payment_id = %payment_id))]
    pub async fn attach_payment(
        &self,
        order_id: &str,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> ServiceResult<Order> {
        let mut order = self.get_order(order_id).await?;
        order.set_payment(payment_id.to_string(), payment_status);
        Ok(self.order_repository.update(order).await?)
    }

    /// Mirror a settled payment status onto the order it is linked to.
    /// Orders that have since been linked to a different payment are left alone.
    #[instrument(skip(self), fields(order_id = %order_id, payment_id = %payment_id))]
    pub async fn apply_payment_status(
        &self,
        order_id: &str,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> ServiceResult<Option<Order>> {
        let mut order = match self.order_repository.find_by_id(order_id).await? {
            Some(order) => order,
            None => {
                crate::warn_with_trace!("Payment references unknown order");
                return Ok(None);
            }
        };

        if order.payment_id.as_deref() != Some(payment_id) {
            return Ok(None);
        }

        order.set_payment(payment_id.to_string(), payment_status);
        Ok(Some(self.order_repository.update(order).await?))
    }
}
