use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::errors::{service_error_to_response, ApiResult};
use crate::models::{
    AddCartItemRequest, CartResponse, CheckoutRequest, Order, UpdateCartItemRequest,
};
use crate::services::{CartService, OrderService};

/// Response for cart validation
#[derive(Debug, Serialize)]
pub struct CartValidationResponse {
    pub is_valid: bool,
    pub issues: Vec<String>,
}

/// State for cart handlers
#[derive(Clone)]
pub struct CartHandlerState {
    pub cart_service: Arc<CartService>,
    pub order_service: Arc<OrderService>,
}

/// Create cart router with all endpoints
pub fn create_cart_router(
    cart_service: Arc<CartService>,
    order_service: Arc<OrderService>,
) -> Router {
    let state = CartHandlerState {
        cart_service,
        order_service,
    };

    Router::new()
        .route("/api/cart/:user_id", get(get_cart).delete(delete_cart))
        .route("/api/cart/:user_id/items", post(add_cart_item))
        .route(
            "/api/cart/:user_id/items/:product_id",
            put(update_cart_item).delete(remove_cart_item),
        )
        .route("/api/cart/:user_id/clear", post(clear_cart))
        .route("/api/cart/:user_id/validate", get(validate_cart))
        .route("/api/cart/:user_id/checkout", post(checkout_cart))
        .with_state(state)
}

#[instrument(skip(state))]
pub async fn get_cart(
    State(state): State<CartHandlerState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<CartResponse>> {
    match state.cart_service.get_cart(&user_id).await {
        Ok(cart) => {
            info!("Retrieved cart with {} items", cart.total_items);
            Ok(Json(cart))
        }
        Err(err) => {
            error!("Failed to get cart for user {}: {}", user_id, err);
            Err(service_error_to_response(err))
        }
    }
}

/// Add an item to the cart
#[instrument(skip(state, request), fields(product_id = %request.product_id, quantity = request.quantity))]
pub async fn add_cart_item(
    State(state): State<CartHandlerState>,
    Path(user_id): Path<String>,
    Json(request): Json<AddCartItemRequest>,
) -> ApiResult<Json<CartResponse>> {
    match state.cart_service.add_item(&user_id, request).await {
        Ok(cart) => {
            info!("Cart now holds {} items", cart.total_items);
            Ok(Json(cart))
        }
        Err(err) => {
            error!("Failed to add item to cart for user {}: {}", user_id, err);
            Err(service_error_to_response(err))
        }
    }
}

/// Set a line's quantity; zero removes the line
#[instrument(skip(state, request), fields(quantity = request.quantity))]
pub async fn update_cart_item(
    State(state): State<CartHandlerState>,
    Path((user_id, product_id)): Path<(String, String)>,
    Json(request): Json<UpdateCartItemRequest>,
) -> ApiResult<Json<CartResponse>> {
    state
        .cart_service
        .update_item(&user_id, &product_id, request)
        .await
        .map(Json)
        .map_err(|err| {
            error!(
                "Failed to update cart item {} for user {}: {}",
                product_id, user_id, err
            );
            service_error_to_response(err)
        })
}

#[instrument(skip(state))]
pub async fn remove_cart_item(
    State(state): State<CartHandlerState>,
    Path((user_id, product_id)): Path<(String, String)>,
) -> ApiResult<Json<CartResponse>> {
    state
        .cart_service
        .remove_item(&user_id, &product_id)
        .await
        .map(Json)
        .map_err(|err| {
            error!(
                "Failed to remove cart item {} for user {}: {}",
                product_id, user_id, err
            );
            service_error_to_response(err)
        })
}

#[instrument(skip(state))]
pub async fn clear_cart(
    State(state): State<CartHandlerState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Value>> {
    match state.cart_service.clear_cart(&user_id).await {
        Ok(()) => Ok(Json(json!({
            "message": "Cart cleared successfully",
            "user_id": user_id,
        }))),
        Err(err) => {
            error!("Failed to clear cart for user {}: {}", user_id, err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_cart(
    State(state): State<CartHandlerState>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    match state.cart_service.delete_cart(&user_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => {
            error!("Failed to delete cart for user {}: {}", user_id, err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(skip(state))]
pub async fn validate_cart(
    State(state): State<CartHandlerState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<CartValidationResponse>> {
    match state.cart_service.validate_cart(&user_id).await {
        Ok(issues) => Ok(Json(CartValidationResponse {
            is_valid: issues.is_empty(),
            issues,
        })),
        Err(err) => {
            error!("Failed to validate cart for user {}: {}", user_id, err);
            Err(service_error_to_response(err))
        }
    }
}

/// Turn the cart into a pending order
#[instrument(skip(state, request), fields(payment_method = %request.payment_method))]
pub async fn checkout_cart(
    State(state): State<CartHandlerState>,
    Path(user_id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    match state.order_service.checkout(&user_id, request).await {
        Ok(order) => {
            info!("Checkout created order {} for {}", order.id, order.total);
            Ok((StatusCode::CREATED, Json(order)))
        }
        Err(err) => {
            error!("Checkout failed for user {}: {}", user_id, err);
            Err(service_error_to_response(err))
        }
    }
}
