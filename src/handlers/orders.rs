use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::errors::{service_error_to_response, ApiResult};
use crate::models::{CreateOrderRequest, Order, ServiceError};
use crate::services::OrderService;

#[derive(Clone)]
pub struct OrderState {
    pub order_service: Arc<OrderService>,
}

/// `?user_id=` on the per-user listings
#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

impl UserQuery {
    /// Missing or blank ids are treated as an anonymous caller
    pub fn require_user(&self) -> Result<&str, ServiceError> {
        self.user_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ServiceError::AuthenticationRequired)
    }
}

pub fn create_order_router(order_service: Arc<OrderService>) -> Router {
    let state = OrderState { order_service };

    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/user", get(user_orders))
        .route("/api/orders/:id", get(get_order))
        .with_state(state)
}

#[instrument(skip(state, request), fields(user_id = %request.user_id))]
pub async fn create_order(
    State(state): State<OrderState>,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    match state.order_service.create_order(request).await {
        Ok(order) => {
            info!("Created order {}", order.id);
            Ok((StatusCode::CREATED, Json(order)))
        }
        Err(err) => {
            error!("Failed to create order: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(skip(state))]
pub async fn user_orders(
    State(state): State<OrderState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let user_id = query.require_user().map_err(service_error_to_response)?;

    state
        .order_service
        .user_orders(user_id)
        .await
        .map(Json)
        .map_err(|err| {
            error!("Failed to list orders for user {}: {}", user_id, err);
            service_error_to_response(err)
        })
}

#[instrument(skip(state), fields(order_id = %id))]
pub async fn get_order(
    State(state): State<OrderState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    state
        .order_service
        .get_order(&id)
        .await
        .map(Json)
        .map_err(|err| {
            error!("Failed to get order {}: {}", id, err);
            service_error_to_response(err)
        })
}
