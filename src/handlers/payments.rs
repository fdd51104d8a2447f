use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::errors::{service_error_to_response, ApiResult};
use crate::models::{
    CardPaymentRequest, CodPaymentRequest, PaymentResponse, PaymentStatusResponse,
    UpiPaymentRequest,
};
use crate::services::PaymentService;

#[derive(Clone)]
pub struct PaymentState {
    pub payment_service: Arc<PaymentService>,
}

pub fn create_payment_router(payment_service: Arc<PaymentService>) -> Router {
    let state = PaymentState { payment_service };

    Router::new()
        .route("/api/payments/upi", post(process_upi))
        .route("/api/payments/card", post(process_card))
        .route("/api/payments/cod", post(process_cod))
        .route("/api/payments/status/:payment_id", get(payment_status))
        .with_state(state)
}

fn accepted(method: &str, response: &PaymentResponse) {
    info!(
        "{} payment {} accepted with status {}",
        method, response.payment.id, response.payment.status
    );
}

#[instrument(skip(state, request), fields(amount = %request.amount, order_id = ?request.order_id))]
pub async fn process_upi(
    State(state): State<PaymentState>,
    Json(request): Json<UpiPaymentRequest>,
) -> ApiResult<Json<PaymentResponse>> {
    match state.payment_service.process_upi(request).await {
        Ok(response) => {
            accepted("UPI", &response);
            Ok(Json(response))
        }
        Err(err) => {
            error!("UPI payment failed: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(skip(state, request), fields(amount = %request.amount, order_id = ?request.order_id))]
pub async fn process_card(
    State(state): State<PaymentState>,
    Json(request): Json<CardPaymentRequest>,
) -> ApiResult<Json<PaymentResponse>> {
    match state.payment_service.process_card(request).await {
        Ok(response) => {
            accepted("Card", &response);
            Ok(Json(response))
        }
        Err(err) => {
            error!("Card payment failed: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(skip(state, request), fields(amount = %request.amount, order_id = ?request.order_id))]
pub async fn process_cod(
    State(state): State<PaymentState>,
    Json(request): Json<CodPaymentRequest>,
) -> ApiResult<Json<PaymentResponse>> {
    match state.payment_service.process_cod(request).await {
        Ok(response) => {
            accepted("COD", &response);
            Ok(Json(response))
        }
        Err(err) => {
            error!("COD order failed: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(skip(state))]
pub async fn payment_status(
    State(state): State<PaymentState>,
    Path(payment_id): Path<String>,
) -> ApiResult<Json<PaymentStatusResponse>> {
    state
        .payment_service
        .payment_status(&payment_id)
        .await
        .map(Json)
        .map_err(|err| {
            error!("Failed to get payment status {}: {}", payment_id, err);
            service_error_to_response(err)
        })
}
