use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::errors::{service_error_to_response, ApiResult};
use super::orders::UserQuery;
use crate::models::{CreateBookingRequest, ServiceBooking};
use crate::services::BookingService;

#[derive(Clone)]
pub struct BookingState {
    pub booking_service: Arc<BookingService>,
}

pub fn create_booking_router(booking_service: Arc<BookingService>) -> Router {
    let state = BookingState { booking_service };

    Router::new()
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/user", get(user_bookings))
        .with_state(state)
}

/// Book a technician visit
#[instrument(skip(state, request), fields(service_type = %request.service_type, date = %request.date))]
pub async fn create_booking(
    State(state): State<BookingState>,
    Json(request): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<ServiceBooking>)> {
    match state.booking_service.create_booking(request).await {
        Ok(booking) => {
            info!("Created booking {}", booking.reference());
            Ok((StatusCode::CREATED, Json(booking)))
        }
        Err(err) => {
            error!("Failed to create booking: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(skip(state))]
pub async fn user_bookings(
    State(state): State<BookingState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<Vec<ServiceBooking>>> {
    let user_id = query.require_user().map_err(service_error_to_response)?;

    state
        .booking_service
        .user_bookings(user_id)
        .await
        .map(Json)
        .map_err(|err| {
            error!("Failed to list bookings for user {}: {}", user_id, err);
            service_error_to_response(err)
        })
}
