use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    AssignTechnicianRequest, BookingStatus, CreateBookingRequest, ServiceBooking, ServiceError,
    ServiceResult, UpdateBookingStatusRequest, Validate,
};
use crate::observability::Metrics;
use crate::repositories::BookingRepository;

/// Electrician and plumber visit bookings
pub struct BookingService {
    repository: Arc<dyn BookingRepository>,
    metrics: Option<Arc<Metrics>>,
}

impl BookingService {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self {
            repository,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record(&self, operation: &str, booking: &ServiceBooking, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_booking_operation(operation, &booking.service_type.to_string(), success);
        }
    }

    #[instrument(skip(self, request), fields(service_type = %request.service_type, date = %request.date))]
    pub async fn create_booking(&self, request: CreateBookingRequest) -> ServiceResult<ServiceBooking> {
        crate::info_with_trace!("Creating service booking");

        if let Err(err) = request.validate() {
            if let Some(metrics) = &self.metrics {
                metrics.record_booking_operation(
                    "create",
                    &request.service_type.to_string(),
                    false,
                );
            }
            crate::warn_with_trace!("Booking rejected: {}", err);
            return Err(err.into());
        }

        let booking = self.repository.create(ServiceBooking::new(request)).await?;
        self.record("create", &booking, true);

        crate::info_with_trace!("Booking created with reference {}", booking.reference());
        Ok(booking)
    }

    #[instrument(skip(self), fields(booking_id = %id))]
    pub async fn get_booking(&self, id: &str) -> ServiceResult<ServiceBooking> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::BookingNotFound { id: id.to_string() })
    }

    /// Bookings made by a signed-in user, newest first
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_bookings(&self, user_id: &str) -> ServiceResult<Vec<ServiceBooking>> {
        if user_id.trim().is_empty() {
            return Err(ServiceError::AuthenticationRequired);
        }
        Ok(self.repository.find_by_user(user_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn all_bookings(&self) -> ServiceResult<Vec<ServiceBooking>> {
        Ok(self.repository.find_all().await?)
    }

    #[instrument(skip(self, request), fields(booking_id = %id, status = %request.status))]
    pub async fn update_booking_status(
        &self,
        id: &str,
        request: UpdateBookingStatusRequest,
    ) -> ServiceResult<ServiceBooking> {
        let mut booking = self.get_booking(id).await?;

        if !booking.status.can_transition_to(request.status) {
            self.record("update_status", &booking, false);
            return Err(ServiceError::InvalidStatusTransition {
                entity: "booking".to_string(),
                from: booking.status.to_string(),
                to: request.status.to_string(),
            });
        }
        if let Some(cost) = request.actual_cost {
            if cost.is_sign_negative() {
                return Err(ServiceError::ValidationError {
                    message: "actual_cost cannot be negative".to_string(),
                });
            }
        }

        booking.set_status(request.status, request.actual_cost);
        let booking = self.repository.update(booking).await?;
        self.record("update_status", &booking, true);

        crate::info_with_trace!("Booking status updated to {}", booking.status);
        Ok(booking)
    }

    /// Assign a technician; finished or cancelled visits cannot be reassigned
    #[instrument(skip(self, request), fields(booking_id = %id, technician_id = %request.technician_id))]
    pub async fn assign_technician(
        &self,
        id: &str,
        request: AssignTechnicianRequest,
    ) -> ServiceResult<ServiceBooking> {
        request.validate()?;

        let mut booking = self.get_booking(id).await?;
        if booking.status.is_terminal() {
            return Err(ServiceError::InvalidStatusTransition {
                entity: "booking".to_string(),
                from: booking.status.to_string(),
                to: BookingStatus::Confirmed.to_string(),
            });
        }

        booking.assign_technician(request.technician_id.trim().to_string(), request.estimated_cost);
        let booking = self.repository.update(booking).await?;
        self.record("assign_technician", &booking, true);

        crate::info_with_trace!("Technician assigned to booking");
        Ok(booking)
    }
}
