use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn, Instrument};

use super::storage_span;
use crate::models::{RepositoryError, RepositoryResult, ServiceBooking};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: ServiceBooking) -> RepositoryResult<ServiceBooking>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<ServiceBooking>>;

    /// Bookings made by one user, newest first
    async fn find_by_user(&self, user_id: &str) -> RepositoryResult<Vec<ServiceBooking>>;

    /// Every booking, newest first
    async fn find_all(&self) -> RepositoryResult<Vec<ServiceBooking>>;

    async fn update(&self, booking: ServiceBooking) -> RepositoryResult<ServiceBooking>;
}

#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<String, ServiceBooking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut bookings: Vec<ServiceBooking>) -> Vec<ServiceBooking> {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    bookings
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    #[instrument(skip(self, booking), fields(booking_id = %booking.id))]
    async fn create(&self, booking: ServiceBooking) -> RepositoryResult<ServiceBooking> {
        let mut bookings = self
            .bookings
            .write()
            .instrument(storage_span("bookings", "put"))
            .await;

        if bookings.contains_key(&booking.id) {
            warn!("Booking already exists");
            return Err(RepositoryError::AlreadyExists {
                id: booking.id.clone(),
            });
        }

        bookings.insert(booking.id.clone(), booking.clone());
        info!("Booking stored");
        Ok(booking)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<ServiceBooking>> {
        let booking = async { self.bookings.read().await.get(id).cloned() }
            .instrument(storage_span("bookings", "get"))
            .await;
        Ok(booking)
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: &str) -> RepositoryResult<Vec<ServiceBooking>> {
        let bookings: Vec<ServiceBooking> = async {
            self.bookings
                .read()
                .await
                .values()
                .filter(|booking| booking.user_id.as_deref() == Some(user_id))
                .cloned()
                .collect()
        }
        .instrument(storage_span("bookings", "query"))
        .await;
        Ok(newest_first(bookings))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<ServiceBooking>> {
        let bookings: Vec<ServiceBooking> = async { self.bookings.read().await.values().cloned().collect() }
            .instrument(storage_span("bookings", "scan"))
            .await;
        Ok(newest_first(bookings))
    }

    #[instrument(skip(self, booking), fields(booking_id = %booking.id, status = %booking.status))]
    async fn update(&self, booking: ServiceBooking) -> RepositoryResult<ServiceBooking> {
        let mut bookings = self
            .bookings
            .write()
            .instrument(storage_span("bookings", "put"))
            .await;

        match bookings.get_mut(&booking.id) {
            Some(existing) => {
                *existing = booking.clone();
                info!("Booking updated");
                Ok(booking)
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}
