use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn, Instrument};

use super::storage_span;
use crate::models::{Payment, PaymentStatus, RepositoryError, RepositoryResult};

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: Payment) -> RepositoryResult<Payment>;

    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Payment>>;

    /// Payments created inside the optional bounds (both inclusive)
    async fn find_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Vec<Payment>>;

    /// Move a payment to `next` under the write lock.
    ///
    /// Returns `Ok(None)` when the current status does not allow the move,
    /// so a settlement can never overwrite a refund or a manual collection.
    async fn transition(
        &self,
        id: &str,
        next: PaymentStatus,
        failure_reason: Option<String>,
    ) -> RepositoryResult<Option<Payment>>;
}

#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: RwLock<HashMap<String, Payment>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    #[instrument(skip(self, payment), fields(payment_id = %payment.id, method = %payment.method))]
    async fn create(&self, payment: Payment) -> RepositoryResult<Payment> {
        let mut payments = self
            .payments
            .write()
            .instrument(storage_span("payments", "put"))
            .await;

        if payments.contains_key(&payment.id) {
            warn!("Payment already exists");
            return Err(RepositoryError::AlreadyExists {
                id: payment.id.clone(),
            });
        }

        payments.insert(payment.id.clone(), payment.clone());
        info!("Payment stored");
        Ok(payment)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Payment>> {
        let payment = async { self.payments.read().await.get(id).cloned() }
            .instrument(storage_span("payments", "get"))
            .await;
        Ok(payment)
    }

    #[instrument(skip(self))]
    async fn find_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Vec<Payment>> {
        let mut payments: Vec<Payment> = async {
            self.payments
                .read()
                .await
                .values()
                .filter(|p| from.map_or(true, |from| p.created_at >= from))
                .filter(|p| to.map_or(true, |to| p.created_at <= to))
                .cloned()
                .collect()
        }
        .instrument(storage_span("payments", "scan"))
        .await;

        payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(payments)
    }

    #[instrument(skip(self, failure_reason))]
    async fn transition(
        &self,
        id: &str,
        next: PaymentStatus,
        failure_reason: Option<String>,
    ) -> RepositoryResult<Option<Payment>> {
        let mut payments = self
            .payments
            .write()
            .instrument(storage_span("payments", "transition"))
            .await;

        let payment = payments.get_mut(id).ok_or(RepositoryError::NotFound)?;
        if payment.transition(next, failure_reason) {
            info!(status = %next, "Payment status changed");
            Ok(Some(payment.clone()))
        } else {
            warn!(current = %payment.status, requested = %next, "Payment transition refused");
            Ok(None)
        }
    }
}
