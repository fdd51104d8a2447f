use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, Instrument};

use crate::models::{
    upi_link, CardPaymentRequest, CodPaymentRequest, OrderStatus, Payment, PaymentAnalytics,
    PaymentMethod, PaymentResponse, PaymentStatus, PaymentStatusResponse, ServiceError,
    ServiceResult, UpiPaymentRequest, Validate,
};
use crate::observability::Metrics;
use crate::repositories::PaymentRepository;
use crate::services::OrderService;

/// Final word from the gateway on an open payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Completed,
    Failed { reason: String },
}

impl Settlement {
    fn into_transition(self) -> (PaymentStatus, Option<String>) {
        match self {
            Settlement::Completed => (PaymentStatus::Completed, None),
            Settlement::Failed { reason } => (PaymentStatus::Failed, Some(reason)),
        }
    }
}

/// Decides how an open UPI or card payment ends
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn settle(&self, payment: &Payment) -> Settlement;
}

/// Gateway that waits a random delay and succeeds with a fixed probability per method
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    pub upi_success_rate: f64,
    pub card_success_rate: f64,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl SimulatedGateway {
    fn success_rate(&self, method: PaymentMethod) -> f64 {
        match method {
            PaymentMethod::Upi => self.upi_success_rate,
            PaymentMethod::Card => self.card_success_rate,
            PaymentMethod::Cod => 1.0,
        }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn settle(&self, payment: &Payment) -> Settlement {
        // ThreadRng is not Send; draw everything before the first await
        let (delay, succeeded) = {
            let mut rng = rand::rng();
            let min = self.min_delay.as_millis() as u64;
            let max = (self.max_delay.as_millis() as u64).max(min);
            let rate = self.success_rate(payment.method).clamp(0.0, 1.0);
            (
                Duration::from_millis(rng.random_range(min..=max)),
                rng.random_bool(rate),
            )
        };

        tokio::time::sleep(delay).await;

        if succeeded {
            Settlement::Completed
        } else {
            Settlement::Failed {
                reason: match payment.method {
                    PaymentMethod::Upi => "UPI transaction declined by payer bank".to_string(),
                    _ => "Card declined by issuer".to_string(),
                },
            }
        }
    }
}

/// Payee details shown in UPI collect links
#[derive(Debug, Clone)]
pub struct Merchant {
    pub name: String,
    pub vpa: String,
}

/// Applies gateway outcomes in the background
#[derive(Clone)]
struct Settler {
    repository: Arc<dyn PaymentRepository>,
    gateway: Arc<dyn PaymentGateway>,
    orders: Arc<OrderService>,
    metrics: Option<Arc<Metrics>>,
}

impl Settler {
    fn spawn(&self, payment: Payment) {
        let settler = self.clone();
        let span = tracing::info_span!(
            "payment_settlement",
            payment_id = %payment.id,
            method = %payment.method
        );
        tokio::spawn(async move { settler.run(payment).await }.instrument(span));
    }

    async fn run(&self, payment: Payment) {
        let (next, reason) = self.gateway.settle(&payment).await.into_transition();

        match self.repository.transition(&payment.id, next, reason).await {
            Ok(Some(updated)) => {
                crate::info_with_trace!("Payment settled as {}", updated.status);
                if let Some(metrics) = &self.metrics {
                    let method = updated.method.to_string();
                    metrics.record_payment_event(&method, "settle", &updated.status.to_string());
                    if updated.status == PaymentStatus::Completed {
                        metrics.record_settled_amount(&method, updated.amount.to_f64().unwrap_or(0.0));
                    }
                }
                mirror_on_order(&self.orders, &updated).await;
            }
            Ok(None) => {
                crate::info_with_trace!("Payment already left the open state, settlement skipped");
            }
            Err(e) => {
                crate::error_with_trace!("Failed to record settlement: {}", e);
            }
        }
    }
}

async fn mirror_on_order(orders: &OrderService, payment: &Payment) {
    let Some(order_id) = payment.order_id.as_deref() else {
        return;
    };
    if let Err(e) = orders
        .apply_payment_status(order_id, &payment.id, payment.status)
        .await
    {
        crate::warn_with_trace!("Could not update order {} payment status: {}", order_id, e);
    }
}

/// Simulated UPI, card and cash-on-delivery payments
pub struct PaymentService {
    repository: Arc<dyn PaymentRepository>,
    orders: Arc<OrderService>,
    merchant: Merchant,
    settler: Settler,
    metrics: Option<Arc<Metrics>>,
}

impl PaymentService {
    pub fn new(
        repository: Arc<dyn PaymentRepository>,
        gateway: Arc<dyn PaymentGateway>,
        orders: Arc<OrderService>,
        merchant: Merchant,
    ) -> Self {
        let settler = Settler {
            repository: repository.clone(),
            gateway,
            orders: orders.clone(),
            metrics: None,
        };
        Self {
            repository,
            orders,
            merchant,
            settler,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.settler.metrics = Some(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    fn record(&self, method: PaymentMethod, operation: &str, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_payment_event(&method.to_string(), operation, outcome);
        }
    }

    fn reject<T>(&self, method: PaymentMethod, err: impl Into<ServiceError>) -> ServiceResult<T> {
        let err = err.into();
        crate::warn_with_trace!("Payment request rejected: {}", err);
        self.record(method, "initiate", "rejected");
        Err(err)
    }

    /// A linked order must exist and still be awaiting payment
    async fn check_payable(&self, order_id: Option<&str>) -> ServiceResult<()> {
        let Some(order_id) = order_id.filter(|id| !id.trim().is_empty()) else {
            return Ok(());
        };

        let order = self.orders.get_order(order_id).await?;
        if order.status == OrderStatus::Cancelled {
            return Err(ServiceError::PaymentRejected {
                message: format!("Order {} has been cancelled", order.id),
            });
        }
        if matches!(
            order.payment_status,
            PaymentStatus::Completed | PaymentStatus::Refunded
        ) {
            return Err(ServiceError::PaymentRejected {
                message: format!("Order {} has already been paid", order.id),
            });
        }
        Ok(())
    }

    async fn store(&self, payment: Payment) -> ServiceResult<Payment> {
        let payment = self.repository.create(payment).await?;
        self.record(payment.method, "initiate", &payment.status.to_string());

        if let Some(order_id) = payment.order_id.as_deref() {
            self.orders
                .attach_payment(order_id, &payment.id, payment.status)
                .await?;
        }
        Ok(payment)
    }

    /// Start a UPI collect; the payer completes it in their UPI app
    #[instrument(skip(self, request), fields(amount = %request.amount))]
    pub async fn process_upi(&self, request: UpiPaymentRequest) -> ServiceResult<PaymentResponse> {
        crate::info_with_trace!("Initiating UPI payment");

        if let Err(err) = request.validate() {
            return self.reject(PaymentMethod::Upi, err);
        }
        if let Err(err) = self.check_payable(request.order_id.as_deref()).await {
            return self.reject(PaymentMethod::Upi, err);
        }

        let payment = self.store(Payment::upi(request)).await?;
        let link = upi_link(
            &self.merchant.vpa,
            &self.merchant.name,
            &payment.id,
            &payment.description,
            payment.amount,
        );
        self.settler.spawn(payment.clone());

        crate::info_with_trace!("UPI payment {} initiated", payment.id);
        Ok(PaymentResponse {
            payment,
            upi_link: Some(link),
            message: "UPI payment initiated. Please complete payment using your UPI app."
                .to_string(),
        })
    }

    /// Charge a card; only the last four digits and the brand are kept
    #[instrument(skip(self, request), fields(amount = %request.amount))]
    pub async fn process_card(&self, request: CardPaymentRequest) -> ServiceResult<PaymentResponse> {
        crate::info_with_trace!("Initiating card payment");

        if let Err(err) = request.validate() {
            return self.reject(PaymentMethod::Card, err);
        }
        if let Err(err) = self.check_payable(request.order_id.as_deref()).await {
            return self.reject(PaymentMethod::Card, err);
        }

        let payment = self.store(Payment::card(request)).await?;
        self.settler.spawn(payment.clone());

        crate::info_with_trace!("Card payment {} processing", payment.id);
        Ok(PaymentResponse {
            payment,
            upi_link: None,
            message: "Card payment processing. Please wait for confirmation.".to_string(),
        })
    }

    /// Cash on delivery stays pending until collected at the door
    #[instrument(skip(self, request), fields(amount = %request.amount))]
    pub async fn process_cod(&self, request: CodPaymentRequest) -> ServiceResult<PaymentResponse> {
        crate::info_with_trace!("Registering cash-on-delivery payment");

        if let Err(err) = request.validate() {
            return self.reject(PaymentMethod::Cod, err);
        }
        if let Err(err) = self.check_payable(request.order_id.as_deref()).await {
            return self.reject(PaymentMethod::Cod, err);
        }

        let payment = self.store(Payment::cod(request)).await?;

        Ok(PaymentResponse {
            payment,
            upi_link: None,
            message:
                "Cash on Delivery order confirmed. Payment will be collected upon delivery."
                    .to_string(),
        })
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn get_payment(&self, id: &str) -> ServiceResult<Payment> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::PaymentNotFound { id: id.to_string() })
    }

    pub async fn payment_status(&self, id: &str) -> ServiceResult<PaymentStatusResponse> {
        Ok(self.get_payment(id).await?.status_response())
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn refund(&self, id: &str) -> ServiceResult<Payment> {
        crate::info_with_trace!("Refunding payment");
        let payment = self.apply_admin_transition(id, PaymentStatus::Refunded).await?;
        self.record(payment.method, "refund", &payment.status.to_string());
        Ok(payment)
    }

    #[instrument(skip(self), fields(payment_id = %id))]
    pub async fn collect_cod(&self, id: &str) -> ServiceResult<Payment> {
        crate::info_with_trace!("Collecting cash-on-delivery payment");

        let payment = self.get_payment(id).await?;
        if payment.method != PaymentMethod::Cod {
            return Err(ServiceError::PaymentRejected {
                message: format!("Payment {} is not cash on delivery", payment.id),
            });
        }

        let payment = self.apply_admin_transition(id, PaymentStatus::Completed).await?;
        self.record(payment.method, "collect", &payment.status.to_string());
        if let Some(metrics) = &self.metrics {
            metrics.record_settled_amount(
                &payment.method.to_string(),
                payment.amount.to_f64().unwrap_or(0.0),
            );
        }
        Ok(payment)
    }

    async fn apply_admin_transition(&self, id: &str, next: PaymentStatus) -> ServiceResult<Payment> {
        let current = self.get_payment(id).await?;

        match self.repository.transition(id, next, None).await? {
            Some(updated) => {
                mirror_on_order(&self.orders, &updated).await;
                Ok(updated)
            }
            None => Err(ServiceError::InvalidStatusTransition {
                entity: "payment".to_string(),
                from: current.status.to_string(),
                to: next.to_string(),
            }),
        }
    }

    /// Totals over payments created within `[from, to]`
    #[instrument(skip(self))]
    pub async fn payment_analytics(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ServiceResult<PaymentAnalytics> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ServiceError::ValidationError {
                    message: "'from' must not be after 'to'".to_string(),
                });
            }
        }

        let payments = self.repository.find_created_between(from, to).await?;
        Ok(PaymentAnalytics::from_payments(&payments))
    }
}
