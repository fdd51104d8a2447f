use prometheus::{CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to register metric: {0}")]
    Registration(#[from] prometheus::Error),
    #[error("Failed to encode metrics: {0}")]
    Encoding(String),
}

/// Prometheus metrics for the storefront
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    // HTTP metrics
    pub http_requests_total: CounterVec,
    pub http_request_duration_seconds: HistogramVec,
    pub http_requests_in_flight: GaugeVec,

    // Business metrics
    pub product_operations_total: CounterVec,
    pub cart_operations_total: CounterVec,
    pub order_operations_total: CounterVec,
    pub booking_operations_total: CounterVec,
    pub payment_operations_total: CounterVec,
    pub payment_settled_amount_total: CounterVec,
}

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "error"
    }
}

impl Metrics {
    /// Create a new metrics instance with all required metrics registered
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        info!("Initializing Prometheus metrics");

        let http_requests_total = CounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests processed"),
            &["method", "endpoint", "status_code"],
        )?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "endpoint"],
        )?;

        let http_requests_in_flight = GaugeVec::new(
            Opts::new(
                "http_requests_in_flight",
                "Number of HTTP requests currently being processed",
            ),
            &["method", "endpoint"],
        )?;

        let product_operations_total = CounterVec::new(
            Opts::new("product_operations_total", "Total number of catalog operations"),
            &["operation", "status"],
        )?;

        let cart_operations_total = CounterVec::new(
            Opts::new("cart_operations_total", "Total number of cart operations"),
            &["operation", "status"],
        )?;

        let order_operations_total = CounterVec::new(
            Opts::new("order_operations_total", "Total number of order operations"),
            &["operation", "payment_method", "status"],
        )?;

        let booking_operations_total = CounterVec::new(
            Opts::new(
                "booking_operations_total",
                "Total number of service booking operations",
            ),
            &["operation", "service_type", "status"],
        )?;

        let payment_operations_total = CounterVec::new(
            Opts::new(
                "payment_operations_total",
                "Payment lifecycle events by method and outcome",
            ),
            &["method", "operation", "outcome"],
        )?;

        let payment_settled_amount_total = CounterVec::new(
            Opts::new(
                "payment_settled_amount_total",
                "Sum of completed payment amounts in INR",
            ),
            &["method"],
        )?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(product_operations_total.clone()))?;
        registry.register(Box::new(cart_operations_total.clone()))?;
        registry.register(Box::new(order_operations_total.clone()))?;
        registry.register(Box::new(booking_operations_total.clone()))?;
        registry.register(Box::new(payment_operations_total.clone()))?;
        registry.register(Box::new(payment_settled_amount_total.clone()))?;

        info!("Prometheus metrics initialized successfully");

        Ok(Metrics {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            product_operations_total,
            cart_operations_total,
            order_operations_total,
            booking_operations_total,
            payment_operations_total,
            payment_settled_amount_total,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encode all metrics in Prometheus text format
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| MetricsError::Encoding(e.to_string()))?;

        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }

    pub fn record_http_request(
        &self,
        method: &str,
        endpoint: &str,
        status_code: u16,
        duration_seconds: f64,
    ) {
        let status_str = status_code.to_string();

        self.http_requests_total
            .with_label_values(&[method, endpoint, &status_str])
            .inc();

        self.http_request_duration_seconds
            .with_label_values(&[method, endpoint])
            .observe(duration_seconds);
    }

    pub fn record_product_operation(&self, operation: &str, success: bool) {
        self.product_operations_total
            .with_label_values(&[operation, status_label(success)])
            .inc();
    }

    pub fn record_cart_operation(&self, operation: &str, success: bool) {
        self.cart_operations_total
            .with_label_values(&[operation, status_label(success)])
            .inc();
    }

    pub fn record_order_operation(&self, operation: &str, payment_method: &str, success: bool) {
        self.order_operations_total
            .with_label_values(&[operation, payment_method, status_label(success)])
            .inc();
    }

    pub fn record_booking_operation(&self, operation: &str, service_type: &str, success: bool) {
        self.booking_operations_total
            .with_label_values(&[operation, service_type, status_label(success)])
            .inc();
    }

    /// `outcome` is the payment status reached, or "rejected" for invalid requests
    pub fn record_payment_event(&self, method: &str, operation: &str, outcome: &str) {
        self.payment_operations_total
            .with_label_values(&[method, operation, outcome])
            .inc();
    }

    pub fn record_settled_amount(&self, method: &str, amount: f64) {
        self.payment_settled_amount_total
            .with_label_values(&[method])
            .inc_by(amount);
    }

    pub fn increment_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .inc();
    }

    pub fn decrement_in_flight(&self, method: &str, endpoint: &str) {
        self.http_requests_in_flight
            .with_label_values(&[method, endpoint])
            .dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_http_request_recording() {
        let metrics = Metrics::new().unwrap();

        metrics.record_http_request("GET", "/api/products", 200, 0.123);
        metrics.record_http_request("POST", "/api/orders", 201, 0.456);

        let metrics_text = metrics.encode().unwrap();
        assert!(metrics_text.contains("http_requests_total"));
        assert!(metrics_text.contains("http_request_duration_seconds"));
    }

    #[test]
    fn test_business_metrics_recording() {
        let metrics = Metrics::new().unwrap();

        metrics.record_product_operation("create", true);
        metrics.record_cart_operation("add_item", true);
        metrics.record_order_operation("checkout", "upi", true);
        metrics.record_booking_operation("create", "electrical", false);
        metrics.record_payment_event("card", "settle", "completed");
        metrics.record_settled_amount("card", 2499.0);

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains("product_operations_total"));
        assert!(encoded.contains("cart_operations_total"));
        assert!(encoded.contains("order_operations_total"));
        assert!(encoded.contains("booking_operations_total"));
        assert!(encoded.contains(r#"payment_operations_total{method="card",operation="settle",outcome="completed"} 1"#));
        assert!(encoded.contains("payment_settled_amount_total"));
    }

    #[test]
    fn test_in_flight_requests() {
        let metrics = Metrics::new().unwrap();

        metrics.increment_in_flight("GET", "/api/products");
        metrics.increment_in_flight("GET", "/api/products");
        metrics.decrement_in_flight("GET", "/api/products");

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains("http_requests_in_flight"));
    }
}
