use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use electricals_store::{
    config::PaymentsConfig, create_app, AppServices, Config, Metrics,
};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub services: AppServices,
}

/// Payments settle almost immediately and always succeed
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.payments = PaymentsConfig {
        upi_success_rate: 1.0,
        card_success_rate: 1.0,
        settle_min_delay_ms: 0,
        settle_max_delay_ms: 1,
    };
    config
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(fast_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics registry"));
        let gateway = Arc::new(config.payments.gateway());
        let services = AppServices::in_memory(&config, gateway, metrics.clone());
        services
            .seed_if_configured(&config)
            .await
            .expect("seed catalog");

        let router = create_app(services.clone(), &config, metrics);
        Self { router, services }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                let bytes = serde_json::to_vec(&json).expect("serialize body");
                builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::CONTENT_LENGTH, bytes.len())
                    .body(Body::from(bytes))
            }
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    /// Id of the first catalog product with the given name
    pub async fn product_id(&self, name: &str) -> String {
        let (_, body) = self.get("/api/products").await;
        body["products"]
            .as_array()
            .expect("product list")
            .iter()
            .find(|p| p["name"] == name)
            .and_then(|p| p["id"].as_str())
            .expect("seeded product")
            .to_string()
    }

    /// Poll the status endpoint until the payment reaches `expected`
    pub async fn wait_for_payment_status(&self, payment_id: &str, expected: &str) -> Value {
        let uri = format!("/api/payments/status/{}", payment_id);
        for _ in 0..100 {
            let (status, body) = self.get(&uri).await;
            assert_eq!(status, StatusCode::OK);
            if body["status"] == expected {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("payment {} never reached {}", payment_id, expected);
    }
}

pub fn shipping_address() -> Value {
    serde_json::json!({
        "name": "Priya Raman",
        "phone": "+919876543210",
        "address": "12 Anna Nagar Main Road",
        "city": "Madurai",
        "state": "Tamil Nadu",
        "pincode": "625020"
    })
}
