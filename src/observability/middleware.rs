use axum::{
    extract::{MatchedPath, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::{Status, TraceContextExt};
use std::{sync::Arc, time::Instant};
use tracing::{error, field, info, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::Metrics;

/// What the access log needs to know about an incoming request
#[derive(Debug)]
struct RequestInfo {
    method: String,
    route: String,
    uri: String,
    user_agent: String,
    client_ip: String,
}

impl RequestInfo {
    fn from_request(request: &Request) -> Self {
        let uri = request.uri().to_string();
        // Group by route template so /api/orders/:id is a single series
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|path| path.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());

        Self {
            method: request.method().to_string(),
            route,
            uri,
            user_agent: header_value(request.headers(), "user-agent")
                .unwrap_or("unknown")
                .to_string(),
            client_ip: client_ip(request.headers()),
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// First hop of X-Forwarded-For, then X-Real-IP
fn client_ip(headers: &HeaderMap) -> String {
    header_value(headers, "x-forwarded-for")
        .and_then(|value| value.split(',').next())
        .or_else(|| header_value(headers, "x-real-ip"))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

/// Wrap every request in a server span and record HTTP metrics for it
pub async fn observability_middleware(
    metrics: Arc<Metrics>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let info = RequestInfo::from_request(&request);
    let span_name = format!("{} {}", info.method, info.route);

    let span = tracing::info_span!(
        target: "electricals_store::http",
        "{}", span_name,
        otel.name = %span_name,
        otel.kind = "server",
        http.method = %info.method,
        http.route = %info.route,
        http.url = %info.uri,
        http.user_agent = %info.user_agent,
        client.address = %info.client_ip,
        http.response.status_code = field::Empty,
        http.response_time_ms = field::Empty,
    );

    async move {
        metrics.increment_in_flight(&info.method, &info.route);

        let trace_id = Span::current()
            .context()
            .span()
            .span_context()
            .trace_id()
            .to_string();

        info!(
            trace_id = %trace_id,
            method = %info.method,
            path = %info.route,
            client_ip = %info.client_ip,
            "Processing request"
        );

        let response = next.run(request).await;

        let elapsed = started.elapsed();
        let status_code = response.status().as_u16();

        let span = Span::current();
        span.record("http.response.status_code", status_code);
        span.record("http.response_time_ms", elapsed.as_millis() as u64);
        span.context().span().set_status(if status_code >= 500 {
            Status::error("HTTP server error")
        } else {
            Status::Ok
        });

        metrics.record_http_request(&info.method, &info.route, status_code, elapsed.as_secs_f64());
        metrics.decrement_in_flight(&info.method, &info.route);

        if status_code >= 500 {
            error!(
                trace_id = %trace_id,
                method = %info.method,
                path = %info.route,
                status_code,
                duration_ms = elapsed.as_millis() as u64,
                "Request failed"
            );
        } else {
            info!(
                trace_id = %trace_id,
                method = %info.method,
                path = %info.route,
                status_code,
                duration_ms = elapsed.as_millis() as u64,
                "Request completed"
            );
        }

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn product_handler() -> &'static str {
        "multimeter"
    }

    async fn failing_handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn app(metrics: Arc<Metrics>) -> Router {
        Router::new()
            .route("/api/products/:id", get(product_handler))
            .route("/boom", get(failing_handler))
            .layer(middleware::from_fn(move |req, next| {
                observability_middleware(metrics.clone(), req, next)
            }))
    }

    #[tokio::test]
    async fn test_requests_grouped_by_route_template() {
        let metrics = Arc::new(Metrics::new().unwrap());

        for id in ["P1", "P2"] {
            let request = Request::builder()
                .method(Method::GET)
                .uri(format!("/api/products/{}", id))
                .header("user-agent", "electricals-web/2.1")
                .body(Body::empty())
                .unwrap();
            let response = app(metrics.clone()).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains(
            r#"http_requests_total{endpoint="/api/products/:id",method="GET",status_code="200"} 2"#
        ));
    }

    #[tokio::test]
    async fn test_server_errors_recorded() {
        let metrics = Arc::new(Metrics::new().unwrap());

        let request = Request::builder()
            .uri("/boom")
            .body(Body::empty())
            .unwrap();
        let response = app(metrics.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let encoded = metrics.encode().unwrap();
        assert!(encoded.contains(r#"status_code="500""#));
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "192.168.1.1, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "203.0.113.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "192.168.1.1");

        headers.remove("x-forwarded-for");
        assert_eq!(client_ip(&headers), "203.0.113.1");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
