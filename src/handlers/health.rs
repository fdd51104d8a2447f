use axum::response::Json;
use serde_json::{json, Value};
use tracing::instrument;

/// Liveness probe
#[instrument(name = "health_check")]
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "electricals-store",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_reports_service() {
        let Json(body) = tokio_test::block_on(health_check());
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "electricals-store");
    }
}
