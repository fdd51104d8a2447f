use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::errors::{service_error_to_response, ApiResult};
use crate::models::{
    AssignTechnicianRequest, CreateProductRequest, Order, Payment, PaymentAnalytics, Product,
    ServiceBooking, StoreAnalytics, UpdateBookingStatusRequest, UpdateOrderStatusRequest,
    UpdateProductRequest,
};
use crate::services::{
    AnalyticsService, BookingService, OrderService, PaymentService, ProductService,
};

/// Admin state containing services
#[derive(Clone)]
pub struct AdminState {
    pub product_service: Arc<ProductService>,
    pub order_service: Arc<OrderService>,
    pub booking_service: Arc<BookingService>,
    pub payment_service: Arc<PaymentService>,
    pub analytics_service: Arc<AnalyticsService>,
}

/// Response for seeding operations
#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub products_created: usize,
    pub timestamp: String,
}

/// Optional RFC 3339 bounds for payment analytics
#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsWindow {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Create admin router with catalog, fulfilment and payment endpoints
pub fn create_admin_router(state: AdminState) -> Router {
    Router::new()
        // Catalog management
        .route("/api/admin/products", get(list_all_products).post(create_product))
        .route(
            "/api/admin/products/:id",
            put(update_product).delete(delete_product),
        )
        .route("/api/admin/seed", post(seed_catalog))
        // Orders and bookings
        .route("/api/admin/orders", get(list_all_orders))
        .route("/api/admin/orders/:id/status", put(update_order_status))
        .route("/api/admin/bookings", get(list_all_bookings))
        .route("/api/admin/bookings/:id/status", put(update_booking_status))
        .route("/api/admin/bookings/:id/technician", put(assign_technician))
        // Reporting and payments
        .route("/api/admin/analytics", get(store_analytics))
        .route("/api/admin/payments/analytics", get(payment_analytics))
        .route("/api/admin/payments/:id/refund", post(refund_payment))
        .route("/api/admin/payments/:id/collect", post(collect_payment))
        .with_state(state)
}

// =============================================================================
// CATALOG
// =============================================================================

#[instrument(name = "admin_list_products", skip(state))]
pub async fn list_all_products(State(state): State<AdminState>) -> ApiResult<Json<Vec<Product>>> {
    state
        .product_service
        .all_products()
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "create_product", skip(state, request), fields(
    name = %request.name,
    category = %request.category,
))]
pub async fn create_product(
    State(state): State<AdminState>,
    Json(request): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    match state.product_service.create_product(request).await {
        Ok(product) => {
            info!("Created product {} ({})", product.name, product.id);
            Ok((StatusCode::CREATED, Json(product)))
        }
        Err(err) => {
            error!("Failed to create product: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "update_product", skip(state, request), fields(product_id = %id))]
pub async fn update_product(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> ApiResult<Json<Product>> {
    match state.product_service.update_product(&id, request).await {
        Ok(product) => {
            info!("Updated product {}", id);
            Ok(Json(product))
        }
        Err(err) => {
            error!("Failed to update product {}: {}", id, err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "delete_product", skip(state), fields(product_id = %id))]
pub async fn delete_product(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    match state.product_service.delete_product(&id).await {
        Ok(()) => {
            info!("Deleted product {}", id);
            Ok(StatusCode::NO_CONTENT)
        }
        Err(err) => {
            error!("Failed to delete product {}: {}", id, err);
            Err(service_error_to_response(err))
        }
    }
}

/// Replace the catalog with the sample products
#[instrument(name = "seed_catalog", skip(state))]
pub async fn seed_catalog(State(state): State<AdminState>) -> ApiResult<Json<SeedResponse>> {
    let timestamp = Utc::now().to_rfc3339();

    match state
        .product_service
        .seed_catalog(create_sample_products())
        .await
    {
        Ok(count) => {
            info!("Seeded catalog with {} products", count);
            Ok(Json(SeedResponse {
                message: format!("Catalog seeded successfully with {} products", count),
                products_created: count,
                timestamp,
            }))
        }
        Err(err) => {
            error!("Failed to seed catalog: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

// =============================================================================
// ORDERS AND BOOKINGS
// =============================================================================

#[instrument(name = "admin_list_orders", skip(state))]
pub async fn list_all_orders(State(state): State<AdminState>) -> ApiResult<Json<Vec<Order>>> {
    state
        .order_service
        .all_orders()
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "update_order_status", skip(state, request), fields(
    order_id = %id,
    status = %request.status,
))]
pub async fn update_order_status(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> ApiResult<Json<Order>> {
    state
        .order_service
        .update_order_status(&id, request.status)
        .await
        .map(Json)
        .map_err(|err| {
            error!("Failed to update order {}: {}", id, err);
            service_error_to_response(err)
        })
}

#[instrument(name = "admin_list_bookings", skip(state))]
pub async fn list_all_bookings(
    State(state): State<AdminState>,
) -> ApiResult<Json<Vec<ServiceBooking>>> {
    state
        .booking_service
        .all_bookings()
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "update_booking_status", skip(state, request), fields(
    booking_id = %id,
    status = %request.status,
))]
pub async fn update_booking_status(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> ApiResult<Json<ServiceBooking>> {
    state
        .booking_service
        .update_booking_status(&id, request)
        .await
        .map(Json)
        .map_err(|err| {
            error!("Failed to update booking {}: {}", id, err);
            service_error_to_response(err)
        })
}

#[instrument(name = "assign_technician", skip(state, request), fields(booking_id = %id))]
pub async fn assign_technician(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    Json(request): Json<AssignTechnicianRequest>,
) -> ApiResult<Json<ServiceBooking>> {
    state
        .booking_service
        .assign_technician(&id, request)
        .await
        .map(Json)
        .map_err(|err| {
            error!("Failed to assign technician to booking {}: {}", id, err);
            service_error_to_response(err)
        })
}

// =============================================================================
// ANALYTICS AND PAYMENTS
// =============================================================================

#[instrument(name = "store_analytics", skip(state))]
pub async fn store_analytics(State(state): State<AdminState>) -> ApiResult<Json<StoreAnalytics>> {
    state
        .analytics_service
        .analytics()
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "payment_analytics", skip(state))]
pub async fn payment_analytics(
    State(state): State<AdminState>,
    Query(window): Query<AnalyticsWindow>,
) -> ApiResult<Json<PaymentAnalytics>> {
    state
        .payment_service
        .payment_analytics(window.from, window.to)
        .await
        .map(Json)
        .map_err(service_error_to_response)
}

#[instrument(name = "refund_payment", skip(state), fields(payment_id = %id))]
pub async fn refund_payment(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Payment>> {
    match state.payment_service.refund(&id).await {
        Ok(payment) => {
            info!("Refunded payment {} of {}", payment.id, payment.amount);
            Ok(Json(payment))
        }
        Err(err) => {
            error!("Failed to refund payment {}: {}", id, err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "collect_payment", skip(state), fields(payment_id = %id))]
pub async fn collect_payment(
    State(state): State<AdminState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Payment>> {
    match state.payment_service.collect_cod(&id).await {
        Ok(payment) => {
            info!("Collected cash for payment {}", payment.id);
            Ok(Json(payment))
        }
        Err(err) => {
            error!("Failed to collect payment {}: {}", id, err);
            Err(service_error_to_response(err))
        }
    }
}

// =============================================================================
// SAMPLE DATA
// =============================================================================

fn unsplash(photo: &str) -> Vec<String> {
    vec![format!(
        "https://images.unsplash.com/{}?ixlib=rb-4.0.3&auto=format&fit=crop&w=400&h=400",
        photo
    )]
}

fn specs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// The starter catalog loaded at boot and by `POST /api/admin/seed`
pub fn create_sample_products() -> Vec<Product> {
    vec![
        CreateProductRequest {
            name: "Digital Multimeter Pro".to_string(),
            description: "Professional-grade digital multimeter with auto-ranging, data logging, and PC connectivity. Essential tool for electrical testing and troubleshooting.".to_string(),
            price: dec!(2499),
            category: "tools".to_string(),
            images: unsplash("photo-1581092062292-b9aef1b8c14f"),
            stock: 25,
            rating: 4.8,
            brand: "Fluke".to_string(),
            specs: specs(&[
                ("accuracy", "±0.025%"),
                ("display", "6000 count LCD"),
                ("voltage", "1000V AC/DC"),
                ("current", "10A AC/DC"),
                ("resistance", "60MΩ"),
                ("frequency", "60kHz"),
            ]),
            featured: true,
        },
        CreateProductRequest {
            name: "Wire Stripping Pliers".to_string(),
            description: "Heavy-duty wire strippers with comfort grip handles. Precision jaws for clean cuts and perfect strips every time.".to_string(),
            price: dec!(899),
            category: "tools".to_string(),
            images: unsplash("photo-1504148455328-c376907d081c"),
            stock: 50,
            rating: 4.6,
            brand: "Klein Tools".to_string(),
            specs: specs(&[
                ("wireRange", "10-22 AWG"),
                ("length", "8 inches"),
                ("material", "High carbon steel"),
                ("grip", "Cushioned handles"),
            ]),
            featured: false,
        },
        CreateProductRequest {
            name: "Premium Switch Set".to_string(),
            description: "Modular switch set with premium finish and safety features. Complete with matching wall plates.".to_string(),
            price: dec!(1299),
            category: "switches".to_string(),
            images: unsplash("photo-1558618666-fcd25c85cd64"),
            stock: 30,
            rating: 4.9,
            brand: "Legrand".to_string(),
            specs: specs(&[
                ("voltage", "240V AC"),
                ("current", "16A"),
                ("material", "Fire-retardant PC"),
                ("finish", "Matt white"),
                ("warranty", "10 years"),
            ]),
            featured: true,
        },
        CreateProductRequest {
            name: "MCB Circuit Breaker".to_string(),
            description: "32A miniature circuit breaker with C-curve characteristics. Reliable protection for electrical circuits.".to_string(),
            price: dec!(450),
            category: "breakers".to_string(),
            images: unsplash("photo-1621905251189-08b45d6a269e"),
            stock: 100,
            rating: 4.7,
            brand: "Schneider Electric".to_string(),
            specs: specs(&[
                ("rating", "32A"),
                ("poles", "Single pole"),
                ("curve", "C-curve"),
                ("breakingCapacity", "6kA"),
                ("standard", "IS 8828"),
            ]),
            featured: false,
        },
        CreateProductRequest {
            name: "LED Panel Light 18W".to_string(),
            description: "Energy-efficient LED panel light with uniform illumination. Perfect for offices and homes.".to_string(),
            price: dec!(750),
            category: "lighting".to_string(),
            images: unsplash("photo-1565814329452-e1efa11c5b89"),
            stock: 75,
            rating: 4.5,
            brand: "Philips".to_string(),
            specs: specs(&[
                ("power", "18W"),
                ("lumens", "1800lm"),
                ("colorTemp", "4000K"),
                ("size", "300x300mm"),
                ("lifespan", "25000 hours"),
            ]),
            featured: false,
        },
        CreateProductRequest {
            name: "Electrical Wire 2.5mm²".to_string(),
            description: "High-quality copper electrical wire for house wiring. ISI marked and BIS certified.".to_string(),
            price: dec!(180),
            category: "wires".to_string(),
            images: unsplash("photo-1509087859087-a384654eca4d"),
            stock: 200,
            rating: 4.4,
            brand: "Havells".to_string(),
            specs: specs(&[
                ("crossSection", "2.5mm²"),
                ("material", "Copper"),
                ("insulation", "PVC"),
                ("voltage", "1100V"),
                ("length", "90 meters"),
            ]),
            featured: false,
        },
    ]
    .into_iter()
    .map(Product::new)
    .collect()
}
