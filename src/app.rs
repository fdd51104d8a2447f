use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::config::Config;
use crate::handlers::{
    create_admin_router, create_booking_router, create_cart_router, create_order_router,
    create_payment_router, create_product_router, create_sample_products, health_check,
    metrics_handler, request_validation_middleware, security_headers_middleware, AdminState,
    RequestLimits,
};
use crate::models::ServiceResult;
use crate::observability::{observability_middleware, Metrics};
use crate::repositories::{
    InMemoryBookingRepository, InMemoryCartRepository, InMemoryOrderRepository,
    InMemoryPaymentRepository, InMemoryProductRepository,
};
use crate::services::{
    AnalyticsService, BookingService, CartService, OrderService, PaymentGateway, PaymentService,
    ProductService,
};

/// Every service the HTTP layer talks to
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub carts: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub bookings: Arc<BookingService>,
    pub payments: Arc<PaymentService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppServices {
    /// Wire services over fresh in-memory stores, settling payments through `gateway`
    pub fn in_memory(
        config: &Config,
        gateway: Arc<dyn PaymentGateway>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let product_repository = Arc::new(InMemoryProductRepository::new());
        let cart_repository = Arc::new(InMemoryCartRepository::new());
        let order_repository = Arc::new(InMemoryOrderRepository::new());
        let booking_repository = Arc::new(InMemoryBookingRepository::new());
        let payment_repository = Arc::new(InMemoryPaymentRepository::new());

        let pricing = config.store.pricing_policy();

        let products =
            Arc::new(ProductService::new(product_repository.clone()).with_metrics(metrics.clone()));
        let carts = Arc::new(
            CartService::new(cart_repository.clone(), product_repository.clone(), pricing)
                .with_metrics(metrics.clone()),
        );
        let orders = Arc::new(
            OrderService::new(
                order_repository.clone(),
                product_repository.clone(),
                cart_repository,
                pricing,
            )
            .with_metrics(metrics.clone()),
        );
        let bookings = Arc::new(
            BookingService::new(booking_repository.clone()).with_metrics(metrics.clone()),
        );
        let payments = Arc::new(
            PaymentService::new(
                payment_repository,
                gateway,
                orders.clone(),
                config.store.merchant(),
            )
            .with_metrics(metrics),
        );
        let analytics = Arc::new(AnalyticsService::new(
            product_repository,
            order_repository,
            booking_repository,
            config.store.low_stock_threshold,
        ));

        Self {
            products,
            carts,
            orders,
            bookings,
            payments,
            analytics,
        }
    }

    /// Load the sample catalog when the store is configured to start with one
    pub async fn seed_if_configured(&self, config: &Config) -> ServiceResult<usize> {
        if !config.store.seed_catalog {
            info!("Catalog seeding disabled");
            return Ok(0);
        }
        self.products.seed_catalog(create_sample_products()).await
    }
}

/// Assemble the full router with its middleware stack
pub fn create_app(services: AppServices, config: &Config, metrics: Arc<Metrics>) -> Router {
    let metrics_for_middleware = metrics.clone();
    let limits = RequestLimits {
        max_request_size: config.server.max_request_size as u64,
    };

    let admin_state = AdminState {
        product_service: services.products.clone(),
        order_service: services.orders.clone(),
        booking_service: services.bookings.clone(),
        payment_service: services.payments.clone(),
        analytics_service: services.analytics.clone(),
    };

    Router::new()
        .route("/health/status", get(health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(metrics)
        .merge(create_product_router(services.products))
        .merge(create_cart_router(services.carts, services.orders.clone()))
        .merge(create_order_router(services.orders))
        .merge(create_booking_router(services.bookings))
        .merge(create_payment_router(services.payments))
        .merge(create_admin_router(admin_state))
        // Layers run bottom-up: observability sees every request first
        .layer(DefaultBodyLimit::max(config.server.max_request_size))
        .layer(middleware::from_fn_with_state(
            limits,
            request_validation_middleware,
        ))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(move |req, next| {
            observability_middleware(metrics_for_middleware.clone(), req, next)
        }))
}
