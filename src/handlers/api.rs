use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

use super::errors::{service_error_to_response, ApiResult};
use crate::models::{Product, ProductFilters, ProductSort};
use crate::services::ProductService;

/// State for the public catalog endpoints
#[derive(Clone)]
pub struct ProductState {
    pub product_service: Arc<ProductService>,
}

/// Query parameters for listing products
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub featured: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total_count: usize,
}

/// Create the catalog router
pub fn create_product_router(product_service: Arc<ProductService>) -> Router {
    let state = ProductState { product_service };

    Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/featured", get(featured_products))
        .route("/api/products/:id", get(get_product))
        .with_state(state)
}

/// Blank parameters are treated as absent; `category=all` means no category filter
pub fn query_to_filters(query: ListProductsQuery) -> ProductFilters {
    let non_blank = |value: Option<String>| {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    ProductFilters {
        search: non_blank(query.search),
        category: non_blank(query.category).filter(|c| !c.eq_ignore_ascii_case("all")),
        featured: query.featured.unwrap_or(false),
        sort: non_blank(query.sort)
            .and_then(|s| s.parse().ok())
            .unwrap_or(ProductSort::Name),
    }
}

#[instrument(name = "list_products", skip(state), fields(
    search = query.search.as_deref(),
    category = query.category.as_deref(),
))]
pub async fn list_products(
    State(state): State<ProductState>,
    Query(query): Query<ListProductsQuery>,
) -> ApiResult<Json<ProductListResponse>> {
    let filters = query_to_filters(query);

    match state.product_service.list_products(filters).await {
        Ok(products) => {
            info!("Listed {} products", products.len());
            Ok(Json(ProductListResponse {
                total_count: products.len(),
                products,
            }))
        }
        Err(err) => {
            error!("Failed to list products: {}", err);
            Err(service_error_to_response(err))
        }
    }
}

#[instrument(name = "featured_products", skip(state))]
pub async fn featured_products(
    State(state): State<ProductState>,
) -> ApiResult<Json<Vec<Product>>> {
    state
        .product_service
        .featured_products()
        .await
        .map(Json)
        .map_err(|err| {
            error!("Failed to load featured products: {}", err);
            service_error_to_response(err)
        })
}

#[instrument(name = "get_product", skip(state), fields(product_id = %id))]
pub async fn get_product(
    State(state): State<ProductState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    match state.product_service.get_product(&id).await {
        Ok(product) => {
            info!("Retrieved product: {}", product.name);
            Ok(Json(product))
        }
        Err(err) => {
            error!("Failed to get product {}: {}", id, err);
            Err(service_error_to_response(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_to_filters() {
        let query = ListProductsQuery {
            search: Some("  multimeter ".to_string()),
            category: Some("tools".to_string()),
            sort: Some("price-high".to_string()),
            featured: Some(true),
        };

        let filters = query_to_filters(query);
        assert_eq!(filters.search.as_deref(), Some("multimeter"));
        assert_eq!(filters.category.as_deref(), Some("tools"));
        assert_eq!(filters.sort, ProductSort::PriceHigh);
        assert!(filters.featured);
    }

    #[test]
    fn test_query_to_filters_ignores_blank_and_all() {
        let query = ListProductsQuery {
            search: Some("   ".to_string()),
            category: Some("all".to_string()),
            sort: Some("bogus".to_string()),
            featured: None,
        };

        assert_eq!(query_to_filters(query), ProductFilters::default());
    }
}
