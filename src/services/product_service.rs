use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    CreateProductRequest, Product, ProductFilters, ServiceError, ServiceResult,
    UpdateProductRequest, Validate,
};
use crate::observability::Metrics;
use crate::repositories::ProductRepository;

/// Service for browsing and administering the catalog
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
    metrics: Option<Arc<Metrics>>,
}

impl ProductService {
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self {
            repository,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn record(&self, operation: &str, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_product_operation(operation, success);
        }
    }

    /// List products matching the filters
    #[instrument(skip(self), fields(filters = ?filters))]
    pub async fn list_products(&self, filters: ProductFilters) -> ServiceResult<Vec<Product>> {
        crate::info_with_trace!("Listing products with filters");

        let products = self.repository.find_all(filters).await?;

        crate::info_with_trace!("Found {} products matching criteria", products.len());
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> ServiceResult<Vec<Product>> {
        self.list_products(ProductFilters {
            featured: true,
            ..Default::default()
        })
        .await
    }

    /// Every product, for the admin catalog view
    #[instrument(skip(self))]
    pub async fn all_products(&self) -> ServiceResult<Vec<Product>> {
        self.list_products(ProductFilters::default()).await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn get_product(&self, id: &str) -> ServiceResult<Product> {
        crate::info_with_trace!("Retrieving product details");

        if id.trim().is_empty() {
            return Err(ServiceError::ValidationError {
                message: "Product ID cannot be empty".to_string(),
            });
        }

        match self.repository.find_by_id(id).await? {
            Some(product) => Ok(product),
            None => {
                crate::warn_with_trace!("Product not found");
                Err(ServiceError::ProductNotFound { id: id.to_string() })
            }
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name, category = %request.category))]
    pub async fn create_product(&self, request: CreateProductRequest) -> ServiceResult<Product> {
        crate::info_with_trace!("Creating new product");

        if let Err(err) = request.validate() {
            self.record("create", false);
            return Err(err.into());
        }

        let created = self.repository.create(Product::new(request)).await?;
        self.record("create", true);

        crate::info_with_trace!("Product created successfully with ID: {}", created.id);
        Ok(created)
    }

    #[instrument(skip(self, request), fields(id = %id))]
    pub async fn update_product(
        &self,
        id: &str,
        request: UpdateProductRequest,
    ) -> ServiceResult<Product> {
        crate::info_with_trace!("Updating product");

        if let Err(err) = request.validate() {
            self.record("update", false);
            return Err(err.into());
        }

        let mut product = self.get_product(id).await?;
        product.update(request);

        let updated = self.repository.update(product).await?;
        self.record("update", true);

        crate::info_with_trace!("Product updated successfully");
        Ok(updated)
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete_product(&self, id: &str) -> ServiceResult<()> {
        crate::info_with_trace!("Deleting product");

        // Resolve first so a missing product maps to ProductNotFound
        self.get_product(id).await?;
        self.repository.delete(id).await?;
        self.record("delete", true);

        crate::info_with_trace!("Product deleted successfully");
        Ok(())
    }

    /// Replace the catalog with `products`, returning how many were loaded
    #[instrument(skip(self, products), fields(count = products.len()))]
    pub async fn seed_catalog(&self, products: Vec<Product>) -> ServiceResult<usize> {
        crate::info_with_trace!("Seeding catalog");

        let loaded = self.repository.replace_all(products).await?;
        self.record("seed", true);

        crate::info_with_trace!("Catalog seeded with {} products", loaded);
        Ok(loaded)
    }

    pub async fn count_products(&self) -> ServiceResult<usize> {
        Ok(self.repository.count().await?)
    }
}
