use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn, Instrument};

use super::storage_span;
use crate::models::{sort_products, Product, ProductFilters, RepositoryError, RepositoryResult};

/// Trait defining the interface for catalog data access operations
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Find all products matching the filters, in the requested order
    async fn find_all(&self, filters: ProductFilters) -> RepositoryResult<Vec<Product>>;

    /// Find a product by its ID
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Product>>;

    async fn create(&self, product: Product) -> RepositoryResult<Product>;

    /// Replace an existing product
    async fn update(&self, product: Product) -> RepositoryResult<Product>;

    /// Hard delete a product
    async fn delete(&self, id: &str) -> RepositoryResult<()>;

    async fn count(&self) -> RepositoryResult<usize>;

    /// Check every line against current stock and decrement all of them,
    /// or none when any line falls short
    async fn reserve_stock(&self, lines: &[(String, u32)]) -> RepositoryResult<Vec<Product>>;

    /// Drop the whole catalog and load `products` in its place
    async fn replace_all(&self, products: Vec<Product>) -> RepositoryResult<usize>;
}

/// In-memory implementation of the ProductRepository trait
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<String, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: RwLock::new(products.into_iter().map(|p| (p.id.clone(), p)).collect()),
        }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    #[instrument(skip(self, filters), fields(category = ?filters.category, sort = ?filters.sort))]
    async fn find_all(&self, filters: ProductFilters) -> RepositoryResult<Vec<Product>> {
        let mut products: Vec<Product> = async {
            self.products
                .read()
                .await
                .values()
                .filter(|product| product.matches_filters(&filters))
                .cloned()
                .collect()
        }
        .instrument(storage_span("products", "scan"))
        .await;
        sort_products(&mut products, filters.sort);

        info!(count = products.len(), "Products scanned");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> RepositoryResult<Option<Product>> {
        let product = async { self.products.read().await.get(id).cloned() }
            .instrument(storage_span("products", "get"))
            .await;
        Ok(product)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn create(&self, product: Product) -> RepositoryResult<Product> {
        let mut products = self
            .products
            .write()
            .instrument(storage_span("products", "put"))
            .await;

        if products.contains_key(&product.id) {
            warn!("Product already exists");
            return Err(RepositoryError::AlreadyExists {
                id: product.id.clone(),
            });
        }

        products.insert(product.id.clone(), product.clone());
        info!("Product created");
        Ok(product)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: Product) -> RepositoryResult<Product> {
        let mut products = self
            .products
            .write()
            .instrument(storage_span("products", "put"))
            .await;

        match products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                info!("Product updated");
                Ok(product)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        let removed = async { self.products.write().await.remove(id) }
            .instrument(storage_span("products", "delete"))
            .await;

        match removed {
            Some(_) => {
                info!("Product deleted");
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn count(&self) -> RepositoryResult<usize> {
        Ok(self.products.read().await.len())
    }

    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    async fn reserve_stock(&self, lines: &[(String, u32)]) -> RepositoryResult<Vec<Product>> {
        let mut products = self
            .products
            .write()
            .instrument(storage_span("products", "reserve"))
            .await;

        // The same product may appear on several lines
        let mut requested: HashMap<&str, u32> = HashMap::new();
        for (product_id, quantity) in lines {
            *requested.entry(product_id.as_str()).or_default() += quantity;
        }

        for (product_id, quantity) in &requested {
            let available = products.get(*product_id).map(|p| p.stock).unwrap_or(0);
            if available < *quantity {
                warn!(%product_id, requested = quantity, available, "Stock reservation rejected");
                return Err(RepositoryError::StockShortfall {
                    product_id: product_id.to_string(),
                    requested: *quantity,
                    available,
                });
            }
        }

        let now = chrono::Utc::now();
        let mut reserved = Vec::with_capacity(requested.len());
        for (product_id, quantity) in requested {
            if let Some(product) = products.get_mut(product_id) {
                product.stock -= quantity;
                product.updated_at = now;
                reserved.push(product.clone());
            }
        }

        info!(products = reserved.len(), "Stock reserved");
        Ok(reserved)
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    async fn replace_all(&self, products: Vec<Product>) -> RepositoryResult<usize> {
        let count = products.len();

        let mut store = self
            .products
            .write()
            .instrument(storage_span("products", "replace"))
            .await;
        store.clear();
        store.extend(products.into_iter().map(|p| (p.id.clone(), p)));

        info!("Catalog replaced");
        Ok(count)
    }
}
