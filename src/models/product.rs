use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::{generate_id, ProductSort};

/// Catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub images: Vec<String>,
    pub stock: u32,
    pub rating: f64,
    pub brand: String,
    pub specs: BTreeMap<String, String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request model for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub stock: u32,
    #[serde(default)]
    pub rating: f64,
    pub brand: String,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    #[serde(default)]
    pub featured: bool,
}

/// Partial update of an existing product
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub stock: Option<u32>,
    pub rating: Option<f64>,
    pub brand: Option<String>,
    pub specs: Option<BTreeMap<String, String>>,
    pub featured: Option<bool>,
}

/// Filters for querying the catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub featured: bool,
    pub sort: ProductSort,
}

impl Product {
    /// Create a new Product with generated ID and timestamps
    pub fn new(request: CreateProductRequest) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id("P", 8),
            name: request.name.trim().to_string(),
            description: request.description.trim().to_string(),
            price: request.price,
            category: request.category.trim().to_lowercase(),
            images: request.images,
            stock: request.stock,
            rating: request.rating,
            brand: request.brand.trim().to_string(),
            specs: request.specs,
            featured: request.featured,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update(&mut self, request: UpdateProductRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            self.description = description.trim().to_string();
        }
        if let Some(price) = request.price {
            self.price = price;
        }
        if let Some(category) = request.category {
            self.category = category.trim().to_lowercase();
        }
        if let Some(images) = request.images {
            self.images = images;
        }
        if let Some(stock) = request.stock {
            self.stock = stock;
        }
        if let Some(rating) = request.rating {
            self.rating = rating;
        }
        if let Some(brand) = request.brand {
            self.brand = brand.trim().to_string();
        }
        if let Some(specs) = request.specs {
            self.specs = specs;
        }
        if let Some(featured) = request.featured {
            self.featured = featured;
        }
        self.updated_at = Utc::now();
    }

    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// First image, used as the thumbnail in carts and orders
    pub fn primary_image(&self) -> String {
        self.images.first().cloned().unwrap_or_default()
    }

    pub fn matches_filters(&self, filters: &ProductFilters) -> bool {
        if let Some(search) = &filters.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !self.name.to_lowercase().contains(&needle)
                && !self.description.to_lowercase().contains(&needle)
                && !self.brand.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        if let Some(category) = &filters.category {
            if !category.is_empty() && !self.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if filters.featured && !self.featured {
            return false;
        }

        true
    }
}

/// Sort products in place; ties keep a stable name order
pub fn sort_products(products: &mut [Product], sort: ProductSort) {
    let by_name = |a: &Product, b: &Product| a.name.to_lowercase().cmp(&b.name.to_lowercase());

    products.sort_by(|a, b| {
        let primary = match sort {
            ProductSort::PriceLow => a.price.cmp(&b.price),
            ProductSort::PriceHigh => b.price.cmp(&a.price),
            ProductSort::Rating => b.rating.total_cmp(&a.rating),
            ProductSort::Featured => b.featured.cmp(&a.featured),
            ProductSort::Name => Ordering::Equal,
        };
        primary.then_with(|| by_name(a, b))
    });
}
