use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Shopping cart for a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Individual item in a shopping cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub added_at: DateTime<Utc>,
}

/// Request model for adding an item to cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// Request model for updating cart item quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCartItemRequest {
    pub quantity: u32,
}

/// Cart with product details and a price breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub user_id: String,
    pub items: Vec<CartItemResponse>,
    pub total_items: u32,
    #[serde(flatten)]
    pub pricing: PriceBreakdown,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub is_available: bool,
    pub added_at: DateTime<Utc>,
}

/// Subtotal, GST, shipping and grand total for a set of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PriceBreakdown {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

/// Store-wide tax and shipping rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingPolicy {
    pub tax_rate: Decimal,
    pub shipping_fee: Decimal,
    pub free_shipping_threshold: Decimal,
}

impl PricingPolicy {
    pub fn quote(&self, subtotal: Decimal) -> PriceBreakdown {
        let tax = (subtotal * self.tax_rate)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let shipping = if subtotal.is_zero() || subtotal >= self.free_shipping_threshold {
            Decimal::ZERO
        } else {
            self.shipping_fee
        };

        PriceBreakdown {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }
}

impl Cart {
    pub fn new(user_id: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add an item to the cart or bump the quantity if it is already there
    pub fn add_item(&mut self, product_id: String, quantity: u32, unit_price: Decimal) {
        if let Some(existing_item) = self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            existing_item.quantity += quantity;
            existing_item.unit_price = unit_price;
        } else {
            self.items.push(CartItem::new(product_id, quantity, unit_price));
        }
        self.updated_at = Utc::now();
    }

    /// Returns false when the product is not in the cart; zero removes the line
    pub fn update_item_quantity(&mut self, product_id: &str, new_quantity: u32) -> bool {
        if new_quantity == 0 {
            return self.remove_item(product_id);
        }
        match self
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
        {
            Some(item) => {
                item.quantity = new_quantity;
                self.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let original_len = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        let removed = self.items.len() != original_len;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }

    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::total_price).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn contains_item(&self, product_id: &str) -> bool {
        self.get_item(product_id).is_some()
    }

    pub fn get_item_quantity(&self, product_id: &str) -> u32 {
        self.get_item(product_id)
            .map(|item| item.quantity)
            .unwrap_or(0)
    }
}

impl CartItem {
    pub fn new(product_id: String, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
            added_at: Utc::now(),
        }
    }

    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
