use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{generate_id, OrderStatus, PaymentMethod, PaymentStatus, PriceBreakdown};

/// A placed order with a snapshot of the purchased lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_id: Option<String>,
    pub shipping_address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Full order body, as submitted by clients that priced the cart themselves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
}

/// Checkout of a server-side cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

impl Order {
    /// New orders always start unpaid and pending; status fields sent by clients are ignored
    pub fn new(request: CreateOrderRequest) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id("ORD-", 12),
            user_id: request.user_id,
            items: request.items,
            subtotal: request.subtotal,
            tax: request.tax,
            shipping: request.shipping,
            total: request.total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: request.payment_method,
            payment_id: None,
            shipping_address: request.shipping_address,
            created_at: now,
            updated_at: now,
        }
    }

    /// Build a pending order from priced cart lines
    pub fn from_checkout(
        user_id: String,
        items: Vec<OrderItem>,
        pricing: PriceBreakdown,
        checkout: CheckoutRequest,
    ) -> Self {
        Self::new(CreateOrderRequest {
            user_id,
            items,
            subtotal: pricing.subtotal,
            tax: pricing.tax,
            shipping: pricing.shipping,
            total: pricing.total,
            payment_method: checkout.payment_method,
            shipping_address: checkout.shipping_address,
        })
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn set_payment(&mut self, payment_id: String, payment_status: PaymentStatus) {
        self.payment_id = Some(payment_id);
        self.payment_status = payment_status;
        self.updated_at = Utc::now();
    }

    /// Cancelled orders never count towards revenue
    pub fn counts_as_revenue(&self) -> bool {
        self.status != OrderStatus::Cancelled
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Arun Kumar".to_string(),
            phone: "9876543210".to_string(),
            address: "12 North Masi Street".to_string(),
            city: "Madurai".to_string(),
            state: "Tamil Nadu".to_string(),
            pincode: "625001".to_string(),
        }
    }

    #[test]
    fn test_order_from_checkout() {
        let items = vec![OrderItem {
            product_id: "P001".to_string(),
            name: "MCB Circuit Breaker".to_string(),
            price: dec!(450),
            quantity: 2,
            image: String::new(),
        }];
        let pricing = PriceBreakdown {
            subtotal: dec!(900),
            tax: dec!(162),
            shipping: dec!(50),
            total: dec!(1112),
        };

        let order = Order::from_checkout(
            "user-1".to_string(),
            items,
            pricing,
            CheckoutRequest {
                payment_method: PaymentMethod::Cod,
                shipping_address: address(),
            },
        );

        assert!(order.id.starts_with("ORD-"));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.total, dec!(1112));
        assert_eq!(order.item_count(), 2);
        assert_eq!(order.items[0].line_total(), dec!(900));
    }

    #[test]
    fn test_new_order_ignores_client_payment_state() {
        let json = r#"{
            "user_id": "user-1",
            "items": [{"product_id": "P001", "name": "Wire", "price": "180", "quantity": 1}],
            "subtotal": "180", "tax": "32.40", "shipping": "50", "total": "262.40",
            "status": "delivered",
            "payment_status": "completed",
            "payment_id": "pay_made_up",
            "payment_method": "upi",
            "shipping_address": {
                "name": "A", "phone": "9876543210", "address": "X",
                "city": "Madurai", "state": "TN", "pincode": "625001"
            }
        }"#;

        let request: CreateOrderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.items[0].image, "");

        let order = Order::new(request);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.payment_id, None);
    }

    #[test]
    fn test_cancelled_orders_do_not_count_as_revenue() {
        let mut order = Order::from_checkout(
            "user-1".to_string(),
            vec![],
            PriceBreakdown::default(),
            CheckoutRequest {
                payment_method: PaymentMethod::Card,
                shipping_address: address(),
            },
        );
        assert!(order.counts_as_revenue());

        order.set_status(OrderStatus::Cancelled);
        assert!(!order.counts_as_revenue());
    }
}
