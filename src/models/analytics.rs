use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BookingStatus, Order, OrderStatus, Product, ServiceBooking};

/// Store-wide figures shown on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreAnalytics {
    pub total_products: u64,
    pub total_orders: u64,
    pub total_bookings: u64,
    pub total_revenue: Decimal,
    pub completed_orders: u64,
    pub pending_bookings: u64,
    pub low_stock_products: u64,
    pub monthly_revenue: Decimal,
}

impl StoreAnalytics {
    pub fn compute(
        products: &[Product],
        orders: &[Order],
        bookings: &[ServiceBooking],
        low_stock_threshold: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let revenue_orders = || orders.iter().filter(|order| order.counts_as_revenue());

        Self {
            total_products: products.len() as u64,
            total_orders: orders.len() as u64,
            total_bookings: bookings.len() as u64,
            total_revenue: revenue_orders().map(|order| order.total).sum(),
            completed_orders: orders
                .iter()
                .filter(|order| order.status == OrderStatus::Delivered)
                .count() as u64,
            pending_bookings: bookings
                .iter()
                .filter(|booking| booking.status == BookingStatus::Pending)
                .count() as u64,
            low_stock_products: products
                .iter()
                .filter(|product| product.stock < low_stock_threshold)
                .count() as u64,
            monthly_revenue: revenue_orders()
                .filter(|order| {
                    order.created_at.year() == now.year() && order.created_at.month() == now.month()
                })
                .map(|order| order.total)
                .sum(),
        }
    }
}
