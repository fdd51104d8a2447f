use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{generate_id, PaymentMethod, PaymentStatus};

pub const CURRENCY: &str = "INR";

/// A simulated payment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub currency: String,
    pub status: PaymentStatus,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub description: String,
    pub upi_id: Option<String>,
    pub card_last4: Option<String>,
    pub card_brand: Option<CardBrand>,
    pub delivery_address: Option<String>,
    pub order_id: Option<String>,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Jcb,
    Unknown,
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardBrand::Visa => write!(f, "Visa"),
            CardBrand::Mastercard => write!(f, "Mastercard"),
            CardBrand::Amex => write!(f, "American Express"),
            CardBrand::Discover => write!(f, "Discover"),
            CardBrand::Jcb => write!(f, "JCB"),
            CardBrand::Unknown => write!(f, "Unknown"),
        }
    }
}

impl CardBrand {
    /// Detect the card network from the leading digits
    pub fn detect(card_number: &str) -> Self {
        let digits = clean_card_number(card_number);
        let prefix = |len: usize| -> Option<u32> { digits.get(..len)?.parse().ok() };

        match (prefix(1), prefix(2), prefix(4)) {
            (Some(4), _, _) => CardBrand::Visa,
            (_, Some(51..=55), _) => CardBrand::Mastercard,
            (_, Some(34) | Some(37), _) => CardBrand::Amex,
            (_, _, Some(3528..=3589)) => CardBrand::Jcb,
            (Some(6), _, _) => CardBrand::Discover,
            _ => CardBrand::Unknown,
        }
    }

    pub fn cvv_length(&self) -> usize {
        match self {
            CardBrand::Amex => 4,
            _ => 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpiPaymentRequest {
    pub amount: Decimal,
    pub upi_id: String,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CardPaymentRequest {
    pub amount: Decimal,
    pub card_number: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: String,
    pub card_holder_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

// Card data must never reach the logs.
impl fmt::Debug for CardPaymentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardPaymentRequest")
            .field("amount", &self.amount)
            .field("card_last4", &card_last4(&self.card_number))
            .field("card_holder_name", &self.card_holder_name)
            .field("customer_email", &self.customer_email)
            .field("order_id", &self.order_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodPaymentRequest {
    pub amount: Decimal,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub address: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// Returned when a payment is initiated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_link: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusResponse {
    pub id: String,
    pub status: PaymentStatus,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodBreakdown {
    pub count: u64,
    pub amount: Decimal,
}

/// Aggregates over the payments created in a time window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentAnalytics {
    pub total_payments: u64,
    pub total_amount: Decimal,
    pub successful_payments: u64,
    pub failed_payments: u64,
    pub refunds: u64,
    pub pending_payments: u64,
    pub by_method: BTreeMap<PaymentMethod, MethodBreakdown>,
}

impl Payment {
    fn new(
        method: PaymentMethod,
        status: PaymentStatus,
        amount: Decimal,
        customer_name: &str,
        customer_email: &str,
        description: Option<String>,
        order_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id("pay_", 14),
            method,
            amount,
            currency: CURRENCY.to_string(),
            status,
            customer_name: customer_name.trim().to_string(),
            customer_email: customer_email.trim().to_string(),
            customer_phone: None,
            description: description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "Electricals purchase".to_string()),
            upi_id: None,
            card_last4: None,
            card_brand: None,
            delivery_address: None,
            order_id: order_id.filter(|id| !id.trim().is_empty()),
            failure_reason: None,
            created_at: now,
            completed_at: None,
            updated_at: now,
        }
    }

    pub fn upi(request: UpiPaymentRequest) -> Self {
        let mut payment = Self::new(
            PaymentMethod::Upi,
            PaymentStatus::Pending,
            request.amount,
            &request.customer_name,
            &request.customer_email,
            request.description,
            request.order_id,
        );
        payment.upi_id = Some(request.upi_id.trim().to_string());
        payment
    }

    /// Only the last four digits and the brand are retained
    pub fn card(request: CardPaymentRequest) -> Self {
        let mut payment = Self::new(
            PaymentMethod::Card,
            PaymentStatus::Processing,
            request.amount,
            &request.card_holder_name,
            &request.customer_email,
            request.description,
            request.order_id,
        );
        payment.card_last4 = Some(card_last4(&request.card_number));
        payment.card_brand = Some(CardBrand::detect(&request.card_number));
        payment
    }

    pub fn cod(request: CodPaymentRequest) -> Self {
        let mut payment = Self::new(
            PaymentMethod::Cod,
            PaymentStatus::Pending,
            request.amount,
            &request.customer_name,
            &request.customer_email,
            request.description,
            request.order_id,
        );
        payment.customer_phone = Some(request.customer_phone.trim().to_string());
        payment.delivery_address = Some(request.address.trim().to_string());
        payment
    }

    /// Apply a status change if the lifecycle allows it
    pub fn transition(&mut self, next: PaymentStatus, failure_reason: Option<String>) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }

        let now = Utc::now();
        self.status = next;
        self.updated_at = now;
        match next {
            PaymentStatus::Completed => self.completed_at = Some(now),
            PaymentStatus::Failed => self.failure_reason = failure_reason,
            _ => {}
        }
        true
    }

    pub fn status_response(&self) -> PaymentStatusResponse {
        PaymentStatusResponse {
            id: self.id.clone(),
            status: self.status,
            amount: self.amount,
            method: self.method,
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}

impl PaymentAnalytics {
    pub fn from_payments<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> Self {
        let mut analytics = Self::default();
        for payment in payments {
            analytics.total_payments += 1;
            analytics.total_amount += payment.amount;
            match payment.status {
                PaymentStatus::Completed => analytics.successful_payments += 1,
                PaymentStatus::Failed => analytics.failed_payments += 1,
                PaymentStatus::Refunded => analytics.refunds += 1,
                PaymentStatus::Pending | PaymentStatus::Processing => {
                    analytics.pending_payments += 1
                }
            }

            let breakdown = analytics.by_method.entry(payment.method).or_default();
            breakdown.count += 1;
            breakdown.amount += payment.amount;
        }
        analytics
    }
}

pub fn clean_card_number(card_number: &str) -> String {
    card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

pub fn card_last4(card_number: &str) -> String {
    let digits: Vec<char> = clean_card_number(card_number).chars().collect();
    let start = digits.len().saturating_sub(4);
    digits[start..].iter().collect()
}

/// Luhn checksum over a 13 to 19 digit card number; spaces and dashes are ignored
pub fn luhn_valid(card_number: &str) -> bool {
    let digits = clean_card_number(card_number);
    if !(13..=19).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let sum: u32 = digits
        .bytes()
        .rev()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .map(|(i, digit)| {
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();

    sum % 10 == 0
}

/// A card is valid through the last day of its expiry month.
/// Two-digit years are read as 20xx.
pub fn expiry_valid(month: u32, year: i32, today: NaiveDate) -> bool {
    if !(1..=12).contains(&month) {
        return false;
    }
    let year = if (0..100).contains(&year) { 2000 + year } else { year };
    (year, month) >= (today.year(), today.month())
}

/// Build a UPI deep link for the merchant collecting `amount`
pub fn upi_link(
    merchant_vpa: &str,
    merchant_name: &str,
    transaction_ref: &str,
    note: &str,
    amount: Decimal,
) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("pa", merchant_vpa)
        .append_pair("pn", merchant_name)
        .append_pair("tr", transaction_ref)
        .append_pair("tn", note)
        .append_pair("am", &format!("{:.2}", amount))
        .append_pair("cu", CURRENCY)
        .finish();
    format!("upi://pay?{}", query)
}
