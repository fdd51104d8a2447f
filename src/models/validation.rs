use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use super::{
    expiry_valid, luhn_valid, AddCartItemRequest, AssignTechnicianRequest, CardBrand,
    CardPaymentRequest, CheckoutRequest, CodPaymentRequest, CreateBookingRequest,
    CreateOrderRequest, CreateProductRequest, ShippingAddress, UpdateCartItemRequest,
    UpdateProductRequest, UpiPaymentRequest, ValidationError, ValidationResult,
};

/// Trait for validating input models
pub trait Validate {
    fn validate(&self) -> ValidationResult<()>;
}

/// Validation constants
pub const MAX_PRODUCT_NAME_LENGTH: usize = 200;
pub const MIN_DESCRIPTION_LENGTH: usize = 10;
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;
pub const MAX_SHORT_TEXT_LENGTH: usize = 100;
pub const MAX_ADDRESS_LENGTH: usize = 500;
pub const MAX_NOTES_LENGTH: usize = 1000;
pub const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01
pub const MAX_PRICE: Decimal = Decimal::from_parts(99999999, 0, 0, false, 2); // 999999.99
pub const MAX_RATING: f64 = 5.0;
pub const MAX_STOCK_QUANTITY: u32 = 999_999;
pub const MIN_CART_QUANTITY: u32 = 1;
pub const MAX_CART_QUANTITY: u32 = 100;

/// India Standard Time, UTC+05:30
const STORE_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+91[\s-]?)?[0-9]{10}$").expect("valid phone pattern"));
static PINCODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{6}$").expect("valid pincode pattern"));
static UPI_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]{2,256}@[A-Za-z]{2,64}$").expect("valid UPI id pattern")
});

impl Validate for CreateProductRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_product_name(&self.name)?;
        validate_product_description(&self.description)?;
        validate_price("price", &self.price)?;
        validate_required_text("category", &self.category, MAX_SHORT_TEXT_LENGTH)?;
        validate_required_text("brand", &self.brand, MAX_SHORT_TEXT_LENGTH)?;
        validate_rating(self.rating)?;
        validate_stock_quantity(self.stock)?;
        Ok(())
    }
}

impl Validate for UpdateProductRequest {
    fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_product_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_product_description(description)?;
        }
        if let Some(price) = &self.price {
            validate_price("price", price)?;
        }
        if let Some(category) = &self.category {
            validate_required_text("category", category, MAX_SHORT_TEXT_LENGTH)?;
        }
        if let Some(brand) = &self.brand {
            validate_required_text("brand", brand, MAX_SHORT_TEXT_LENGTH)?;
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        if let Some(stock) = self.stock {
            validate_stock_quantity(stock)?;
        }
        Ok(())
    }
}

impl Validate for AddCartItemRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_product_id(&self.product_id)?;
        validate_cart_quantity(self.quantity)?;
        Ok(())
    }
}

impl Validate for UpdateCartItemRequest {
    fn validate(&self) -> ValidationResult<()> {
        // Zero removes the line
        if self.quantity > MAX_CART_QUANTITY {
            return Err(out_of_range("quantity", 0, MAX_CART_QUANTITY, self.quantity));
        }
        Ok(())
    }
}

impl Validate for ShippingAddress {
    fn validate(&self) -> ValidationResult<()> {
        validate_required_text("shipping_address.name", &self.name, MAX_SHORT_TEXT_LENGTH)?;
        validate_phone("shipping_address.phone", &self.phone)?;
        validate_required_text("shipping_address.address", &self.address, MAX_ADDRESS_LENGTH)?;
        validate_required_text("shipping_address.city", &self.city, MAX_SHORT_TEXT_LENGTH)?;
        validate_required_text("shipping_address.state", &self.state, MAX_SHORT_TEXT_LENGTH)?;
        validate_pincode(&self.pincode)?;
        Ok(())
    }
}

impl Validate for CheckoutRequest {
    fn validate(&self) -> ValidationResult<()> {
        self.shipping_address.validate()
    }
}

impl Validate for CreateOrderRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_user_id(&self.user_id)?;

        if self.items.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "items".to_string(),
            });
        }
        for (index, item) in self.items.iter().enumerate() {
            validate_product_id(&item.product_id)?;
            if item.quantity == 0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("items[{}].quantity", index),
                    value: item.quantity.to_string(),
                    reason: "Quantity must be at least 1".to_string(),
                });
            }
            validate_non_negative(&format!("items[{}].price", index), &item.price)?;
        }

        for (field, amount) in [
            ("subtotal", &self.subtotal),
            ("tax", &self.tax),
            ("shipping", &self.shipping),
            ("total", &self.total),
        ] {
            validate_non_negative(field, amount)?;
        }
        if self.subtotal + self.tax + self.shipping != self.total {
            return Err(ValidationError::InvalidValue {
                field: "total".to_string(),
                value: self.total.to_string(),
                reason: "Total must equal subtotal + tax + shipping".to_string(),
            });
        }

        self.shipping_address.validate()
    }
}

impl Validate for CreateBookingRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_required_text("name", &self.name, MAX_SHORT_TEXT_LENGTH)?;
        validate_phone("phone", &self.phone)?;
        if let Some(email) = self.email.as_deref().filter(|e| !e.trim().is_empty()) {
            validate_email("email", email)?;
        }
        validate_booking_date(&self.date, store_date(Utc::now()))?;
        validate_required_text("address", &self.address, MAX_ADDRESS_LENGTH)?;
        if let Some(notes) = &self.notes {
            if notes.trim().chars().count() > MAX_NOTES_LENGTH {
                return Err(ValidationError::TooLong {
                    field: "notes".to_string(),
                    max_length: MAX_NOTES_LENGTH,
                    actual_length: notes.trim().chars().count(),
                });
            }
        }
        Ok(())
    }
}

impl Validate for AssignTechnicianRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_required_text("technician_id", &self.technician_id, MAX_SHORT_TEXT_LENGTH)?;
        if let Some(cost) = &self.estimated_cost {
            validate_non_negative("estimated_cost", cost)?;
        }
        Ok(())
    }
}

impl Validate for UpiPaymentRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_amount(&self.amount)?;
        validate_upi_id(&self.upi_id)?;
        validate_required_text("customer_name", &self.customer_name, MAX_SHORT_TEXT_LENGTH)?;
        validate_email("customer_email", &self.customer_email)?;
        Ok(())
    }
}

impl Validate for CardPaymentRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_amount(&self.amount)?;
        validate_card_number(&self.card_number)?;
        validate_card_expiry(self.expiry_month, self.expiry_year, store_date(Utc::now()))?;
        validate_cvv(&self.cvv, CardBrand::detect(&self.card_number))?;
        validate_required_text(
            "card_holder_name",
            &self.card_holder_name,
            MAX_SHORT_TEXT_LENGTH,
        )?;
        validate_email("customer_email", &self.customer_email)?;
        Ok(())
    }
}

impl Validate for CodPaymentRequest {
    fn validate(&self) -> ValidationResult<()> {
        validate_amount(&self.amount)?;
        validate_required_text("customer_name", &self.customer_name, MAX_SHORT_TEXT_LENGTH)?;
        validate_email("customer_email", &self.customer_email)?;
        validate_phone("customer_phone", &self.customer_phone)?;
        validate_required_text("address", &self.address, MAX_ADDRESS_LENGTH)?;
        Ok(())
    }
}

fn out_of_range(field: &str, min: impl ToString, max: impl ToString, value: impl ToString) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: min.to_string(),
        max: max.to_string(),
        value: value.to_string(),
    }
}

/// Non-blank text no longer than `max_length` characters
pub fn validate_required_text(field: &str, value: &str, max_length: usize) -> ValidationResult<()> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }

    let length = trimmed.chars().count();
    if length > max_length {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max_length,
            actual_length: length,
        });
    }

    Ok(())
}

pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required_text("name", name, MAX_PRODUCT_NAME_LENGTH)?;

    if name
        .trim()
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\r' && c != '\t')
    {
        return Err(ValidationError::InvalidValue {
            field: "name".to_string(),
            value: name.to_string(),
            reason: "Contains invalid control characters".to_string(),
        });
    }

    Ok(())
}

pub fn validate_product_description(description: &str) -> ValidationResult<()> {
    validate_required_text("description", description, MAX_DESCRIPTION_LENGTH)?;

    let length = description.trim().chars().count();
    if length < MIN_DESCRIPTION_LENGTH {
        return Err(ValidationError::TooShort {
            field: "description".to_string(),
            min_length: MIN_DESCRIPTION_LENGTH,
            actual_length: length,
        });
    }

    Ok(())
}

/// Catalog price: 0.01 to 999999.99 with at most two decimal places
pub fn validate_price(field: &str, price: &Decimal) -> ValidationResult<()> {
    if *price < MIN_PRICE || *price > MAX_PRICE {
        return Err(out_of_range(field, MIN_PRICE, MAX_PRICE, price));
    }
    validate_scale(field, price)
}

pub fn validate_amount(amount: &Decimal) -> ValidationResult<()> {
    if *amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidValue {
            field: "amount".to_string(),
            value: amount.to_string(),
            reason: "Amount must be greater than zero".to_string(),
        });
    }
    validate_scale("amount", amount)
}

fn validate_non_negative(field: &str, value: &Decimal) -> ValidationResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Must not be negative".to_string(),
        });
    }
    Ok(())
}

fn validate_scale(field: &str, value: &Decimal) -> ValidationResult<()> {
    if value.normalize().scale() > 2 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Cannot have more than 2 decimal places".to_string(),
        });
    }
    Ok(())
}

pub fn validate_rating(rating: f64) -> ValidationResult<()> {
    if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
        return Err(out_of_range("rating", 0, MAX_RATING, rating));
    }
    Ok(())
}

pub fn validate_stock_quantity(quantity: u32) -> ValidationResult<()> {
    if quantity > MAX_STOCK_QUANTITY {
        return Err(out_of_range("stock", 0, MAX_STOCK_QUANTITY, quantity));
    }
    Ok(())
}

pub fn validate_cart_quantity(quantity: u32) -> ValidationResult<()> {
    if !(MIN_CART_QUANTITY..=MAX_CART_QUANTITY).contains(&quantity) {
        return Err(out_of_range(
            "quantity",
            MIN_CART_QUANTITY,
            MAX_CART_QUANTITY,
            quantity,
        ));
    }
    Ok(())
}

pub fn validate_product_id(product_id: &str) -> ValidationResult<()> {
    let trimmed = product_id.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "product_id".to_string(),
        });
    }

    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "product_id".to_string(),
            expected: "Alphanumeric characters, hyphens and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validate user ID format
pub fn validate_user_id(user_id: &str) -> ValidationResult<()> {
    let trimmed = user_id.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "user_id".to_string(),
        });
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "user_id".to_string(),
            expected: "User ID must contain only alphanumeric characters, hyphens, and underscores"
                .to_string(),
        });
    }

    if trimmed.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "user_id".to_string(),
            max_length: 128,
            actual_length: trimmed.len(),
        });
    }

    Ok(())
}

pub fn validate_email(field: &str, email: &str) -> ValidationResult<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }
    if !EMAIL_PATTERN.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            expected: "name@example.com".to_string(),
        });
    }
    Ok(())
}

/// Ten digits, optionally prefixed with +91
pub fn validate_phone(field: &str, phone: &str) -> ValidationResult<()> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: field.to_string(),
        });
    }
    if !PHONE_PATTERN.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            expected: "10 digit phone number, optionally prefixed with +91".to_string(),
        });
    }
    Ok(())
}

pub fn validate_pincode(pincode: &str) -> ValidationResult<()> {
    if !PINCODE_PATTERN.is_match(pincode.trim()) {
        return Err(ValidationError::InvalidFormat {
            field: "shipping_address.pincode".to_string(),
            expected: "6 digit pincode".to_string(),
        });
    }
    Ok(())
}

pub fn validate_upi_id(upi_id: &str) -> ValidationResult<()> {
    let trimmed = upi_id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::RequiredField {
            field: "upi_id".to_string(),
        });
    }
    if !UPI_ID_PATTERN.is_match(trimmed) {
        return Err(ValidationError::InvalidFormat {
            field: "upi_id".to_string(),
            expected: "handle@provider".to_string(),
        });
    }
    Ok(())
}

pub fn validate_card_number(card_number: &str) -> ValidationResult<()> {
    if !luhn_valid(card_number) {
        return Err(ValidationError::InvalidValue {
            field: "card_number".to_string(),
            value: "****".to_string(),
            reason: "Invalid card number".to_string(),
        });
    }
    Ok(())
}

pub fn validate_card_expiry(month: u32, year: i32, today: NaiveDate) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(out_of_range("expiry_month", 1, 12, month));
    }
    if !expiry_valid(month, year, today) {
        return Err(ValidationError::InvalidValue {
            field: "expiry".to_string(),
            value: format!("{:02}/{}", month, year),
            reason: "Card has expired".to_string(),
        });
    }
    Ok(())
}

pub fn validate_cvv(cvv: &str, brand: CardBrand) -> ValidationResult<()> {
    let expected = brand.cvv_length();
    if cvv.len() != expected || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "cvv".to_string(),
            expected: format!("{} digits", expected),
        });
    }
    Ok(())
}

/// Booking dates are `YYYY-MM-DD` and may not lie before `today`
/// Calendar date at the store for the given instant
pub fn store_date(now: DateTime<Utc>) -> NaiveDate {
    match FixedOffset::east_opt(STORE_UTC_OFFSET_SECS) {
        Some(offset) => now.with_timezone(&offset).date_naive(),
        None => now.date_naive(),
    }
}

pub fn validate_booking_date(date: &str, today: NaiveDate) -> ValidationResult<()> {
    let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: "date".to_string(),
            expected: "YYYY-MM-DD".to_string(),
        }
    })?;

    if parsed < today {
        return Err(ValidationError::InvalidValue {
            field: "date".to_string(),
            value: date.to_string(),
            reason: "Booking date cannot be in the past".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OrderItem, PaymentMethod, ServiceType, TimeSlot};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Arun".to_string(),
            phone: "+91 9876543210".to_string(),
            address: "12 North Masi Street".to_string(),
            city: "Madurai".to_string(),
            state: "Tamil Nadu".to_string(),
            pincode: "625001".to_string(),
        }
    }

    fn order_request() -> CreateOrderRequest {
        CreateOrderRequest {
            user_id: "user-1".to_string(),
            items: vec![OrderItem {
                product_id: "P001".to_string(),
                name: "MCB Circuit Breaker".to_string(),
                price: dec!(450),
                quantity: 1,
                image: String::new(),
            }],
            subtotal: dec!(450),
            tax: dec!(81),
            shipping: dec!(50),
            total: dec!(581),
            payment_method: PaymentMethod::Cod,
            shipping_address: address(),
        }
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Digital Multimeter Pro").is_ok());

        assert!(validate_product_name("").is_err());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"a".repeat(MAX_PRODUCT_NAME_LENGTH + 1)).is_err());
        assert!(validate_product_name("Test\x00Switch").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("price", &dec!(0.01)).is_ok());
        assert!(validate_price("price", &dec!(2499)).is_ok());
        assert!(validate_price("price", &dec!(999999.99)).is_ok());
        assert!(validate_price("price", &dec!(12.50)).is_ok());

        assert!(validate_price("price", &dec!(0)).is_err());
        assert!(validate_price("price", &dec!(-1)).is_err());
        assert!(validate_price("price", &dec!(1000000)).is_err());
        assert!(validate_price("price", &dec!(1.999)).is_err());
    }

    #[test]
    fn test_validate_rating_and_cart_quantity() {
        assert!(validate_rating(4.8).is_ok());
        assert!(validate_rating(5.1).is_err());
        assert!(validate_rating(f64::NAN).is_err());

        assert!(validate_cart_quantity(1).is_ok());
        assert!(validate_cart_quantity(MAX_CART_QUANTITY).is_ok());
        assert!(validate_cart_quantity(0).is_err());
        assert!(validate_cart_quantity(MAX_CART_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_contact_fields() {
        assert!(validate_phone("phone", "9876543210").is_ok());
        assert!(validate_phone("phone", "+919876543210").is_ok());
        assert!(validate_phone("phone", "98765").is_err());
        assert!(validate_phone("phone", "98765432ab").is_err());

        assert!(validate_email("email", "ravi@example.com").is_ok());
        assert!(validate_email("email", "ravi@example").is_err());
        assert!(validate_email("email", "").is_err());

        assert!(validate_pincode("625001").is_ok());
        assert!(validate_pincode("62500").is_err());

        // Devanagari, Tamil and Arabic-Indic numerals
        assert!(validate_phone("phone", "९८७६५४३२१०").is_err());
        assert!(validate_phone("phone", "+91௯௮௭௬௫௪௩௨௧௦").is_err());
        assert!(validate_pincode("६२५००१").is_err());
        assert!(validate_pincode("٦٢٥٠٠١").is_err());
    }

    #[test]
    fn test_store_date_follows_india_time() {
        let late_evening_utc = DateTime::parse_from_rfc3339("2026-03-10T20:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let today = store_date(late_evening_utc);
        assert_eq!(today, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());

        assert!(validate_booking_date("2026-03-10", today).is_err());
        assert!(validate_booking_date("2026-03-11", today).is_ok());

        let morning_utc = DateTime::parse_from_rfc3339("2026-03-10T06:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            store_date(morning_utc),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
        );
    }

    #[test]
    fn test_validate_upi_id() {
        assert!(validate_upi_id("ravi.kumar@okaxis").is_ok());
        assert!(validate_upi_id("9876543210@ybl").is_ok());

        assert!(validate_upi_id("ravi").is_err());
        assert!(validate_upi_id("r@okaxis").is_err());
        assert!(validate_upi_id("ravi@ok1").is_err());
    }

    #[test]
    fn test_validate_card_fields() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();

        assert!(validate_card_number("4111 1111 1111 1111").is_ok());
        assert!(validate_card_number("4111 1111 1111 1112").is_err());

        assert!(validate_card_expiry(6, 2026, today).is_ok());
        match validate_card_expiry(5, 2026, today) {
            Err(ValidationError::InvalidValue { reason, .. }) => {
                assert_eq!(reason, "Card has expired")
            }
            _ => panic!("Expected expired card error"),
        }
        assert!(validate_card_expiry(13, 2030, today).is_err());

        assert!(validate_cvv("123", CardBrand::Visa).is_ok());
        assert!(validate_cvv("1234", CardBrand::Visa).is_err());
        assert!(validate_cvv("1234", CardBrand::Amex).is_ok());
        assert!(validate_cvv("12a", CardBrand::Visa).is_err());
    }

    #[test]
    fn test_validate_booking_date() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();

        assert!(validate_booking_date("2026-06-15", today).is_ok());
        assert!(validate_booking_date("2026-07-01", today).is_ok());
        assert!(validate_booking_date("2026-06-14", today).is_err());
        assert!(validate_booking_date("15-06-2026", today).is_err());
        assert!(validate_booking_date("2026-02-30", today).is_err());
    }

    #[test]
    fn test_create_order_request_validation() {
        assert!(order_request().validate().is_ok());

        let mut request = order_request();
        request.items.clear();
        assert!(request.validate().is_err());

        let mut request = order_request();
        request.total = dec!(600);
        assert!(request.validate().is_err());

        let mut request = order_request();
        request.items[0].quantity = 0;
        assert!(request.validate().is_err());

        let mut request = order_request();
        request.shipping_address.pincode = "ABC".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_booking_request_validation() {
        let mut request = CreateBookingRequest {
            user_id: None,
            name: "Meena".to_string(),
            phone: "9876543210".to_string(),
            email: Some(String::new()),
            service_type: ServiceType::Plumbing,
            date: "2099-01-01".to_string(),
            time_slot: TimeSlot::Evening,
            address: "Anna Nagar".to_string(),
            notes: None,
        };
        assert!(request.validate().is_ok());

        request.email = Some("not-an-email".to_string());
        assert!(request.validate().is_err());

        request.email = None;
        request.notes = Some("x".repeat(MAX_NOTES_LENGTH + 1));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_product_request_validation() {
        let request = CreateProductRequest {
            name: "Premium Switch Set".to_string(),
            description: "Modular switches with a premium finish".to_string(),
            price: dec!(1299),
            category: "switches".to_string(),
            images: vec![],
            stock: 30,
            rating: 4.9,
            brand: "Legrand".to_string(),
            specs: BTreeMap::new(),
            featured: true,
        };
        assert!(request.validate().is_ok());

        let invalid = CreateProductRequest {
            description: "Short".to_string(),
            ..request
        };
        assert!(invalid.validate().is_err());
    }
}
