use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{generate_id, BookingStatus, ServiceType, TimeSlot};

/// On-site electrical or plumbing visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceBooking {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub service_type: ServiceType,
    pub date: String,
    pub time_slot: TimeSlot,
    pub address: String,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub technician_id: Option<String>,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    pub service_type: ServiceType,
    pub date: String,
    pub time_slot: TimeSlot,
    pub address: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
    #[serde(default)]
    pub actual_cost: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignTechnicianRequest {
    pub technician_id: String,
    #[serde(default)]
    pub estimated_cost: Option<Decimal>,
}

impl ServiceBooking {
    /// New bookings always start out pending, whatever the client sent
    pub fn new(request: CreateBookingRequest) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id("B", 8),
            user_id: request.user_id.filter(|id| !id.trim().is_empty()),
            name: request.name.trim().to_string(),
            phone: request.phone.trim().to_string(),
            email: request
                .email
                .map(|email| email.trim().to_string())
                .filter(|email| !email.is_empty()),
            service_type: request.service_type,
            date: request.date.trim().to_string(),
            time_slot: request.time_slot,
            address: request.address.trim().to_string(),
            notes: request
                .notes
                .map(|notes| notes.trim().to_string())
                .filter(|notes| !notes.is_empty()),
            status: BookingStatus::Pending,
            technician_id: None,
            estimated_cost: None,
            actual_cost: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_status(&mut self, status: BookingStatus, actual_cost: Option<Decimal>) {
        self.status = status;
        if actual_cost.is_some() {
            self.actual_cost = actual_cost;
        }
        self.updated_at = Utc::now();
    }

    pub fn assign_technician(&mut self, technician_id: String, estimated_cost: Option<Decimal>) {
        self.technician_id = Some(technician_id);
        if estimated_cost.is_some() {
            self.estimated_cost = estimated_cost;
        }
        self.updated_at = Utc::now();
    }

    /// Last eight characters of the id, as quoted to customers
    pub fn reference(&self) -> &str {
        let start = self.id.len().saturating_sub(8);
        &self.id[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_test_request() -> CreateBookingRequest {
        CreateBookingRequest {
            user_id: Some("  ".to_string()),
            name: " Meena ".to_string(),
            phone: "9876543210".to_string(),
            email: Some("".to_string()),
            service_type: ServiceType::Electrical,
            date: "2030-01-15".to_string(),
            time_slot: TimeSlot::Morning,
            address: "5 Anna Nagar, Madurai".to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_booking_creation_normalizes_fields() {
        let booking = ServiceBooking::new(create_test_request());

        assert!(booking.id.starts_with('B'));
        assert_eq!(booking.name, "Meena");
        assert_eq!(booking.user_id, None);
        assert_eq!(booking.email, None);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.reference().len(), 8);
    }

    #[test]
    fn test_assign_technician_and_complete() {
        let mut booking = ServiceBooking::new(create_test_request());

        booking.assign_technician("T-42".to_string(), Some(dec!(600)));
        booking.set_status(BookingStatus::Completed, Some(dec!(750)));

        assert_eq!(booking.technician_id.as_deref(), Some("T-42"));
        assert_eq!(booking.estimated_cost, Some(dec!(600)));
        assert_eq!(booking.actual_cost, Some(dec!(750)));
    }

    #[test]
    fn test_booking_request_deserialization() {
        let json = r#"{
            "name": "Ravi", "phone": "9876543210", "service_type": "both",
            "date": "2030-02-01", "time_slot": "12-15", "address": "Madurai"
        }"#;

        let request: CreateBookingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.service_type, ServiceType::Both);
        assert_eq!(request.time_slot, TimeSlot::Afternoon);
        assert!(request.email.is_none());
    }
}
