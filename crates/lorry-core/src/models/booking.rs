//! Booking model
//!
//! Represents customer shipment bookings, the system's primary aggregate.
//! A booking carries a unique, human-facing LR (Lorry Receipt) number,
//! structured pickup/delivery addresses, and an append-only status timeline.

use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the route an address belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSide {
    /// Origin of the consignment
    Pickup,
    /// Destination of the consignment
    Delivery,
}

impl fmt::Display for AddressSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressSide::Pickup => write!(f, "Pickup"),
            AddressSide::Delivery => write!(f, "Delivery"),
        }
    }
}

/// Structured pickup/delivery address
///
/// Stored on the booking unchanged; route fields (`from_location`,
/// `branch_from_phone`, ...) are derived from it at creation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub zip: String,

    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub phone: String,

    /// Optional contact email; only the delivery side's email is persisted
    /// on the booking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Address {
    /// Validate that every required field is present and non-empty
    ///
    /// `email` is optional; everything else is mandatory. The error names
    /// both the side and the missing field so callers get a field-scoped
    /// message.
    pub fn validate(&self, side: AddressSide) -> Result<(), AppError> {
        let required = [
            ("name", &self.name),
            ("address", &self.address),
            ("city", &self.city),
            ("zip", &self.zip),
            ("country", &self.country),
            ("phone", &self.phone),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::MissingField(format!(
                    "{} address must include {}.",
                    side, field
                )));
            }
        }

        Ok(())
    }
}

/// Route fields derived from a validated pickup/delivery address pair
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDetails {
    pub from_location: String,
    pub to_location: String,
    pub branch_from_phone: String,
    pub branch_to_phone: String,
    pub delivery_email: String,
}

impl RouteDetails {
    /// Flatten an address pair into the fields stored on the booking
    ///
    /// Locations come from the city, branch phones from the address phone,
    /// and the delivery email defaults to an empty string when absent.
    pub fn derive(pickup: &Address, delivery: &Address) -> Self {
        Self {
            from_location: pickup.city.clone(),
            to_location: delivery.city.clone(),
            branch_from_phone: pickup.phone.clone(),
            branch_to_phone: delivery.phone.clone(),
            delivery_email: delivery.email.clone().unwrap_or_default(),
        }
    }
}

/// A single event on a booking's status timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub status: String,
    pub location: String,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

impl TimelineEvent {
    /// Event recorded when a booking's status is changed
    pub fn status_change(status: &str, location: &str) -> Self {
        Self {
            status: status.to_string(),
            location: location.to_string(),
            timestamp: Utc::now(),
            description: format!("Status changed to {}.", status),
        }
    }
}

/// Booking entity
///
/// The central aggregate: a customer-submitted shipment request with a
/// unique LR number. `lr_no` and `booking_date` are set exactly once at
/// creation and never change; `updates` is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    /// Unique identifier
    pub id: i64,

    /// Human-facing consignment number; unique, immutable once assigned
    pub lr_no: String,

    /// Set once at creation
    pub booking_date: DateTime<Utc>,

    // Route (derived from address normalization)
    pub from_location: String,
    pub to_location: String,
    pub branch_from_phone: String,
    pub branch_to_phone: String,

    // Cargo
    pub actual_weight: Option<Decimal>,
    pub chargeable_weight: Option<Decimal>,
    pub weight: f64,
    pub dimensions: String,
    pub description: Option<String>,
    pub package_type: String,
    pub service_type: String,
    pub noofpkgs: Option<String>,
    pub saidtocontain: Option<String>,

    // Commercial
    pub freight: Option<Decimal>,
    pub sgst: Option<Decimal>,
    pub cgst: Option<Decimal>,
    pub payment_method: String,
    pub policy_no: Option<String>,
    pub remarks: Option<String>,

    // Parties
    pub consignor: Option<String>,
    pub consignee: Option<String>,
    pub pickup_address: Address,
    pub delivery_address: Address,
    pub delivery_email: Option<String>,
    pub phone: Option<String>,

    // Scheduling
    pub pickup_date: NaiveDate,
    pub pickup_time_window: String,

    /// Estimated delivery date, when known
    pub dod: Option<NaiveDate>,

    /// Free-form status, defaults to "in-transit"
    pub status: String,

    /// Append-only status timeline
    pub updates: Vec<TimelineEvent>,

    /// Owning user; None for anonymous bookings
    pub user_id: Option<i64>,
}

impl Booking {
    /// Human-readable weight for the tracking response
    pub fn weight_label(&self) -> String {
        match self.actual_weight {
            Some(w) => format!("{} kg", w),
            None => "Unknown".to_string(),
        }
    }
}

impl Default for Booking {
    fn default() -> Self {
        Self {
            id: 0,
            lr_no: String::new(),
            booking_date: Utc::now(),
            from_location: String::new(),
            to_location: String::new(),
            branch_from_phone: String::new(),
            branch_to_phone: String::new(),
            actual_weight: None,
            chargeable_weight: None,
            weight: 0.0,
            dimensions: String::new(),
            description: None,
            package_type: String::new(),
            service_type: String::new(),
            noofpkgs: None,
            saidtocontain: None,
            freight: None,
            sgst: None,
            cgst: None,
            payment_method: String::new(),
            policy_no: None,
            remarks: None,
            consignor: None,
            consignee: None,
            pickup_address: Address::default(),
            delivery_address: Address::default(),
            delivery_email: None,
            phone: None,
            pickup_date: Utc::now().date_naive(),
            pickup_time_window: String::new(),
            dod: None,
            status: "in-transit".to_string(),
            updates: Vec::new(),
            user_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn complete_address(city: &str) -> Address {
        Address {
            name: "Ramesh Traders".to_string(),
            address: "14 MG Road".to_string(),
            city: city.to_string(),
            zip: "411001".to_string(),
            country: "India".to_string(),
            phone: "9822012345".to_string(),
            email: None,
        }
    }

    #[test]
    fn test_complete_address_validates() {
        let addr = complete_address("Pune");
        assert!(addr.validate(AddressSide::Pickup).is_ok());
        assert!(addr.validate(AddressSide::Delivery).is_ok());
    }

    #[test]
    fn test_missing_field_names_side_and_field() {
        let mut addr = complete_address("Pune");
        addr.zip = String::new();

        let err = addr.validate(AddressSide::Delivery).unwrap_err();
        assert_eq!(err.to_string(), "Delivery address must include zip.");

        let err = addr.validate(AddressSide::Pickup).unwrap_err();
        assert_eq!(err.to_string(), "Pickup address must include zip.");
    }

    #[test]
    fn test_whitespace_only_field_is_missing() {
        let mut addr = complete_address("Pune");
        addr.phone = "   ".to_string();

        let err = addr.validate(AddressSide::Pickup).unwrap_err();
        assert_eq!(err.to_string(), "Pickup address must include phone.");
    }

    #[test]
    fn test_route_details_derivation() {
        let pickup = complete_address("Pune");
        let mut delivery = complete_address("Mumbai");
        delivery.phone = "9822098765".to_string();
        delivery.email = Some("receiver@example.com".to_string());

        let route = RouteDetails::derive(&pickup, &delivery);
        assert_eq!(route.from_location, "Pune");
        assert_eq!(route.to_location, "Mumbai");
        assert_eq!(route.branch_from_phone, "9822012345");
        assert_eq!(route.branch_to_phone, "9822098765");
        assert_eq!(route.delivery_email, "receiver@example.com");
    }

    #[test]
    fn test_route_details_email_defaults_to_empty() {
        let pickup = complete_address("Pune");
        let delivery = complete_address("Mumbai");

        let route = RouteDetails::derive(&pickup, &delivery);
        assert_eq!(route.delivery_email, "");
    }

    #[test]
    fn test_weight_label() {
        let booking = Booking {
            actual_weight: Some(dec!(12.5)),
            ..Default::default()
        };
        assert_eq!(booking.weight_label(), "12.5 kg");

        let booking = Booking::default();
        assert_eq!(booking.weight_label(), "Unknown");
    }

    #[test]
    fn test_status_change_event() {
        let event = TimelineEvent::status_change("delivered", "Pune");
        assert_eq!(event.status, "delivered");
        assert_eq!(event.location, "Pune");
        assert_eq!(event.description, "Status changed to delivered.");
    }
}
