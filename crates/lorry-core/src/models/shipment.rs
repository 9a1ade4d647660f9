//! Shipment model
//!
//! A freight-tracking aggregate that predates `Booking` and evolved
//! independently of it. There is deliberately no foreign key between the
//! two; nothing in the domain establishes a relationship.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Shipment entity
///
/// Freight metadata keyed by both an LR number and a carrier tracking
/// number, each unique on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique identifier
    pub id: i64,

    /// Consignment note number (unique)
    pub lr_no: String,

    /// Carrier tracking number (unique)
    pub tracking_number: String,

    pub from_location: String,
    pub to_location: String,

    /// Expected date of delivery
    pub dod: Option<NaiveDate>,

    pub branch_from_phone: String,
    pub branch_to_phone: String,

    pub customer_name: String,

    /// Free-form status, defaults to "Pending"
    pub status: String,

    pub origin: String,
    pub destination: String,

    pub priority: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Default for Shipment {
    fn default() -> Self {
        Self {
            id: 0,
            lr_no: String::new(),
            tracking_number: String::new(),
            from_location: String::new(),
            to_location: String::new(),
            dod: None,
            branch_from_phone: String::new(),
            branch_to_phone: String::new(),
            customer_name: String::new(),
            status: "Pending".to_string(),
            origin: String::new(),
            destination: String::new(),
            priority: None,
            created_at: Utc::now(),
        }
    }
}

/// Billing/invoice extension of a shipment
///
/// One-to-one with `Shipment`; deleted alongside it (database cascade).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipmentDetails {
    pub id: i64,
    pub shipment_id: i64,

    pub consignor: String,
    pub consignee: String,
    pub gstin: String,

    // Freight breakdown
    pub freight: Decimal,
    pub sub_total: Decimal,
    pub sgst: Decimal,
    pub cgst: Decimal,
    /// Grand total
    pub g_total: Decimal,
    pub to_pay: Decimal,
    pub paid: Decimal,

    pub insurance: String,
    pub policy_no: String,
    pub e_way_bill_status: String,
    pub owners_risk: bool,
    pub remark: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_default_status() {
        let shipment = Shipment::default();
        assert_eq!(shipment.status, "Pending");
        assert!(shipment.priority.is_none());
    }
}
