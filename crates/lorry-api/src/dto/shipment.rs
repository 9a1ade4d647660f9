//! Shipment DTOs

use chrono::NaiveDate;
use lorry_core::models::{Shipment, ShipmentDetails};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

/// Shipment create/update request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ShipmentRequest {
    #[validate(length(min = 1, message = "LR number is required"))]
    pub lr_no: String,

    #[validate(length(min = 1, message = "Tracking number is required"))]
    pub tracking_number: String,

    #[serde(default)]
    pub from_location: String,

    #[serde(default)]
    pub to_location: String,

    pub dod: Option<NaiveDate>,

    #[serde(default)]
    pub branch_from_phone: String,

    #[serde(default)]
    pub branch_to_phone: String,

    #[serde(default)]
    pub customer_name: String,

    /// Defaults to "Pending" when absent
    pub status: Option<String>,

    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub destination: String,

    pub priority: Option<String>,
}

impl ShipmentRequest {
    /// Materialize into the domain model
    ///
    /// `id` is 0 for creations and the path id for updates; `created_at`
    /// is database-assigned and never taken from the request.
    pub fn into_shipment(self, id: i64) -> Shipment {
        Shipment {
            id,
            lr_no: self.lr_no,
            tracking_number: self.tracking_number,
            from_location: self.from_location,
            to_location: self.to_location,
            dod: self.dod,
            branch_from_phone: self.branch_from_phone,
            branch_to_phone: self.branch_to_phone,
            customer_name: self.customer_name,
            status: self.status.unwrap_or_else(|| "Pending".to_string()),
            origin: self.origin,
            destination: self.destination,
            priority: self.priority,
            ..Default::default()
        }
    }
}

/// Billing-detail upsert request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShipmentDetailsRequest {
    #[serde(default)]
    pub consignor: String,

    #[serde(default)]
    pub consignee: String,

    #[serde(default)]
    pub gstin: String,

    #[serde(default)]
    pub freight: Decimal,

    #[serde(default)]
    pub sub_total: Decimal,

    #[serde(default)]
    pub sgst: Decimal,

    #[serde(default)]
    pub cgst: Decimal,

    #[serde(default)]
    pub g_total: Decimal,

    #[serde(default)]
    pub to_pay: Decimal,

    #[serde(default)]
    pub paid: Decimal,

    #[serde(default)]
    pub insurance: String,

    #[serde(default)]
    pub policy_no: String,

    #[serde(default)]
    pub e_way_bill_status: String,

    #[serde(default)]
    pub owners_risk: bool,

    #[serde(default)]
    pub remark: String,
}

impl ShipmentDetailsRequest {
    pub fn into_details(self, shipment_id: i64) -> ShipmentDetails {
        ShipmentDetails {
            id: 0,
            shipment_id,
            consignor: self.consignor,
            consignee: self.consignee,
            gstin: self.gstin,
            freight: self.freight,
            sub_total: self.sub_total,
            sgst: self.sgst,
            cgst: self.cgst,
            g_total: self.g_total,
            to_pay: self.to_pay,
            paid: self.paid,
            insurance: self.insurance,
            policy_no: self.policy_no,
            e_way_bill_status: self.e_way_bill_status,
            owners_risk: self.owners_risk,
            remark: self.remark,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipment_request_validation() {
        let valid = ShipmentRequest {
            lr_no: "42".to_string(),
            tracking_number: "TRK-42".to_string(),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let missing = ShipmentRequest::default();
        assert!(missing.validate().is_err());
    }

    #[test]
    fn test_status_defaults_to_pending() {
        let req = ShipmentRequest {
            lr_no: "42".to_string(),
            tracking_number: "TRK-42".to_string(),
            ..Default::default()
        };
        assert_eq!(req.into_shipment(0).status, "Pending");
    }

    #[test]
    fn test_update_keeps_path_id() {
        let req = ShipmentRequest {
            lr_no: "42".to_string(),
            tracking_number: "TRK-42".to_string(),
            status: Some("Delivered".to_string()),
            ..Default::default()
        };
        let shipment = req.into_shipment(7);
        assert_eq!(shipment.id, 7);
        assert_eq!(shipment.status, "Delivered");
    }
}
