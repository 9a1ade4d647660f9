//! Booking DTOs

use crate::dto::common::PaginationParams;
use chrono::NaiveDate;
use lorry_core::models::Address;
use lorry_core::traits::{BookingOrdering, BookingQuery};
use lorry_services::NewBooking;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Booking creation request
///
/// Field presence is checked by the service layer so the error messages
/// stay field-scoped; everything here deserializes leniently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingCreateRequest {
    #[serde(default)]
    pub pickup_address: Address,

    #[serde(default)]
    pub delivery_address: Address,

    #[serde(default)]
    pub service_type: String,

    #[serde(default)]
    pub package_type: String,

    pub weight: Option<f64>,

    #[serde(default)]
    pub dimensions: String,

    pub pickup_date: Option<NaiveDate>,

    #[serde(default)]
    pub pickup_time_window: String,

    #[serde(default)]
    pub payment_method: String,

    // Optional extras
    pub description: Option<String>,
    pub noofpkgs: Option<String>,
    pub saidtocontain: Option<String>,
    pub chargeable_weight: Option<Decimal>,
    pub freight: Option<Decimal>,
    pub sgst: Option<Decimal>,
    pub cgst: Option<Decimal>,
    pub policy_no: Option<String>,
    pub remarks: Option<String>,
    pub consignor: Option<String>,
    pub consignee: Option<String>,
    pub phone: Option<String>,
    pub dod: Option<NaiveDate>,
}

impl From<BookingCreateRequest> for NewBooking {
    fn from(req: BookingCreateRequest) -> Self {
        NewBooking {
            pickup_address: req.pickup_address,
            delivery_address: req.delivery_address,
            service_type: req.service_type,
            package_type: req.package_type,
            weight: req.weight,
            dimensions: req.dimensions,
            pickup_date: req.pickup_date,
            pickup_time_window: req.pickup_time_window,
            payment_method: req.payment_method,
            description: req.description,
            noofpkgs: req.noofpkgs,
            saidtocontain: req.saidtocontain,
            chargeable_weight: req.chargeable_weight,
            freight: req.freight,
            sgst: req.sgst,
            cgst: req.cgst,
            policy_no: req.policy_no,
            remarks: req.remarks,
            consignor: req.consignor,
            consignee: req.consignee,
            phone: req.phone,
            dod: req.dod,
        }
    }
}

/// Booking creation response
#[derive(Debug, Clone, Serialize)]
pub struct BookingCreatedResponse {
    pub message: String,
    pub booking_id: i64,
    pub lr_no: String,
}

impl BookingCreatedResponse {
    pub fn new(booking_id: i64, lr_no: String) -> Self {
        Self {
            message: "Booking created successfully".to_string(),
            booking_id,
            lr_no,
        }
    }
}

/// Query parameters for the booking list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilterParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Inclusive lower bound on booking_date (`YYYY-MM-DD`)
    pub start_date: Option<String>,

    /// Inclusive upper bound on booking_date (`YYYY-MM-DD`)
    pub end_date: Option<String>,

    /// Free-text search over lr_no / locations / status
    pub search: Option<String>,

    /// DRF-style sort token ("lr_no", "-booking_date", ...)
    pub ordering: Option<String>,
}

impl BookingFilterParams {
    fn parse_date(raw: &Option<String>, label: &str) -> Option<NaiveDate> {
        let raw = raw.as_deref()?;
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                warn!(value = %raw, filter = %label, "Malformed date filter ignored");
                None
            }
        }
    }

    /// Build the repository query
    ///
    /// Malformed dates and unknown ordering tokens are ignored rather than
    /// rejected; the default sort is newest first.
    pub fn to_query(&self, user_id: Option<i64>) -> BookingQuery {
        let (ordering, descending) = self
            .ordering
            .as_deref()
            .and_then(BookingOrdering::parse)
            .unwrap_or((BookingOrdering::BookingDate, true));

        BookingQuery {
            start_date: Self::parse_date(&self.start_date, "start_date"),
            end_date: Self::parse_date(&self.end_date, "end_date"),
            user_id,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            ordering,
            descending,
        }
    }
}

/// Status update request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub lr_no: Option<String>,
    pub status: Option<String>,
}

/// Status update response
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateResponse {
    pub success: bool,
    pub lr_no: String,
    pub status: String,
}
