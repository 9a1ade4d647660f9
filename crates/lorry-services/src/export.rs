//! Tabular exports
//!
//! Renders booking and shipment data as CSV buffers and an XLSX workbook.
//! Date-range filters are parsed leniently: a malformed or inverted range is
//! logged and treated as "no filter", never an error, so a bad query string
//! cannot break a download.

use lorry_core::{
    models::{Booking, Shipment},
    traits::{BookingQuery, BookingRepository, Repository, ShipmentRepository},
    AppError, AppResult,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_xlsxwriter::Workbook;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const SUMMARY_HEADERS: [&str; 9] = [
    "LR No",
    "Booking Date",
    "From Location",
    "To Location",
    "Branch From Phone",
    "Branch To Phone",
    "Status",
    "Estimated Delivery",
    "Service",
];

const FULL_HEADERS: [&str; 32] = [
    "id",
    "lr_no",
    "booking_date",
    "from_location",
    "to_location",
    "branch_from_phone",
    "branch_to_phone",
    "actual_weight",
    "chargeable_weight",
    "freight",
    "dod",
    "sgst",
    "cgst",
    "remarks",
    "policy_no",
    "noofpkgs",
    "consignor",
    "consignee",
    "saidtocontain",
    "delivery_address",
    "pickup_address",
    "description",
    "dimensions",
    "package_type",
    "payment_method",
    "pickup_date",
    "pickup_time_window",
    "service_type",
    "weight",
    "status",
    "updates",
    "phone",
];

const WORKBOOK_HEADERS: [&str; 6] = [
    "ID",
    "Origin",
    "Destination",
    "Status",
    "Created At",
    "Estimated Delivery",
];

/// Parse an optional inclusive date range from raw query values
///
/// Both bounds must be present, well-formed (`YYYY-MM-DD`), and ordered;
/// anything else is logged and collapses to `None`.
pub fn parse_date_range(start: Option<&str>, end: Option<&str>) -> Option<(NaiveDate, NaiveDate)> {
    let (start_raw, end_raw) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => return None,
    };

    let parsed_start = NaiveDate::parse_from_str(start_raw, "%Y-%m-%d");
    let parsed_end = NaiveDate::parse_from_str(end_raw, "%Y-%m-%d");

    match (parsed_start, parsed_end) {
        (Ok(s), Ok(e)) if s <= e => Some((s, e)),
        (Ok(s), Ok(e)) => {
            warn!(start = %s, end = %e, "Inverted export date range, ignoring filter");
            None
        }
        _ => {
            warn!(
                start = %start_raw,
                end = %end_raw,
                "Malformed export date range, ignoring filter"
            );
            None
        }
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn opt_str(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn opt_decimal(value: &Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn opt_date(value: &Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Export rendering service
pub struct ExportService<B: BookingRepository, S: ShipmentRepository> {
    booking_repo: Arc<B>,
    shipment_repo: Arc<S>,
}

impl<B: BookingRepository, S: ShipmentRepository> ExportService<B, S> {
    /// Create a new export service
    pub fn new(booking_repo: Arc<B>, shipment_repo: Arc<S>) -> Self {
        Self {
            booking_repo,
            shipment_repo,
        }
    }

    async fn fetch_bookings(&self, range: Option<(NaiveDate, NaiveDate)>) -> AppResult<Vec<Booking>> {
        let query = BookingQuery {
            start_date: range.map(|(s, _)| s),
            end_date: range.map(|(_, e)| e),
            ..Default::default()
        };

        let (bookings, total) = self.booking_repo.list_filtered(&query, i64::MAX, 0).await?;
        debug!(total, "Fetched bookings for export");
        Ok(bookings)
    }

    /// Render the summary CSV of bookings (`shipments.csv`)
    #[instrument(skip(self))]
    pub async fn bookings_summary_csv(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<u8>> {
        let bookings = self.fetch_bookings(range).await?;

        let mut buffer = Vec::new();
        writeln!(buffer, "{}", SUMMARY_HEADERS.join(","))?;

        for b in &bookings {
            let row = [
                csv_field(&b.lr_no),
                b.booking_date.format("%Y-%m-%d").to_string(),
                csv_field(&b.from_location),
                csv_field(&b.to_location),
                csv_field(&b.branch_from_phone),
                csv_field(&b.branch_to_phone),
                csv_field(&b.status),
                opt_date(&b.dod),
                csv_field(&b.service_type),
            ];
            writeln!(buffer, "{}", row.join(","))?;
        }

        Ok(buffer)
    }

    /// Render the full column dump of bookings (`all_shipments.csv`)
    ///
    /// Always unfiltered. Address and timeline columns are serialized JSON.
    #[instrument(skip(self))]
    pub async fn bookings_full_csv(&self) -> AppResult<Vec<u8>> {
        let bookings = self.fetch_bookings(None).await?;

        let mut buffer = Vec::new();
        writeln!(buffer, "{}", FULL_HEADERS.join(","))?;

        for b in &bookings {
            let delivery_address = serde_json::to_string(&b.delivery_address)?;
            let pickup_address = serde_json::to_string(&b.pickup_address)?;
            let updates = serde_json::to_string(&b.updates)?;

            let row = [
                b.id.to_string(),
                csv_field(&b.lr_no),
                b.booking_date.format("%Y-%m-%d").to_string(),
                csv_field(&b.from_location),
                csv_field(&b.to_location),
                csv_field(&b.branch_from_phone),
                csv_field(&b.branch_to_phone),
                opt_decimal(&b.actual_weight),
                opt_decimal(&b.chargeable_weight),
                opt_decimal(&b.freight),
                opt_date(&b.dod),
                opt_decimal(&b.sgst),
                opt_decimal(&b.cgst),
                csv_field(opt_str(&b.remarks)),
                csv_field(opt_str(&b.policy_no)),
                csv_field(opt_str(&b.noofpkgs)),
                csv_field(opt_str(&b.consignor)),
                csv_field(opt_str(&b.consignee)),
                csv_field(opt_str(&b.saidtocontain)),
                csv_field(&delivery_address),
                csv_field(&pickup_address),
                csv_field(opt_str(&b.description)),
                csv_field(&b.dimensions),
                csv_field(&b.package_type),
                csv_field(&b.payment_method),
                b.pickup_date.format("%Y-%m-%d").to_string(),
                csv_field(&b.pickup_time_window),
                csv_field(&b.service_type),
                b.weight.to_string(),
                csv_field(&b.status),
                csv_field(&updates),
                csv_field(opt_str(&b.phone)),
            ];
            writeln!(buffer, "{}", row.join(","))?;
        }

        Ok(buffer)
    }

    /// Render the shipment workbook (`shipments.xlsx`)
    ///
    /// The date-range parameters on this endpoint are accepted and logged
    /// but never applied; the shipment aggregate carries no booking date to
    /// filter on. Kept for interface compatibility.
    #[instrument(skip(self))]
    pub async fn shipments_workbook(
        &self,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> AppResult<Vec<u8>> {
        if let Some((start, end)) = range {
            debug!(%start, %end, "Shipment export date range ignored");
        }

        let shipments = self.shipment_repo.find_all(i64::MAX, 0).await?;
        self.render_workbook(&shipments)
    }

    fn render_workbook(&self, shipments: &[Shipment]) -> AppResult<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name("Shipments")
            .map_err(|e| AppError::Internal(format!("Workbook rendering failed: {}", e)))?;

        for (col, header) in WORKBOOK_HEADERS.iter().enumerate() {
            worksheet
                .write_string(0, col as u16, *header)
                .map_err(|e| AppError::Internal(format!("Workbook rendering failed: {}", e)))?;
        }

        for (i, shipment) in shipments.iter().enumerate() {
            let row = (i + 1) as u32;
            worksheet
                .write_number(row, 0, shipment.id as f64)
                .and_then(|ws| ws.write_string(row, 1, &shipment.from_location))
                .and_then(|ws| ws.write_string(row, 2, &shipment.to_location))
                .and_then(|ws| ws.write_string(row, 3, &shipment.status))
                .and_then(|ws| {
                    ws.write_string(row, 4, shipment.created_at.format("%Y-%m-%d").to_string())
                })
                .and_then(|ws| ws.write_string(row, 5, opt_date(&shipment.dod)))
                .map_err(|e| AppError::Internal(format!("Workbook rendering failed: {}", e)))?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| AppError::Internal(format!("Workbook rendering failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::tests::{valid_draft, MemoryBookingRepo};
    use crate::booking::BookingService;
    use async_trait::async_trait;
    use lorry_core::config::BookingConfig;
    use lorry_core::models::ShipmentDetails;
    use parking_lot::Mutex;

    struct MemoryShipmentRepo {
        shipments: Mutex<Vec<Shipment>>,
    }

    impl MemoryShipmentRepo {
        fn new(shipments: Vec<Shipment>) -> Self {
            Self {
                shipments: Mutex::new(shipments),
            }
        }
    }

    #[async_trait]
    impl Repository<Shipment, i64> for MemoryShipmentRepo {
        async fn find_by_id(&self, id: i64) -> AppResult<Option<Shipment>> {
            Ok(self.shipments.lock().iter().find(|s| s.id == id).cloned())
        }

        async fn find_all(&self, limit: i64, offset: i64) -> AppResult<Vec<Shipment>> {
            Ok(self
                .shipments
                .lock()
                .iter()
                .skip(offset as usize)
                .take(limit.min(i64::from(u32::MAX)) as usize)
                .cloned()
                .collect())
        }

        async fn count(&self) -> AppResult<i64> {
            Ok(self.shipments.lock().len() as i64)
        }

        async fn create(&self, entity: &Shipment) -> AppResult<Shipment> {
            let mut shipments = self.shipments.lock();
            let created = Shipment {
                id: shipments.len() as i64 + 1,
                ..entity.clone()
            };
            shipments.push(created.clone());
            Ok(created)
        }

        async fn update(&self, entity: &Shipment) -> AppResult<Shipment> {
            Ok(entity.clone())
        }

        async fn delete(&self, _id: i64) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[async_trait]
    impl ShipmentRepository for MemoryShipmentRepo {
        async fn find_by_tracking_number(&self, number: &str) -> AppResult<Option<Shipment>> {
            Ok(self
                .shipments
                .lock()
                .iter()
                .find(|s| s.tracking_number == number)
                .cloned())
        }

        async fn find_details(&self, _shipment_id: i64) -> AppResult<Option<ShipmentDetails>> {
            Ok(None)
        }

        async fn upsert_details(&self, details: &ShipmentDetails) -> AppResult<ShipmentDetails> {
            Ok(details.clone())
        }
    }

    async fn seeded_service() -> ExportService<MemoryBookingRepo, MemoryShipmentRepo> {
        let booking_repo = Arc::new(MemoryBookingRepo::new());
        let booking_svc = BookingService::new(booking_repo.clone(), BookingConfig::default());
        booking_svc.create_booking(valid_draft(), None).await.unwrap();

        let shipment_repo = Arc::new(MemoryShipmentRepo::new(vec![Shipment {
            id: 1,
            from_location: "Pune".to_string(),
            to_location: "Mumbai".to_string(),
            status: "Pending".to_string(),
            ..Default::default()
        }]));

        ExportService::new(booking_repo, shipment_repo)
    }

    #[test]
    fn test_parse_valid_date_range() {
        let range = parse_date_range(Some("2025-01-01"), Some("2025-01-31"));
        assert_eq!(
            range,
            Some((
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()
            ))
        );
    }

    #[test]
    fn test_malformed_dates_collapse_to_no_filter() {
        assert!(parse_date_range(Some("not-a-date"), Some("2025-01-31")).is_none());
        assert!(parse_date_range(Some("2025-01-01"), Some("31/01/2025")).is_none());
        assert!(parse_date_range(Some("2025-13-40"), Some("2025-01-31")).is_none());
    }

    #[test]
    fn test_inverted_range_collapses_to_no_filter() {
        assert!(parse_date_range(Some("2025-02-01"), Some("2025-01-01")).is_none());
    }

    #[test]
    fn test_single_bound_collapses_to_no_filter() {
        assert!(parse_date_range(Some("2025-01-01"), None).is_none());
        assert!(parse_date_range(None, Some("2025-01-31")).is_none());
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[tokio::test]
    async fn test_summary_csv_headers_and_rows() {
        let svc = seeded_service().await;
        let buffer = svc.bookings_summary_csv(None).await.unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "LR No,Booking Date,From Location,To Location,Branch From Phone,Branch To Phone,Status,Estimated Delivery,Service"
        );

        let row = lines.next().unwrap();
        assert!(row.starts_with("1,"));
        assert!(row.contains("Pune"));
        assert!(row.contains("Mumbai"));
        assert!(row.contains("in-transit"));
        assert!(row.ends_with(",express"));
        assert!(lines.next().is_none());
    }

    #[tokio::test]
    async fn test_full_csv_serializes_addresses_as_json() {
        let svc = seeded_service().await;
        let buffer = svc.bookings_full_csv().await.unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let header = text.lines().next().unwrap();
        assert!(header.starts_with("id,lr_no,booking_date"));
        assert!(header.ends_with("status,updates,phone"));

        // JSON address columns survive the CSV quoting
        assert!(text.contains("\"\"city\"\":\"\"Pune\"\""));
    }

    #[tokio::test]
    async fn test_workbook_renders() {
        let svc = seeded_service().await;
        let buffer = svc.shipments_workbook(None).await.unwrap();

        // XLSX containers are ZIP archives
        assert_eq!(&buffer[0..2], b"PK");
    }
}
