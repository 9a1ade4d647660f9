//! Export handlers
//!
//! Tabular downloads. The summary CSV is public (it backs the customer
//! dashboard); the full dump and the shipment workbook need an account type
//! with export permission.

use actix_web::{web, HttpResponse};
use lorry_auth::StaffUser;
use lorry_core::AppError;
use lorry_db::{PgBookingRepository, PgShipmentRepository};
use lorry_services::{parse_date_range, ExportService};
use serde::Deserialize;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, instrument};

/// Raw date-range query values, parsed leniently by the service layer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ExportParams {
    fn range(&self) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
        parse_date_range(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

fn export_service(pool: &PgPool) -> ExportService<PgBookingRepository, PgShipmentRepository> {
    ExportService::new(
        Arc::new(PgBookingRepository::new(pool.clone())),
        Arc::new(PgShipmentRepository::new(pool.clone())),
    )
}

fn csv_attachment(filename: &str, body: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}

/// Summary CSV of bookings
///
/// GET /api/export-customer-shipments-csv/
#[instrument(skip(pool))]
pub async fn customer_shipments_csv(
    pool: web::Data<PgPool>,
    params: web::Query<ExportParams>,
) -> Result<HttpResponse, AppError> {
    let csv = export_service(pool.get_ref())
        .bookings_summary_csv(params.range())
        .await?;

    info!(bytes = csv.len(), "Summary CSV export rendered");
    Ok(csv_attachment("shipments.csv", csv))
}

/// Full column dump of bookings
///
/// GET /api/export-all-customer-shipments-csv/
#[instrument(skip(pool, user), fields(user = %user.name))]
pub async fn all_customer_shipments_csv(
    pool: web::Data<PgPool>,
    user: StaffUser,
) -> Result<HttpResponse, AppError> {
    let csv = export_service(pool.get_ref()).bookings_full_csv().await?;

    info!(bytes = csv.len(), "Full CSV export rendered");
    Ok(csv_attachment("all_shipments.csv", csv))
}

/// XLSX workbook of the shipment aggregate
///
/// GET /api/export-shipments/
#[instrument(skip(pool, user), fields(user = %user.name))]
pub async fn shipments_xlsx(
    pool: web::Data<PgPool>,
    user: StaffUser,
    params: web::Query<ExportParams>,
) -> Result<HttpResponse, AppError> {
    let workbook = export_service(pool.get_ref())
        .shipments_workbook(params.range())
        .await?;

    info!(bytes = workbook.len(), "Shipment workbook rendered");
    Ok(HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"shipments.xlsx\"",
        ))
        .body(workbook))
}

/// Configure export routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/export-customer-shipments-csv",
        web::get().to(customer_shipments_csv),
    )
    .route(
        "/export-all-customer-shipments-csv",
        web::get().to(all_customer_shipments_csv),
    )
    .route("/export-shipments", web::get().to(shipments_xlsx));
}
