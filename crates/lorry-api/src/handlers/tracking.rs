//! Tracking handler
//!
//! Public lookup for the tracking widget. A miss is a 200 with
//! `success: false`, never a 404; the widget renders the message inline.

use crate::dto::tracking::TrackRequest;
use actix_web::{web, HttpResponse};
use lorry_core::AppError;
use lorry_db::PgBookingRepository;
use lorry_services::{TrackingService, NOT_FOUND_MESSAGE};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::instrument;

/// Look up a consignment by LR number
///
/// POST /api/track_shipment/
#[instrument(skip(pool, req))]
pub async fn track_shipment(
    pool: web::Data<PgPool>,
    req: web::Json<TrackRequest>,
) -> Result<HttpResponse, AppError> {
    let lr_no = req
        .number()
        .ok_or_else(|| AppError::MissingField("Tracking number is required.".to_string()))?;

    let repo = Arc::new(PgBookingRepository::new(pool.get_ref().clone()));
    let service = TrackingService::new(repo);

    match service.track(lr_no).await? {
        Some(payload) => Ok(HttpResponse::Ok().json(payload)),
        None => Ok(HttpResponse::Ok().json(json!({
            "success": false,
            "message": NOT_FOUND_MESSAGE,
        }))),
    }
}

/// Configure tracking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/track_shipment", web::post().to(track_shipment));
}
