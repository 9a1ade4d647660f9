//! Shipment CRUD handlers
//!
//! Back-office maintenance of the shipment aggregate and its billing
//! extension. Separate from bookings; the two aggregates share no key.

use crate::dto::common::PaginationParams;
use crate::dto::shipment::{ShipmentDetailsRequest, ShipmentRequest};
use actix_web::{web, HttpResponse};
use lorry_core::traits::{Repository, ShipmentRepository};
use lorry_core::AppError;
use lorry_db::PgShipmentRepository;
use sqlx::PgPool;
use tracing::{info, instrument};
use validator::Validate;

fn repo(pool: &PgPool) -> PgShipmentRepository {
    PgShipmentRepository::new(pool.clone())
}

/// List shipments, newest first
///
/// GET /api/shipments/
#[instrument(skip(pool))]
pub async fn list_shipments(
    pool: web::Data<PgPool>,
    params: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    let repo = repo(pool.get_ref());
    let shipments = repo.find_all(params.limit(), params.offset()).await?;
    let total = repo.count().await?;

    Ok(HttpResponse::Ok().json(params.paginate(shipments, total)))
}

/// Fetch one shipment
///
/// GET /api/shipments/{id}
#[instrument(skip(pool))]
pub async fn get_shipment(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let shipment = repo(pool.get_ref())
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ShipmentNotFound(id.to_string()))?;

    Ok(HttpResponse::Ok().json(shipment))
}

/// Create a shipment
///
/// POST /api/shipments/
#[instrument(skip(pool, req))]
pub async fn create_shipment(
    pool: web::Data<PgPool>,
    req: web::Json<ShipmentRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let shipment = req.into_inner().into_shipment(0);
    let created = repo(pool.get_ref()).create(&shipment).await?;

    info!(
        shipment_id = created.id,
        tracking_number = %created.tracking_number,
        "Shipment created"
    );
    Ok(HttpResponse::Created().json(created))
}

/// Replace a shipment
///
/// PUT /api/shipments/{id}
#[instrument(skip(pool, req))]
pub async fn update_shipment(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    req: web::Json<ShipmentRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let shipment = req.into_inner().into_shipment(path.into_inner());
    let updated = repo(pool.get_ref()).update(&shipment).await?;

    info!(shipment_id = updated.id, status = %updated.status, "Shipment updated");
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete a shipment (cascades to its billing extension)
///
/// DELETE /api/shipments/{id}
#[instrument(skip(pool))]
pub async fn delete_shipment(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let deleted = repo(pool.get_ref()).delete(id).await?;
    if !deleted {
        return Err(AppError::ShipmentNotFound(id.to_string()));
    }

    info!(shipment_id = id, "Shipment deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch the billing extension for a shipment
///
/// GET /api/shipments/{id}/details
#[instrument(skip(pool))]
pub async fn get_details(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let details = repo(pool.get_ref())
        .find_details(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No details for shipment {}", id)))?;

    Ok(HttpResponse::Ok().json(details))
}

/// Create or replace the billing extension
///
/// PUT /api/shipments/{id}/details
#[instrument(skip(pool, req))]
pub async fn upsert_details(
    pool: web::Data<PgPool>,
    path: web::Path<i64>,
    req: web::Json<ShipmentDetailsRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let repo = repo(pool.get_ref());

    // The upsert relies on the FK; surface a clean 404 first
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::ShipmentNotFound(id.to_string()))?;

    let details = repo.upsert_details(&req.into_inner().into_details(id)).await?;

    info!(shipment_id = id, "Shipment details upserted");
    Ok(HttpResponse::Ok().json(details))
}

/// Configure shipment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/shipments")
            .route("", web::get().to(list_shipments))
            .route("", web::post().to(create_shipment))
            .route("/{id}", web::get().to(get_shipment))
            .route("/{id}", web::put().to(update_shipment))
            .route("/{id}", web::delete().to(delete_shipment))
            .route("/{id}/details", web::get().to(get_details))
            .route("/{id}/details", web::put().to(upsert_details)),
    );
}
