//! Booking handlers
//!
//! Creation, listing, status updates, and the per-user booking feed.

use crate::dto::booking::{
    BookingCreateRequest, BookingCreatedResponse, BookingFilterParams, StatusUpdateRequest,
    StatusUpdateResponse,
};
use actix_web::{web, HttpResponse};
use lorry_auth::{AuthenticatedUser, MaybeUser};
use lorry_core::config::AppConfig;
use lorry_core::traits::Pagination;
use lorry_core::AppError;
use lorry_db::PgBookingRepository;
use lorry_services::BookingService;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};

fn booking_service(pool: &PgPool, config: &AppConfig) -> BookingService<PgBookingRepository> {
    let repo = Arc::new(PgBookingRepository::new(pool.clone()));
    BookingService::new(repo, config.booking.clone())
}

/// Create a booking
///
/// POST /api/bookings/
///
/// Anonymous submissions are accepted; a signed-in caller's id is attached
/// to the booking.
#[instrument(skip(pool, config, req), fields(user_id = ?user.user_id()))]
pub async fn create_booking(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: MaybeUser,
    req: web::Json<BookingCreateRequest>,
) -> Result<HttpResponse, AppError> {
    let service = booking_service(pool.get_ref(), config.get_ref());
    let booking = service
        .create_booking(req.into_inner().into(), user.user_id())
        .await?;

    Ok(HttpResponse::Created().json(BookingCreatedResponse::new(booking.id, booking.lr_no)))
}

/// Paginated, filterable booking list
///
/// GET /api/customer-shipments/
#[instrument(skip(pool, config))]
pub async fn customer_shipments(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    params: web::Query<BookingFilterParams>,
) -> Result<HttpResponse, AppError> {
    debug!(
        page = params.pagination.page,
        page_size = params.pagination.page_size,
        "Listing bookings"
    );

    let service = booking_service(pool.get_ref(), config.get_ref());
    let pagination = Pagination::new(params.pagination.page, params.pagination.page_size);
    let page = service.list(params.to_query(None), pagination).await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Overwrite a booking's status, appending a timeline event
///
/// POST /api/update-shipment-status/
#[instrument(skip(pool, config, req))]
pub async fn update_shipment_status(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    req: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    let (lr_no, status) = match (
        req.lr_no.as_deref().map(str::trim),
        req.status.as_deref().map(str::trim),
    ) {
        (Some(lr_no), Some(status)) if !lr_no.is_empty() && !status.is_empty() => (lr_no, status),
        _ => {
            return Err(AppError::MissingField(
                "LR No and status are required.".to_string(),
            ))
        }
    };

    let service = booking_service(pool.get_ref(), config.get_ref());
    let updated = service.update_status(lr_no, status).await?;

    Ok(HttpResponse::Ok().json(StatusUpdateResponse {
        success: true,
        lr_no: updated.lr_no,
        status: updated.status,
    }))
}

/// The signed-in caller's bookings, newest first
///
/// GET /api/user-bookings/
#[instrument(skip(pool, config, user), fields(user_id = user.user_id))]
pub async fn user_bookings(
    pool: web::Data<PgPool>,
    config: web::Data<AppConfig>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let service = booking_service(pool.get_ref(), config.get_ref());
    let bookings = service.user_bookings(user.user_id).await?;

    Ok(HttpResponse::Ok().json(bookings))
}

/// Configure booking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/bookings", web::post().to(create_booking))
        .route("/customer-shipments", web::get().to(customer_shipments))
        .route(
            "/update-shipment-status",
            web::post().to(update_shipment_status),
        )
        .route("/user-bookings", web::get().to(user_bookings));
}
