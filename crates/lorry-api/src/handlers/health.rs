//! Health check handler

use actix_web::{web, HttpResponse};
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;

/// Liveness probe
///
/// GET /api/health
#[instrument(skip(pool))]
pub async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    let database = match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => "up",
        Err(_) => "down",
    };

    HttpResponse::Ok().json(json!({
        "status": "ok",
        "database": database,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Configure health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
