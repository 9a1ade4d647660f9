//! HTTP handlers
//!
//! Route paths mirror the public API contract; all application routes live
//! under `/api`.

use actix_web::web;

pub mod auth;
pub mod booking;
pub mod contact;
pub mod export;
pub mod health;
pub mod shipment;
pub mod tracking;

/// Configure all application routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(auth::configure)
            .configure(booking::configure)
            .configure(tracking::configure)
            .configure(export::configure)
            .configure(contact::configure)
            .configure(shipment::configure)
            .configure(health::configure),
    );
}
