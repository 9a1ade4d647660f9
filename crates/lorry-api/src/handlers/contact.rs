//! Contact-form handler

use crate::dto::contact::{ContactRequest, ContactResponse};
use actix_web::{web, HttpResponse};
use lorry_core::config::AppConfig;
use lorry_core::traits::Mailer;
use lorry_core::AppError;
use lorry_services::ContactService;
use std::sync::Arc;
use tracing::instrument;

/// Submit a contact query
///
/// POST /api/contact/
#[instrument(skip(mailer, config, req))]
pub async fn contact(
    mailer: web::Data<Arc<dyn Mailer>>,
    config: web::Data<AppConfig>,
    req: web::Json<ContactRequest>,
) -> Result<HttpResponse, AppError> {
    let service = ContactService::new(mailer.get_ref().clone(), config.mail.clone());
    service.send_query(&req.into_inner().into()).await?;

    Ok(HttpResponse::Ok().json(ContactResponse::default()))
}

/// Configure contact routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/contact", web::post().to(contact));
}
