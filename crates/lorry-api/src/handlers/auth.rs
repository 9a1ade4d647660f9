//! Authentication handlers
//!
//! Self-registration and credential exchange. Login hands back the token in
//! the JSON body (`access`) and as an HttpOnly cookie for browser clients.

use crate::dto::auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use actix_web::{cookie::Cookie, web, HttpResponse};
use lorry_auth::{JwtService, PasswordService};
use lorry_core::models::{User, UserInfo, UserType};
use lorry_core::traits::UserRepository;
use lorry_core::AppError;
use lorry_db::PgUserRepository;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Register a new customer account
///
/// POST /api/register
#[instrument(skip(pool, password_service, req))]
pub async fn register(
    pool: web::Data<PgPool>,
    password_service: web::Data<Arc<PasswordService>>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Registration validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let password_hash = password_service.hash_password(&req.password)?;

    // Self-registration always produces a client account
    let new_user = User {
        name: req.name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        password_hash,
        user_type: UserType::Client,
        ..Default::default()
    };

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let created = user_repo.create(&new_user).await?;

    info!(user_id = created.id, name = %created.name, "User registered");

    Ok(HttpResponse::Created().json(RegisterResponse::default()))
}

/// Exchange credentials for a token
///
/// POST /api/login
#[instrument(skip(pool, jwt_service, password_service, req))]
pub async fn login(
    pool: web::Data<PgPool>,
    jwt_service: web::Data<Arc<JwtService>>,
    password_service: web::Data<Arc<PasswordService>>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    req.validate().map_err(|e| {
        warn!("Login validation failed: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let email = req.email.trim();
    debug!(email = %email, "Processing login request");

    let user_repo = PgUserRepository::new(pool.get_ref().clone());
    let user = user_repo.find_by_email(email).await?.ok_or_else(|| {
        info!(email = %email, "Login failed: user not found");
        AppError::InvalidCredentials
    })?;

    if !user.can_login() {
        warn!(email = %email, "Login failed: user is inactive");
        return Err(AppError::InvalidCredentials);
    }

    let password_valid = password_service.verify_password(&req.password, &user.password_hash)?;
    if !password_valid {
        info!(email = %email, "Login failed: invalid password");
        return Err(AppError::InvalidCredentials);
    }

    if let Err(e) = user_repo.update_last_login(user.id).await {
        warn!(user_id = user.id, "Failed to update last login: {}", e);
    }

    let token = jwt_service.create_token_for_user(&user)?;
    let expires_in = jwt_service.expiration_secs();

    info!(user_id = user.id, user_type = %user.user_type, "Login successful");

    let cookie = Cookie::build("token", token.clone())
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(actix_web::cookie::time::Duration::seconds(expires_in))
        .finish();

    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(LoginResponse::new(UserInfo::from(&user), token)))
}

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/register", web::post().to(register))
        .route("/login", web::post().to(login));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            email: "asha@example.com".to_string(),
            password: "password".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = LoginRequest {
            email: String::new(),
            password: String::new(),
        };
        assert!(invalid.validate().is_err());
    }
}
