//! Actix-web authentication middleware and request extractors
//!
//! Provides extractors for authenticated users. `AuthenticatedUser` rejects
//! unauthenticated requests; `MaybeUser` resolves to `None` instead, for
//! endpoints that accept anonymous callers; `StaffUser` additionally requires
//! an account type with export privileges.

use crate::jwt::JwtService;
use crate::Claims;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use lorry_core::models::UserType;
use lorry_core::AppError;
use std::sync::Arc;
use tracing::{debug, warn};

/// Extract JWT token from request
///
/// Checks for token in the following order:
/// 1. Authorization header (Bearer token)
/// 2. Cookie named "token"
fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie) = req.cookie("token") {
        return Some(cookie.value().to_string());
    }

    None
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let jwt_service = req
        .app_data::<web::Data<Arc<JwtService>>>()
        .map(|service| service.get_ref().clone())
        .ok_or_else(|| {
            warn!("JwtService not found in app data");
            AppError::Unauthorized("Authentication service not configured".to_string())
        })?;

    let token = extract_token_from_request(req).ok_or_else(|| {
        debug!("No authentication token found in request");
        AppError::Unauthorized("No authentication token provided".to_string())
    })?;

    let claims = jwt_service.validate_token(&token).map_err(|e| {
        warn!(error = %e, "Token validation failed");
        e
    })?;

    debug!(
        name = %claims.sub,
        user_type = ?claims.user_type,
        "User authenticated successfully"
    );

    Ok(AuthenticatedUser {
        name: claims.sub.clone(),
        user_id: claims.user_id,
        user_type: claims.user_type,
        claims,
    })
}

/// Authenticated user extractor
///
/// Extracts and validates the JWT token from the request; rejects the
/// request when no valid token is present.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Display name of the authenticated user
    pub name: String,

    /// Database identity of the user
    pub user_id: i64,

    /// Account type
    pub user_type: UserType,

    /// Full claims from the JWT token
    pub claims: Claims,
}

impl AuthenticatedUser {
    /// Whether this account may run exports
    pub fn can_export(&self) -> bool {
        self.user_type.can_export()
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map_err(Into::into))
    }
}

/// Optional user extractor
///
/// Resolves to `Some` when a valid token is present and `None` otherwise;
/// never rejects the request. Used by endpoints that serve both anonymous
/// and signed-in callers (booking creation attaches ownership only when a
/// user is present).
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<AuthenticatedUser>);

impl MaybeUser {
    /// The owning user id, when authenticated
    pub fn user_id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.user_id)
    }
}

impl FromRequest for MaybeUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(authenticate(req).ok())))
    }
}

/// Staff user extractor
///
/// Requires an admin or agent account; clients get `Forbidden`.
#[derive(Debug, Clone)]
pub struct StaffUser(pub AuthenticatedUser);

impl std::ops::Deref for StaffUser {
    type Target = AuthenticatedUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for StaffUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_user = match authenticate(req) {
            Ok(user) => user,
            Err(e) => return ready(Err(e.into())),
        };

        if !auth_user.can_export() {
            warn!(
                name = %auth_user.name,
                user_type = %auth_user.user_type,
                "User attempted staff access without privileges"
            );
            return ready(Err(AppError::Forbidden.into()));
        }

        ready(Ok(StaffUser(auth_user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use lorry_core::models::User;

    fn create_test_jwt_service() -> Arc<JwtService> {
        Arc::new(JwtService::new("test-secret-key-12345", 3600))
    }

    fn token_for(jwt_service: &JwtService, name: &str, user_type: UserType) -> String {
        let user = User {
            id: 42,
            name: name.to_string(),
            user_type,
            ..Default::default()
        };
        jwt_service.create_token_for_user(&user).unwrap()
    }

    #[actix_web::test]
    async fn test_extract_token_from_authorization_header() {
        let jwt_service = create_test_jwt_service();
        let token = token_for(&jwt_service, "asha", UserType::Client);

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|user: AuthenticatedUser| async move {
                assert_eq!(user.name, "asha");
                assert_eq!(user.user_id, 42);
                "OK"
            }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_extract_token_from_cookie() {
        let jwt_service = create_test_jwt_service();
        let token = token_for(&jwt_service, "asha", UserType::Client);

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|_user: AuthenticatedUser| async { "OK" }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .cookie(actix_web::cookie::Cookie::new("token", token))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_missing_token() {
        let jwt_service = create_test_jwt_service();

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|_user: AuthenticatedUser| async { "OK" }),
        ))
        .await;

        let req = test::TestRequest::get().uri("/test").to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403); // Unauthorized maps to forbidden
    }

    #[actix_web::test]
    async fn test_invalid_token() {
        let jwt_service = create_test_jwt_service();

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|_user: AuthenticatedUser| async { "OK" }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header(("Authorization", "Bearer invalid.token.here"))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_maybe_user_without_token() {
        let jwt_service = create_test_jwt_service();

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|user: MaybeUser| async move {
                assert!(user.0.is_none());
                "OK"
            }),
        ))
        .await;

        let req = test::TestRequest::get().uri("/test").to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_maybe_user_with_token() {
        let jwt_service = create_test_jwt_service();
        let token = token_for(&jwt_service, "asha", UserType::Client);

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/test",
            web::get().to(|user: MaybeUser| async move {
                assert_eq!(user.user_id(), Some(42));
                "OK"
            }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/test")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_staff_user_with_agent_account() {
        let jwt_service = create_test_jwt_service();
        let token = token_for(&jwt_service, "agent", UserType::Agent);

        let app = test::init_service(App::new().app_data(web::Data::new(jwt_service)).route(
            "/staff",
            web::get().to(|staff: StaffUser| async move {
                assert_eq!(staff.name, "agent");
                "OK"
            }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/staff")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_staff_user_with_client_account() {
        let jwt_service = create_test_jwt_service();
        let token = token_for(&jwt_service, "client", UserType::Client);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jwt_service))
                .route("/staff", web::get().to(|_staff: StaffUser| async { "OK" })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/staff")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }
}
