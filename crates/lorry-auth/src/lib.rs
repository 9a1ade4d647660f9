//! Authentication and authorization for the lorry booking backend
//!
//! This crate provides JWT-based authentication, password hashing with Argon2,
//! and Actix-web request extractors.
//!
//! # Features
//!
//! - JWT token creation and validation
//! - Argon2 password hashing and verification
//! - Request extractors for required, optional, and staff-only authentication
//!
//! # Examples
//!
//! ## Creating a JWT token
//!
//! ```no_run
//! use lorry_auth::{Claims, JwtService};
//! use lorry_core::models::UserType;
//!
//! let jwt_service = JwtService::new("your-secret-key", 1800);
//! let claims = Claims::new("asha", 7, UserType::Client);
//! let token = jwt_service.create_token(&claims)?;
//! # Ok::<(), lorry_core::AppError>(())
//! ```
//!
//! ## Password hashing
//!
//! ```no_run
//! use lorry_auth::PasswordService;
//!
//! let password_service = PasswordService::new();
//! let hash = password_service.hash_password("secure_password")?;
//! let is_valid = password_service.verify_password("secure_password", &hash)?;
//! assert!(is_valid);
//! # Ok::<(), lorry_core::AppError>(())
//! ```

pub mod claims;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use claims::Claims;
pub use jwt::JwtService;
pub use middleware::{AuthenticatedUser, MaybeUser, StaffUser};
pub use password::PasswordService;

#[cfg(test)]
mod tests {
    use super::*;
    use lorry_core::models::UserType;

    #[test]
    fn test_integration_jwt_and_password() {
        let password_service = PasswordService::new();
        let jwt_service = JwtService::new("test-secret-key-12345", 3600);

        let password = "my_secure_password";
        let hash = password_service.hash_password(password).unwrap();
        assert!(password_service.verify_password(password, &hash).unwrap());
        assert!(!password_service
            .verify_password("wrong_password", &hash)
            .unwrap());

        let claims = Claims::new("asha", 3, UserType::Agent);
        let token = jwt_service.create_token(&claims).unwrap();
        let decoded_claims = jwt_service.validate_token(&token).unwrap();

        assert_eq!(decoded_claims.sub, "asha");
        assert_eq!(decoded_claims.user_id, 3);
        assert_eq!(decoded_claims.user_type, UserType::Agent);
    }
}
