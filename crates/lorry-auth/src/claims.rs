//! JWT Claims structure
//!
//! Defines the claims structure used in JWT tokens for authentication.

use chrono::{Duration, Utc};
use lorry_core::models::UserType;
use serde::{Deserialize, Serialize};

/// JWT Claims
///
/// Standard claims used in JWT tokens for user authentication. The subject
/// is the user's display name; `user_id` carries the database identity so
/// booking ownership can be resolved without a lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject (display name)
    pub sub: String,

    /// Database identity of the user
    pub user_id: i64,

    /// Account type
    pub user_type: UserType,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create new claims for a user
    ///
    /// Expiration is left unset (0) and filled in by `JwtService`.
    pub fn new(name: &str, user_id: i64, user_type: UserType) -> Self {
        let now = Utc::now();

        Self {
            sub: name.to_string(),
            user_id,
            user_type,
            iat: now.timestamp(),
            exp: 0,
        }
    }

    /// Create new claims with custom expiration duration
    pub fn with_expiration(
        name: &str,
        user_id: i64,
        user_type: UserType,
        expires_in_secs: i64,
    ) -> Self {
        let now = Utc::now();
        let exp = now + Duration::seconds(expires_in_secs);

        Self {
            sub: name.to_string(),
            user_id,
            user_type,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp();
        self.exp <= now
    }

    /// Get the display name from the claims
    pub fn name(&self) -> &str {
        &self.sub
    }

    /// Whether this account may run exports
    pub fn can_export(&self) -> bool {
        self.user_type.can_export()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("asha", 7, UserType::Client);
        assert_eq!(claims.sub, "asha");
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.user_type, UserType::Client);
        assert!(claims.iat > 0);
    }

    #[test]
    fn test_claims_with_expiration() {
        let claims = Claims::with_expiration("admin", 1, UserType::Admin, 3600);
        assert!(!claims.is_expired());

        let now = Utc::now().timestamp();
        assert!(claims.exp > now);
        assert!(claims.exp <= now + 3600);
    }

    #[test]
    fn test_expired_claims() {
        let mut claims = Claims::new("user", 2, UserType::Client);
        claims.exp = (Utc::now() - Duration::hours(1)).timestamp();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_export_permission() {
        assert!(Claims::new("a", 1, UserType::Admin).can_export());
        assert!(Claims::new("b", 2, UserType::Agent).can_export());
        assert!(!Claims::new("c", 3, UserType::Client).can_export());
    }
}
