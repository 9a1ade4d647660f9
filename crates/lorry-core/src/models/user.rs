//! User model
//!
//! Represents system accounts for authentication and booking ownership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// User type discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Back-office administrator
    Admin,
    /// Branch agent
    Agent,
    /// Customer account (default for API self-registration)
    #[default]
    Client,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::Admin => write!(f, "admin"),
            UserType::Agent => write!(f, "agent"),
            UserType::Client => write!(f, "client"),
        }
    }
}

impl UserType {
    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserType::Admin),
            "agent" => Some(UserType::Agent),
            "client" => Some(UserType::Client),
            _ => None,
        }
    }

    /// Whether this account type may run exports
    pub fn can_export(&self) -> bool {
        matches!(self, UserType::Admin | UserType::Agent)
    }
}

/// User entity
///
/// Owns zero or more bookings. Deleting a user nulls the booking reference,
/// it never deletes the bookings themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,

    /// Display name (unique, used as login name)
    pub name: String,

    /// Email address (unique, used for credential exchange)
    pub email: String,

    /// Password hash (never expose in API responses)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account discriminator
    pub user_type: UserType,

    /// Whether user may log in
    pub active: bool,

    /// Last login timestamp
    pub last_login: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check if the account may authenticate
    pub fn can_login(&self) -> bool {
        self.active
    }
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            email: String::new(),
            password_hash: String::new(),
            user_type: UserType::Client,
            active: true,
            last_login: None,
            created_at: Utc::now(),
        }
    }
}

/// Public projection of a user, safe for API responses
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub user_type: UserType,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            user_type: user.user_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_type_parsing() {
        assert_eq!(UserType::from_str("Admin"), Some(UserType::Admin));
        assert_eq!(UserType::from_str("AGENT"), Some(UserType::Agent));
        assert_eq!(UserType::from_str("client"), Some(UserType::Client));
        assert_eq!(UserType::from_str("driver"), None);
    }

    #[test]
    fn test_user_type_display_roundtrip() {
        for t in [UserType::Admin, UserType::Agent, UserType::Client] {
            assert_eq!(UserType::from_str(&t.to_string()), Some(t));
        }
    }

    #[test]
    fn test_export_permission() {
        assert!(UserType::Admin.can_export());
        assert!(UserType::Agent.can_export());
        assert!(!UserType::Client.can_export());
    }

    #[test]
    fn test_inactive_user_cannot_login() {
        let user = User {
            active: false,
            ..Default::default()
        };
        assert!(!user.can_login());
    }

    #[test]
    fn test_user_info_projection() {
        let user = User {
            id: 7,
            name: "asha".to_string(),
            email: "asha@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            user_type: UserType::Agent,
            ..Default::default()
        };

        let info = UserInfo::from(&user);
        assert_eq!(info.id, 7);
        assert_eq!(info.user_type, UserType::Agent);
    }
}
