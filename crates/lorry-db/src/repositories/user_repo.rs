//! User repository implementation

use async_trait::async_trait;
use lorry_core::{
    models::{User, UserType},
    traits::UserRepository,
    AppError, AppResult,
};
use sqlx::{PgPool, Row};
use tracing::{debug, error, instrument};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, user_type, active, last_login, created_at";

/// PostgreSQL implementation of UserRepository
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: &sqlx::postgres::PgRow) -> User {
        let type_str: String = row.get("user_type");
        User {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            user_type: UserType::from_str(&type_str).unwrap_or_default(),
            active: row.get("active"),
            last_login: row.get("last_login"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, user))]
    async fn create(&self, user: &User) -> AppResult<User> {
        debug!("Creating user: {}", user.name);

        let result = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, user_type, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.user_type.to_string())
        .bind(user.active)
        .map(|row| Self::map_row(&row))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .and_then(|db| db.code())
                .map(|code| code == "23505")
                .unwrap_or(false)
            {
                AppError::AlreadyExists(format!(
                    "User with name {} or email {} already exists",
                    user.name, user.email
                ))
            } else {
                error!("Failed to create user: {}", e);
                AppError::Database(format!("Failed to create user: {}", e))
            }
        })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> AppResult<Option<User>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM users WHERE name = $1",
            USER_COLUMNS
        ))
        .bind(name)
        .map(|row| Self::map_row(&row))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user {}: {}", name, e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .map(|row| Self::map_row(&row))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error finding user by email: {}", e);
            AppError::Database(format!("Failed to find user: {}", e))
        })?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn update_last_login(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to update last login for user {}: {}", id, e);
                AppError::Database(format!("Failed to update last login: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::UserNotFound(id.to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        crate::create_pool(&url, Some(5)).await.unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_create_and_find_user() {
        let repo = PgUserRepository::new(test_pool().await);
        let suffix = chrono::Utc::now().timestamp_nanos_opt().unwrap();

        let user = User {
            name: format!("user-{}", suffix),
            email: format!("user-{}@example.com", suffix),
            password_hash: "argon2-hash".to_string(),
            ..Default::default()
        };

        let created = repo.create(&user).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.user_type, UserType::Client);

        let found = repo.find_by_name(&user.name).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        // Email lookup is case-insensitive
        let found = repo
            .find_by_email(&user.email.to_uppercase())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_update_last_login_unknown_user() {
        let repo = PgUserRepository::new(test_pool().await);
        let err = repo.update_last_login(-1).await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }
}
