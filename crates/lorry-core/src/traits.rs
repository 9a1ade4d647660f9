//! Common traits for repositories and collaborators
//!
//! Defines abstractions for database access and for the external
//! collaborators (mail delivery) the booking logic depends on.

use crate::error::AppError;
use crate::models::{Booking, Shipment, ShipmentDetails, TimelineEvent, User};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Generic repository trait for CRUD operations
#[async_trait]
pub trait Repository<T, ID>: Send + Sync {
    /// Find entity by ID
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, AppError>;

    /// Find all entities with pagination
    async fn find_all(&self, limit: i64, offset: i64) -> Result<Vec<T>, AppError>;

    /// Count total entities
    async fn count(&self) -> Result<i64, AppError>;

    /// Create a new entity
    async fn create(&self, entity: &T) -> Result<T, AppError>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> Result<T, AppError>;

    /// Delete entity by ID
    async fn delete(&self, id: ID) -> Result<bool, AppError>;
}

/// Sort keys accepted by the booking list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingOrdering {
    #[default]
    BookingDate,
    Status,
    LrNo,
}

impl BookingOrdering {
    /// Parse a DRF-style ordering token ("lr_no", "-booking_date", ...)
    ///
    /// Returns the key and whether the sort is descending; unknown keys are
    /// rejected so the value can be interpolated into SQL safely.
    pub fn parse(token: &str) -> Option<(Self, bool)> {
        let (descending, key) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };

        let ordering = match key {
            "booking_date" => Self::BookingDate,
            "status" => Self::Status,
            "lr_no" => Self::LrNo,
            _ => return None,
        };

        Some((ordering, descending))
    }

    /// Column name for SQL ORDER BY (whitelisted)
    pub fn column(&self) -> &'static str {
        match self {
            Self::BookingDate => "booking_date",
            Self::Status => "status",
            Self::LrNo => "lr_no",
        }
    }
}

/// Filter set for booking list queries
#[derive(Debug, Clone, Default)]
pub struct BookingQuery {
    /// Inclusive lower bound on booking_date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on booking_date
    pub end_date: Option<NaiveDate>,
    /// Restrict to bookings owned by this user
    pub user_id: Option<i64>,
    /// Free-text search over lr_no / from_location / to_location / status
    pub search: Option<String>,
    /// Sort key
    pub ordering: BookingOrdering,
    /// Sort direction
    pub descending: bool,
}

/// Booking repository
///
/// Bookings are never updated or deleted through the API surface, so this
/// trait does not extend the generic [`Repository`]: creation (with LR
/// allocation), lookup, filtered listing, and status updates are the whole
/// contract.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Persist a new booking, allocating the next sequential LR number
    /// inside the same transaction.
    ///
    /// Fails with `AppError::DuplicateLrNumber` when a concurrent creation
    /// won the race for the same number; callers retry allocation.
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;

    /// Find a booking by LR number (case-insensitive exact match)
    async fn find_by_lr_no(&self, lr_no: &str) -> Result<Option<Booking>, AppError>;

    /// List bookings matching the query, newest first by default
    async fn list_filtered(
        &self,
        query: &BookingQuery,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Booking>, i64), AppError>;

    /// Overwrite the status and append a timeline event
    ///
    /// Fails with `AppError::BookingNotFound` when no booking matches.
    async fn update_status(
        &self,
        lr_no: &str,
        status: &str,
        event: &TimelineEvent,
    ) -> Result<Booking, AppError>;

    /// Bookings owned by a user, newest first
    async fn find_by_user(&self, user_id: i64) -> Result<Vec<Booking>, AppError>;
}

/// Shipment repository trait with specialized methods
#[async_trait]
pub trait ShipmentRepository: Repository<Shipment, i64> {
    /// Find shipment by carrier tracking number
    async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<Option<Shipment>, AppError>;

    /// Fetch the billing extension for a shipment, if one exists
    async fn find_details(&self, shipment_id: i64) -> Result<Option<ShipmentDetails>, AppError>;

    /// Create or replace the billing extension for a shipment
    async fn upsert_details(&self, details: &ShipmentDetails)
        -> Result<ShipmentDetails, AppError>;
}

/// User repository trait with specialized methods
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Find user by display name
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, AppError>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Update last login timestamp
    async fn update_last_login(&self, id: i64) -> Result<(), AppError>;
}

/// Outbound mail collaborator
///
/// The booking logic only depends on this contract; the transport behind it
/// (SMTP, provider API, log sink) is wiring.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a single plain-text message
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Pagination parameters
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, serde::Serialize)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(total: i64, page: i64, per_page: i64) -> Self {
        let total_pages = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };

        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let p = Pagination::new(1, 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 10);

        let p = Pagination::new(3, 20);
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::new(0, 10); // page 0 becomes 1
        assert_eq!(p.page, 1);

        let p = Pagination::new(1, 500); // per_page capped at 100
        assert_eq!(p.per_page, 100);
    }

    #[test]
    fn test_pagination_meta() {
        let meta = PaginationMeta::new(95, 1, 10);
        assert_eq!(meta.total_pages, 10);

        let meta = PaginationMeta::new(101, 1, 10);
        assert_eq!(meta.total_pages, 11);
    }

    #[test]
    fn test_ordering_parse() {
        assert_eq!(
            BookingOrdering::parse("booking_date"),
            Some((BookingOrdering::BookingDate, false))
        );
        assert_eq!(
            BookingOrdering::parse("-lr_no"),
            Some((BookingOrdering::LrNo, true))
        );
        assert_eq!(
            BookingOrdering::parse("-status"),
            Some((BookingOrdering::Status, true))
        );
        // Unknown keys must be rejected, never interpolated into SQL
        assert_eq!(BookingOrdering::parse("freight"), None);
        assert_eq!(BookingOrdering::parse("; DROP TABLE bookings"), None);
    }
}
