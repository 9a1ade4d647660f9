//! Business logic services for the lorry booking backend
//!
//! This crate contains the services that orchestrate booking creation,
//! tracking lookups, tabular exports, and contact-form handling.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service depends on repository/collaborator traits, not on sqlx
//! - Services are wrapped in Arc for safe sharing across async tasks
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError

pub mod booking;
pub mod contact;
pub mod export;
pub mod tracking;

pub use booking::{BookingService, NewBooking};
pub use contact::{ContactMessage, ContactService, TracingMailer};
pub use export::{parse_date_range, ExportService};
pub use tracking::{TrackingPayload, TrackingService, NOT_FOUND_MESSAGE};
