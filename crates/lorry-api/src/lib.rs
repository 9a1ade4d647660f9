//! API layer for the lorry booking backend
//!
//! HTTP handlers and DTOs for bookings, tracking, exports, shipments,
//! authentication, and the contact form.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;

// Re-export DTOs (common types)
pub use dto::{ApiResponse, PaginationParams};

// Re-export the route configuration entry point
pub use handlers::configure;
