//! Lorry Backend Database Layer
//!
//! This crate provides PostgreSQL database access and repository
//! implementations for the lorry booking backend. It includes:
//!
//! - Connection pool management with sqlx
//! - Repository implementations for bookings, shipments, and users
//! - Transactional LR number allocation with conflict detection

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use lorry_core::{AppError, AppResult};
pub use sqlx::{PgPool, Postgres, Transaction};
