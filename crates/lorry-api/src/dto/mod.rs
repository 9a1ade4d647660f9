//! Data Transfer Objects
//!
//! Request and response types for the HTTP API, separated from the domain
//! models so the wire contract can evolve independently.

pub mod auth;
pub mod booking;
pub mod common;
pub mod contact;
pub mod shipment;
pub mod tracking;

pub use common::{ApiResponse, PaginationParams};
