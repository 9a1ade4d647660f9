//! Repository implementations

pub mod booking_repo;
pub mod shipment_repo;
pub mod user_repo;

pub use booking_repo::PgBookingRepository;
pub use shipment_repo::PgShipmentRepository;
pub use user_repo::PgUserRepository;
