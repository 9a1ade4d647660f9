//! Domain models for the lorry booking backend

pub mod booking;
pub mod shipment;
pub mod user;

pub use booking::{Address, AddressSide, Booking, RouteDetails, TimelineEvent};
pub use shipment::{Shipment, ShipmentDetails};
pub use user::{User, UserInfo, UserType};
