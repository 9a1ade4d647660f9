//! Public tracking lookup
//!
//! Serves the customer-facing tracking widget. The timeline is synthetic:
//! two fixed events derived from the booking record, not a live event feed.

use lorry_core::{models::Booking, traits::BookingRepository, AppResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Message returned when no booking matches the queried number
pub const NOT_FOUND_MESSAGE: &str =
    "No shipment found with this tracking number. Please check and try again.";

/// One entry in the tracking timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingUpdate {
    pub status: String,
    pub location: String,
    pub timestamp: Option<String>,
    pub description: String,
}

/// Tracking payload for a found booking
///
/// Field names match the public widget contract, hence the camelCase
/// renames.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingPayload {
    pub success: bool,

    #[serde(rename = "trackingNumber")]
    pub tracking_number: String,

    pub status: String,

    #[serde(rename = "estimatedDelivery")]
    pub estimated_delivery: Option<String>,

    pub origin: String,
    pub destination: String,
    pub service: String,
    pub weight: String,
    pub updates: Vec<TrackingUpdate>,
}

impl TrackingPayload {
    fn from_booking(booking: &Booking) -> Self {
        let timestamp = Some(booking.booking_date.format("%Y-%m-%dT%H:%M:%S").to_string());

        Self {
            success: true,
            tracking_number: booking.lr_no.clone(),
            status: booking.status.clone(),
            estimated_delivery: booking.dod.map(|d| d.format("%Y-%m-%d").to_string()),
            origin: booking.from_location.clone(),
            destination: booking.to_location.clone(),
            service: "Standard Delivery".to_string(),
            weight: booking.weight_label(),
            updates: vec![
                TrackingUpdate {
                    status: "Order Placed".to_string(),
                    location: booking.from_location.clone(),
                    timestamp: timestamp.clone(),
                    description: "Order has been placed and confirmed.".to_string(),
                },
                TrackingUpdate {
                    status: "In Transit".to_string(),
                    location: booking.from_location.clone(),
                    timestamp,
                    description: "Package is in transit to the next facility.".to_string(),
                },
            ],
        }
    }
}

/// Tracking lookup service
pub struct TrackingService<R: BookingRepository> {
    repo: Arc<R>,
}

impl<R: BookingRepository> TrackingService<R> {
    /// Create a new tracking service
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Look up a booking by LR number (case-insensitive)
    ///
    /// Returns `None` on a miss; the HTTP layer turns that into a 200
    /// `{success: false}` body, never a 404.
    #[instrument(skip(self))]
    pub async fn track(&self, lr_no: &str) -> AppResult<Option<TrackingPayload>> {
        let booking = self.repo.find_by_lr_no(lr_no).await?;

        match booking {
            Some(ref b) => {
                debug!(lr_no = %b.lr_no, status = %b.status, "Tracking hit");
                Ok(Some(TrackingPayload::from_booking(b)))
            }
            None => {
                debug!(lr_no = %lr_no, "Tracking miss");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::tests::{valid_draft, MemoryBookingRepo};
    use crate::booking::BookingService;
    use lorry_core::config::BookingConfig;

    async fn seeded_repo() -> Arc<MemoryBookingRepo> {
        let repo = Arc::new(MemoryBookingRepo::new());
        let svc = BookingService::new(repo.clone(), BookingConfig::default());
        svc.create_booking(valid_draft(), None).await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_tracking_hit_has_exactly_two_events_at_booking_time() {
        let repo = seeded_repo().await;
        let svc = TrackingService::new(repo.clone());

        let payload = svc.track("1").await.unwrap().unwrap();

        assert!(payload.success);
        assert_eq!(payload.tracking_number, "1");
        assert_eq!(payload.origin, "Pune");
        assert_eq!(payload.destination, "Mumbai");
        assert_eq!(payload.service, "Standard Delivery");
        assert_eq!(payload.weight, "12.5 kg");

        assert_eq!(payload.updates.len(), 2);
        assert_eq!(payload.updates[0].status, "Order Placed");
        assert_eq!(
            payload.updates[0].description,
            "Order has been placed and confirmed."
        );
        assert_eq!(payload.updates[1].status, "In Transit");
        assert_eq!(
            payload.updates[1].description,
            "Package is in transit to the next facility."
        );

        // Both events sit at the booking creation instant, at the origin
        assert_eq!(payload.updates[0].timestamp, payload.updates[1].timestamp);
        assert!(payload.updates[0].timestamp.is_some());
        assert_eq!(payload.updates[0].location, "Pune");
        assert_eq!(payload.updates[1].location, "Pune");
    }

    #[tokio::test]
    async fn test_tracking_reflects_current_status() {
        let repo = seeded_repo().await;
        let booking_svc = BookingService::new(repo.clone(), BookingConfig::default());
        booking_svc.update_status("1", "delivered").await.unwrap();

        let svc = TrackingService::new(repo);
        let payload = svc.track("1").await.unwrap().unwrap();
        assert_eq!(payload.status, "delivered");
    }

    #[tokio::test]
    async fn test_tracking_miss_is_none() {
        let repo = seeded_repo().await;
        let svc = TrackingService::new(repo);

        assert!(svc.track("does-not-exist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_estimated_delivery_absent_when_no_dod() {
        let repo = seeded_repo().await;
        let svc = TrackingService::new(repo);

        let payload = svc.track("1").await.unwrap().unwrap();
        assert!(payload.estimated_delivery.is_none());
    }
}
