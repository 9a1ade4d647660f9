//! Booking orchestration
//!
//! Validates submissions, derives route fields from the address pair, and
//! drives the LR allocation retry loop around the repository.

use lorry_core::{
    config::BookingConfig,
    models::{Address, AddressSide, Booking, RouteDetails},
    models::TimelineEvent,
    traits::{BookingQuery, BookingRepository, PaginatedResponse, Pagination, PaginationMeta},
    AppError, AppResult,
};
use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A validated-on-entry booking submission
///
/// Everything the caller may supply; required fields are checked by
/// [`BookingService::create_booking`], the rest passes through unchanged.
#[derive(Debug, Clone, Default)]
pub struct NewBooking {
    pub pickup_address: Address,
    pub delivery_address: Address,

    pub service_type: String,
    pub package_type: String,
    pub weight: Option<f64>,
    pub dimensions: String,
    pub pickup_date: Option<NaiveDate>,
    pub pickup_time_window: String,
    pub payment_method: String,

    // Optional extras
    pub description: Option<String>,
    pub noofpkgs: Option<String>,
    pub saidtocontain: Option<String>,
    pub chargeable_weight: Option<Decimal>,
    pub freight: Option<Decimal>,
    pub sgst: Option<Decimal>,
    pub cgst: Option<Decimal>,
    pub policy_no: Option<String>,
    pub remarks: Option<String>,
    pub consignor: Option<String>,
    pub consignee: Option<String>,
    pub phone: Option<String>,
    pub dod: Option<NaiveDate>,
}

/// Booking business logic
///
/// Generic over the repository so the allocation retry loop and validation
/// can be exercised without a database.
pub struct BookingService<R: BookingRepository> {
    repo: Arc<R>,
    config: BookingConfig,
}

impl<R: BookingRepository> BookingService<R> {
    /// Create a new booking service
    pub fn new(repo: Arc<R>, config: BookingConfig) -> Self {
        Self { repo, config }
    }

    /// Create a booking from a submission
    ///
    /// Validates both addresses and the required shipment fields, derives
    /// the route, and persists with a bounded retry loop around LR number
    /// allocation. `user_id` is attached when the caller is signed in.
    #[instrument(skip(self, draft))]
    pub async fn create_booking(
        &self,
        draft: NewBooking,
        user_id: Option<i64>,
    ) -> AppResult<Booking> {
        draft.pickup_address.validate(AddressSide::Pickup)?;
        draft.delivery_address.validate(AddressSide::Delivery)?;

        let required = [
            ("service_type", &draft.service_type),
            ("package_type", &draft.package_type),
            ("dimensions", &draft.dimensions),
            ("pickup_time_window", &draft.pickup_time_window),
            ("payment_method", &draft.payment_method),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::MissingField(format!("{} is required.", field)));
            }
        }
        let weight = draft
            .weight
            .ok_or_else(|| AppError::MissingField("weight is required.".to_string()))?;
        let pickup_date = draft
            .pickup_date
            .ok_or_else(|| AppError::MissingField("pickup_date is required.".to_string()))?;

        let route = RouteDetails::derive(&draft.pickup_address, &draft.delivery_address);
        let delivery_email =
            (!route.delivery_email.is_empty()).then(|| route.delivery_email.clone());

        let booking = Booking {
            from_location: route.from_location,
            to_location: route.to_location,
            branch_from_phone: route.branch_from_phone,
            branch_to_phone: route.branch_to_phone,
            // actual_weight mirrors the submitted weight at creation
            actual_weight: Decimal::from_f64(weight),
            chargeable_weight: draft.chargeable_weight,
            weight,
            dimensions: draft.dimensions,
            description: draft.description,
            package_type: draft.package_type,
            service_type: draft.service_type,
            noofpkgs: draft.noofpkgs,
            saidtocontain: draft.saidtocontain,
            freight: draft.freight,
            sgst: draft.sgst,
            cgst: draft.cgst,
            payment_method: draft.payment_method,
            policy_no: draft.policy_no,
            remarks: draft.remarks,
            consignor: draft.consignor,
            consignee: draft.consignee,
            pickup_address: draft.pickup_address,
            delivery_address: draft.delivery_address,
            delivery_email,
            phone: draft.phone,
            pickup_date,
            pickup_time_window: draft.pickup_time_window,
            dod: draft.dod,
            status: self.config.default_status.clone(),
            user_id,
            ..Default::default()
        };

        let mut last_collision = None;
        for attempt in 1..=self.config.lr_allocation_retries {
            match self.repo.create(&booking).await {
                Ok(created) => {
                    info!(
                        lr_no = %created.lr_no,
                        booking_id = created.id,
                        from = %created.from_location,
                        to = %created.to_location,
                        "Booking created"
                    );
                    return Ok(created);
                }
                Err(AppError::DuplicateLrNumber(lr_no)) => {
                    warn!(attempt, lr_no = %lr_no, "LR allocation collided, retrying");
                    last_collision = Some(AppError::DuplicateLrNumber(lr_no));
                }
                Err(e) => return Err(e),
            }
        }

        last_collision
            .map(Err)
            .unwrap_or_else(|| Err(AppError::Internal("LR allocation produced no result".into())))
    }

    /// Change a booking's status, appending a timeline event
    ///
    /// The event is located at the booking's origin, matching the synthetic
    /// tracking feed.
    #[instrument(skip(self))]
    pub async fn update_status(&self, lr_no: &str, new_status: &str) -> AppResult<Booking> {
        if new_status.trim().is_empty() {
            return Err(AppError::MissingField("status is required.".to_string()));
        }

        let booking = self
            .repo
            .find_by_lr_no(lr_no)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(lr_no.to_string()))?;

        let event = TimelineEvent::status_change(new_status, &booking.from_location);
        let updated = self
            .repo
            .update_status(&booking.lr_no, new_status, &event)
            .await?;

        info!(lr_no = %updated.lr_no, status = %updated.status, "Booking status updated");
        Ok(updated)
    }

    /// Paginated, filterable booking listing
    #[instrument(skip(self, query))]
    pub async fn list(
        &self,
        query: BookingQuery,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Booking>> {
        let (bookings, total) = self
            .repo
            .list_filtered(&query, pagination.limit(), pagination.offset())
            .await?;

        Ok(PaginatedResponse {
            data: bookings,
            pagination: PaginationMeta::new(total, pagination.page, pagination.per_page),
        })
    }

    /// Bookings owned by a user, newest first
    #[instrument(skip(self))]
    pub async fn user_bookings(&self, user_id: i64) -> AppResult<Vec<Booking>> {
        self.repo.find_by_user(user_id).await
    }
}
