use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::types::{AvailabilityStatus, CalendarEntry, VersionedCalendar};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AvailabilityServiceError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: AvailabilityStatus,
    pub booking_ref: Option<Uuid>,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignDates {
    pub dates: Vec<NaiveDate>,
    pub status: AvailabilityStatus,
    pub booking_ref: Option<Uuid>,
    pub note: Option<String>,
}

/// Booking commit request; unlike the assigners the booking ref is mandatory.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReserveRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub booking_ref: Uuid,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CalendarQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<AvailabilityStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WrittenDays {
    pub days_written: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemovedEntries {
    pub entries_removed: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConflictCheck {
    pub is_available: bool,
}

/// Persistence boundary for one worker's calendar.
///
/// Mutation is full-replace: callers load the entry set, rebuild it in
/// memory, and save it back under the version they read. A save with a stale
/// version fails with `Conflict` instead of discarding the other writer.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait]
pub trait CalendarStore: Send + Sync {
    /// Fails with `NotFound` when no calendar is provisioned for the worker;
    /// an empty entry list is a valid result, not an error.
    async fn load(&self, worker_id: Uuid) -> Result<VersionedCalendar, AvailabilityServiceError>;

    /// Replaces the stored entry set with exactly the given entries. The
    /// caller is responsible for deduplicating by date; duplicates are
    /// rejected with `InvariantViolation`, never silently merged.
    async fn save(
        &self,
        worker_id: Uuid,
        expected_version: i64,
        entries: Vec<CalendarEntry>,
    ) -> Result<(), AvailabilityServiceError>;

    /// Creates an empty calendar for the worker. Idempotent, so profile
    /// creation can be retried safely.
    async fn provision(&self, worker_id: Uuid) -> Result<(), AvailabilityServiceError>;

    /// Removes the calendar and all its entries.
    async fn destroy(&self, worker_id: Uuid) -> Result<(), AvailabilityServiceError>;
}
