use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-day booking status of a worker.
///
/// Only `Occupied` represents a committed booking; every other value is
/// non-blocking for conflict checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "availability_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AvailabilityStatus {
    Unset,
    Available,
    Unavailable,
    Occupied,
    Leave,
}

/// One calendar day of one worker's availability.
///
/// `booking_ref` points at the contract that occupies the day and is only
/// present when `status` is [`AvailabilityStatus::Occupied`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow, ToSchema)]
pub struct CalendarEntry {
    pub date: NaiveDate,
    pub status: AvailabilityStatus,
    pub booking_ref: Option<Uuid>,
    pub note: Option<String>,
}

/// A worker's full entry set together with the version it was read at.
///
/// The version is handed back on save so concurrent writers are detected
/// instead of overwriting each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedCalendar {
    pub version: i64,
    pub entries: Vec<CalendarEntry>,
}
