use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use shared::types::{AvailabilityStatus, CalendarEntry};
use uuid::Uuid;

use crate::domain::availability::{
    AssignDates, AssignRange, CalendarQuery, CalendarStore, ReserveRange,
};
use crate::domain::calendar::{WorkerCalendar, expand_range, normalize_dates, validate_range};
use crate::error::AvailabilityServiceError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    /// Upper bound on how many days a single range assignment or reservation
    /// may span. Guards against accidental multi-year paints from the UI.
    pub max_range_days: usize,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self { max_range_days: 366 }
    }
}

impl AvailabilityConfig {
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        if !Path::new(path).exists() {
            tracing::info!("Config file not found at {path}, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        tracing::info!(?config, "Loaded availability config from {path}");
        Ok(config)
    }
}

/// Calendar engine for one worker at a time: paints availability over ranges
/// or explicit day lists, answers calendar queries, and commits bookings with
/// the conflict re-check folded into the same versioned write.
pub struct AvailabilityService {
    store: Arc<dyn CalendarStore>,
    config: AvailabilityConfig,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn CalendarStore>, config: AvailabilityConfig) -> Self {
        Self { store, config }
    }

    /// Validates and expands `[start, end]` against the configured span limit.
    fn checked_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<NaiveDate>, AvailabilityServiceError> {
        let days = expand_range(start, end)?;
        if days.len() > self.config.max_range_days {
            return Err(AvailabilityServiceError::InvalidRange(format!(
                "range {start} to {end} covers {} days, more than the allowed {}",
                days.len(),
                self.config.max_range_days
            )));
        }
        Ok(days)
    }

    /// The shared update primitive both assigners converge on: load the full
    /// entry set, overwrite the target days in memory, save the whole set
    /// back under the loaded version.
    async fn overwrite(
        &self,
        worker_id: Uuid,
        days: &[NaiveDate],
        status: AvailabilityStatus,
        booking_ref: Option<Uuid>,
        note: Option<String>,
    ) -> Result<usize, AvailabilityServiceError> {
        let loaded = self.store.load(worker_id).await?;
        let mut calendar = WorkerCalendar::from_entries(loaded.entries);
        let written = calendar.assign(days, status, booking_ref, note);
        self.store
            .save(worker_id, loaded.version, calendar.into_entries())
            .await?;

        Ok(written)
    }

    #[tracing::instrument(skip(self))]
    pub async fn provision(&self, worker_id: Uuid) -> Result<(), AvailabilityServiceError> {
        self.store.provision(worker_id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn destroy(&self, worker_id: Uuid) -> Result<(), AvailabilityServiceError> {
        self.store.destroy(worker_id).await
    }

    /// Paints one status over every day in the inclusive range, replacing
    /// whatever was there before, occupied days included. Callers that need
    /// to preserve live bookings must check for conflicts first.
    #[tracing::instrument(skip(self, req), fields(start = %req.start_date, end = %req.end_date))]
    pub async fn assign_range(
        &self,
        worker_id: Uuid,
        req: AssignRange,
    ) -> Result<usize, AvailabilityServiceError> {
        let days = self.checked_range(req.start_date, req.end_date)?;
        self.overwrite(worker_id, &days, req.status, req.booking_ref, req.note)
            .await
    }

    /// Same overwrite semantics as [`assign_range`](Self::assign_range),
    /// driven by an explicit, possibly non-contiguous day list.
    #[tracing::instrument(skip(self, req))]
    pub async fn assign_dates(
        &self,
        worker_id: Uuid,
        req: AssignDates,
    ) -> Result<usize, AvailabilityServiceError> {
        let days = normalize_dates(&req.dates)?;
        self.overwrite(worker_id, &days, req.status, req.booking_ref, req.note)
            .await
    }

    /// Read-only projection of the calendar, optionally windowed by date
    /// and/or filtered by status. An inverted window yields an empty list
    /// rather than an error.
    #[tracing::instrument(skip(self, filter))]
    pub async fn query(
        &self,
        worker_id: Uuid,
        filter: CalendarQuery,
    ) -> Result<Vec<CalendarEntry>, AvailabilityServiceError> {
        let loaded = self.store.load(worker_id).await?;
        let calendar = WorkerCalendar::from_entries(loaded.entries);
        Ok(calendar.select(filter.start_date, filter.end_date, filter.status))
    }

    /// True when no day in `[start, end]` is already occupied. This is a
    /// read-only preview; [`reserve_range`](Self::reserve_range) is what
    /// actually commits a booking.
    #[tracing::instrument(skip(self))]
    pub async fn check_conflict(
        &self,
        worker_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<bool, AvailabilityServiceError> {
        validate_range(start, end)?;
        let loaded = self.store.load(worker_id).await?;
        let calendar = WorkerCalendar::from_entries(loaded.entries);

        Ok(!calendar.has_occupied(start, end))
    }

    /// Removes every entry in `[start, end]` with no replacement, returning
    /// how many were dropped.
    #[tracing::instrument(skip(self))]
    pub async fn delete_range(
        &self,
        worker_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, AvailabilityServiceError> {
        validate_range(start, end)?;
        let loaded = self.store.load(worker_id).await?;
        let mut calendar = WorkerCalendar::from_entries(loaded.entries);
        let removed = calendar.remove_range(start, end);
        self.store
            .save(worker_id, loaded.version, calendar.into_entries())
            .await?;

        Ok(removed)
    }

    /// Commits a booking: re-checks for occupied days on the loaded snapshot
    /// and writes the occupied entries under the same version, so a
    /// concurrent writer surfaces as `Conflict` instead of a silent
    /// double-booking.
    #[tracing::instrument(
        skip(self, req),
        fields(start = %req.start_date, end = %req.end_date, booking_ref = %req.booking_ref)
    )]
    pub async fn reserve_range(
        &self,
        worker_id: Uuid,
        req: ReserveRange,
    ) -> Result<usize, AvailabilityServiceError> {
        let days = self.checked_range(req.start_date, req.end_date)?;
        let loaded = self.store.load(worker_id).await?;
        let mut calendar = WorkerCalendar::from_entries(loaded.entries);

        if calendar.has_occupied(req.start_date, req.end_date) {
            return Err(AvailabilityServiceError::Conflict(format!(
                "worker {worker_id} already has a booking between {} and {}",
                req.start_date, req.end_date
            )));
        }

        let written = calendar.assign(
            &days,
            AvailabilityStatus::Occupied,
            Some(req.booking_ref),
            req.note,
        );
        self.store
            .save(worker_id, loaded.version, calendar.into_entries())
            .await?;

        Ok(written)
    }
}
