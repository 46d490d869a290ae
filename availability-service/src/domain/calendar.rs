use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use shared::types::{AvailabilityStatus, CalendarEntry};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("date list must not be empty")]
    EmptyDates,
}

/// Rejects inverted ranges before any storage access.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), CalendarError> {
    if start > end {
        return Err(CalendarError::InvalidRange { start, end });
    }
    Ok(())
}

/// Expands an inclusive `[start, end]` range into individual calendar days.
pub fn expand_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, CalendarError> {
    validate_range(start, end)?;

    let span = (end - start).num_days() + 1;
    Ok((0..span).map(|d| start + Duration::days(d)).collect())
}

/// Deduplicates an explicit day list into ascending order.
///
/// Callers hand in whatever the UI sent; the set itself is the input contract,
/// so repeated days collapse silently rather than erroring.
pub fn normalize_dates(dates: &[NaiveDate]) -> Result<Vec<NaiveDate>, CalendarError> {
    if dates.is_empty() {
        return Err(CalendarError::EmptyDates);
    }

    let unique: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    Ok(unique.into_iter().collect())
}

/// One worker's calendar, keyed by day.
///
/// Holding the entries in a map makes the one-entry-per-date and
/// ascending-order guarantees structural rather than checked after the fact.
/// Updates always replace whole entries; a date is never edited in place.
#[derive(Debug, Clone, Default)]
pub struct WorkerCalendar {
    entries: BTreeMap<NaiveDate, CalendarEntry>,
}

impl WorkerCalendar {
    pub fn from_entries(entries: Vec<CalendarEntry>) -> Self {
        let entries = entries.into_iter().map(|e| (e.date, e)).collect();
        Self { entries }
    }

    /// Writes a fresh entry for every given day, discarding whatever was
    /// there before regardless of status, occupied days included. Returns
    /// the number of days written.
    pub fn assign(
        &mut self,
        days: &[NaiveDate],
        status: AvailabilityStatus,
        booking_ref: Option<Uuid>,
        note: Option<String>,
    ) -> usize {
        // booking refs only carry meaning on occupied days
        let booking_ref = if status == AvailabilityStatus::Occupied {
            booking_ref
        } else {
            None
        };

        for &date in days {
            self.entries.insert(
                date,
                CalendarEntry {
                    date,
                    status,
                    booking_ref,
                    note: note.clone(),
                },
            );
        }

        days.len()
    }

    /// Drops every entry dated inside `[start, end]` with no replacement,
    /// returning how many were removed. The days revert to having no entry,
    /// which readers treat the same as unset.
    pub fn remove_range(&mut self, start: NaiveDate, end: NaiveDate) -> usize {
        let before = self.entries.len();
        self.entries.retain(|date, _| *date < start || *date > end);
        before - self.entries.len()
    }

    /// True when at least one day in `[start, end]` is occupied by a booking.
    /// Expects a validated range.
    pub fn has_occupied(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.entries
            .range(start..=end)
            .any(|(_, e)| e.status == AvailabilityStatus::Occupied)
    }

    /// Entries matching all supplied filters, ascending by date.
    pub fn select(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        status: Option<AvailabilityStatus>,
    ) -> Vec<CalendarEntry> {
        self.entries
            .values()
            .filter(|e| start.is_none_or(|s| e.date >= s))
            .filter(|e| end.is_none_or(|s| e.date <= s))
            .filter(|e| status.is_none_or(|s| e.status == s))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the calendar into a flat entry list, ascending by date.
    pub fn into_entries(self) -> Vec<CalendarEntry> {
        self.entries.into_values().collect()
    }
}
