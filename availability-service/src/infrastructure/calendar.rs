use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::types::{AvailabilityStatus, CalendarEntry, VersionedCalendar};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{domain::availability::CalendarStore, error::AvailabilityServiceError};

pub struct PgCalendarStore {
    pool: PgPool,
}

impl PgCalendarStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalendarStore for PgCalendarStore {
    #[tracing::instrument(skip(self))]
    async fn load(&self, worker_id: Uuid) -> Result<VersionedCalendar, AvailabilityServiceError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM worker_calendars WHERE worker_id = $1")
                .bind(worker_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(version) = version else {
            return Err(AvailabilityServiceError::NotFound(format!(
                "No calendar provisioned for worker {worker_id}"
            )));
        };

        let entries: Vec<CalendarEntry> = sqlx::query_as(
            r#"
            SELECT date, status, booking_ref, note
            FROM calendar_entries
            WHERE worker_id = $1
            ORDER BY date ASC
            "#,
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(VersionedCalendar { version, entries })
    }

    #[tracing::instrument(skip(self, entries))]
    async fn save(
        &self,
        worker_id: Uuid,
        expected_version: i64,
        entries: Vec<CalendarEntry>,
    ) -> Result<(), AvailabilityServiceError> {
        // The domain map can't produce duplicates; a raw caller can.
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.date) {
                return Err(AvailabilityServiceError::InvariantViolation(format!(
                    "duplicate calendar entry for {} on worker {worker_id}",
                    entry.date
                )));
            }
        }

        let mut tx = self.pool.begin().await?;

        let bumped = sqlx::query(
            r#"
            UPDATE worker_calendars
            SET version = version + 1, updated_at = now()
            WHERE worker_id = $1 AND version = $2
            "#,
        )
        .bind(worker_id)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if bumped.rows_affected() == 0 {
            // A missing row and a stale version are different failures.
            let current: Option<i64> =
                sqlx::query_scalar("SELECT version FROM worker_calendars WHERE worker_id = $1")
                    .bind(worker_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return match current {
                None => Err(AvailabilityServiceError::NotFound(format!(
                    "No calendar provisioned for worker {worker_id}"
                ))),
                Some(current) => Err(AvailabilityServiceError::Conflict(format!(
                    "calendar for worker {worker_id} moved from version {expected_version} to {current}"
                ))),
            };
        }

        sqlx::query("DELETE FROM calendar_entries WHERE worker_id = $1")
            .bind(worker_id)
            .execute(&mut *tx)
            .await?;

        if !entries.is_empty() {
            let worker_ids = vec![worker_id; entries.len()];
            let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
            let statuses: Vec<AvailabilityStatus> = entries.iter().map(|e| e.status).collect();
            let booking_refs: Vec<Option<Uuid>> =
                entries.iter().map(|e| e.booking_ref).collect();
            let notes: Vec<Option<String>> = entries.iter().map(|e| e.note.clone()).collect();

            sqlx::query(
                r#"
                INSERT INTO calendar_entries (worker_id, date, status, booking_ref, note)
                SELECT * FROM UNNEST($1::uuid[], $2::date[], $3::availability_status[], $4::uuid[], $5::text[])
                "#,
            )
            .bind(&worker_ids)
            .bind(&dates)
            .bind(&statuses)
            .bind(&booking_refs)
            .bind(&notes)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn provision(&self, worker_id: Uuid) -> Result<(), AvailabilityServiceError> {
        sqlx::query(
            r#"
            INSERT INTO worker_calendars (worker_id)
            VALUES ($1)
            ON CONFLICT (worker_id) DO NOTHING
            "#,
        )
        .bind(worker_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn destroy(&self, worker_id: Uuid) -> Result<(), AvailabilityServiceError> {
        let output = sqlx::query("DELETE FROM worker_calendars WHERE worker_id = $1")
            .bind(worker_id)
            .execute(&self.pool)
            .await?;

        if output.rows_affected() == 0 {
            return Err(AvailabilityServiceError::NotFound(format!(
                "No calendar provisioned for worker {worker_id}"
            )));
        }

        Ok(())
    }
}
