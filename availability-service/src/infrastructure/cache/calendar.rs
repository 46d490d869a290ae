use std::sync::Arc;

use async_trait::async_trait;
use shared::types::{CalendarEntry, VersionedCalendar};
use uuid::Uuid;

use super::client::RedisCache;
use crate::domain::availability::CalendarStore;
use crate::error::AvailabilityServiceError;

/// TTL in seconds for a cached worker calendar.
const TTL_CALENDAR: u64 = 300;

fn calendar_key(worker_id: Uuid) -> String {
    format!("availability-service:calendar:{worker_id}")
}

/// Cache-aside decorator around a [`CalendarStore`].
///
/// Every mutation invalidates the worker's key, so a stale cached version
/// can never feed the compare-and-set save of a later writer.
pub struct CachedCalendarStore {
    inner: Arc<dyn CalendarStore>,
    cache: RedisCache,
}

impl CachedCalendarStore {
    pub fn new(inner: Arc<dyn CalendarStore>, cache: RedisCache) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl CalendarStore for CachedCalendarStore {
    async fn load(&self, worker_id: Uuid) -> Result<VersionedCalendar, AvailabilityServiceError> {
        let key = calendar_key(worker_id);
        if let Some(cached) = self.cache.get::<VersionedCalendar>(&key).await {
            return Ok(cached);
        }
        let output = self.inner.load(worker_id).await?;
        self.cache.set(&key, &output, TTL_CALENDAR).await;

        Ok(output)
    }

    async fn save(
        &self,
        worker_id: Uuid,
        expected_version: i64,
        entries: Vec<CalendarEntry>,
    ) -> Result<(), AvailabilityServiceError> {
        let output = self.inner.save(worker_id, expected_version, entries).await;
        // Invalidate on failure too: a conflicted save means the cached
        // version is stale, and the retry must read fresh.
        self.cache.delete(&calendar_key(worker_id)).await;

        output
    }

    async fn provision(&self, worker_id: Uuid) -> Result<(), AvailabilityServiceError> {
        self.inner.provision(worker_id).await?;
        self.cache.delete(&calendar_key(worker_id)).await;

        Ok(())
    }

    async fn destroy(&self, worker_id: Uuid) -> Result<(), AvailabilityServiceError> {
        self.inner.destroy(worker_id).await?;
        self.cache.delete(&calendar_key(worker_id)).await;

        Ok(())
    }
}
