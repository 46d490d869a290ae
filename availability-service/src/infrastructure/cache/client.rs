use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde::{Serialize, de::DeserializeOwned};

/// Thin JSON-over-Redis helper. Cache failures are logged and swallowed so a
/// Redis outage degrades to uncached reads instead of failing requests.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self { conn })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();
        let output: Result<Option<String>, _> = conn.get(key).await;

        match output {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(value) => {
                    tracing::info!("Cache hit: {key}");
                    Some(value)
                }
                Err(e) => {
                    tracing::warn!("Cache deserialize error for {key}: {e}");
                    None
                }
            },
            Ok(None) => {
                tracing::info!("Cache miss: {key}");
                None
            }
            Err(e) => {
                tracing::warn!("Cache get error for {key}: {e}");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let mut conn = self.conn.clone();

        match serde_json::to_string(value) {
            Ok(json) => {
                let output: Result<(), _> = conn.set_ex(key, &json, ttl_seconds).await;
                if let Err(e) = output {
                    tracing::warn!("Cache set error for {key}: {e}");
                }
            }
            Err(e) => {
                tracing::warn!("Cache serialize error for {key}: {e}");
            }
        }
    }

    pub async fn delete(&self, key: &str) {
        let mut conn = self.conn.clone();
        let output: Result<(), _> = conn.del(key).await;
        if let Err(e) = output {
            tracing::warn!("Cache delete error for {key}: {e}");
        }
    }
}
