use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::Player;
use crate::services::database::{Database, DatabaseError};

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache load failed: {0}")]
    LoadError(#[from] Arc<DatabaseError>),
}

/// In-process cache for read-mostly lookups
///
/// The player directory is read on every signup page load but only changes
/// when a new player signs up, so it is cached with a short TTL and dropped
/// explicitly whenever a player is created.
pub struct CacheManager {
    players: moka::future::Cache<String, Arc<Vec<Player>>>,
    ttl_secs: u64,
}

impl CacheManager {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let players = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { players, ttl_secs }
    }

    /// Player directory, loaded from the database on a miss
    ///
    /// Concurrent misses share a single load.
    pub async fn players(&self, db: &Database) -> Result<Arc<Vec<Player>>, CacheError> {
        let key = CacheKey::players();
        let players = self
            .players
            .try_get_with(key.clone(), async {
                tracing::trace!("Cache miss: {}", key);
                db.list_players().await.map(Arc::new)
            })
            .await?;
        Ok(players)
    }

    /// Drop the cached player directory
    pub async fn invalidate_players(&self) {
        self.players.invalidate(&CacheKey::players()).await;
        tracing::debug!("Invalidated cache key: {}", CacheKey::players());
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.players.entry_count(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for the full player directory
    pub fn players() -> String {
        "players:all".to_string()
    }
}
