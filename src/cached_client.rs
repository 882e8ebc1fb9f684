use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::client::Client;
use crate::error::Error;
use crate::types::PlayRecord;

struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

/// Map whose entries expire `ttl` after insertion.
struct TtlMap<K, V> {
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let expired = self.entries.get(key)?.fetched_at.elapsed() >= self.ttl;
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Drops every expired entry before inserting, so keys that are never
    /// looked up again do not pile up.
    fn insert(&mut self, key: K, value: V) {
        let ttl = self.ttl;
        self.entries.retain(|_, entry| entry.fetched_at.elapsed() < ttl);

        let entry = Entry {
            value,
            fetched_at: Instant::now(),
        };
        self.entries.insert(key, entry);
    }
}

/// Wraps a [`Client`], keeping play lists per username and thumbnails per
/// game id for a bounded time. Failed fetches are not cached.
pub struct CachedClient<C> {
    api_client: C,
    plays: Mutex<TtlMap<String, Vec<PlayRecord>>>,
    thumbnails: Mutex<TtlMap<u64, Option<String>>>,
}

impl<C: Client> CachedClient<C> {
    pub fn new(client: C, ttl: Duration) -> Self {
        Self {
            api_client: client,
            plays: Mutex::new(TtlMap::new(ttl)),
            thumbnails: Mutex::new(TtlMap::new(ttl)),
        }
    }
}

#[async_trait]
impl<C: Client> Client for CachedClient<C> {
    async fn fetch_plays(&self, username: &str) -> Result<Vec<PlayRecord>, Error> {
        if let Some(plays) = self.plays.lock().await.get(&username.to_string()) {
            tracing::debug!(username, "plays served from cache");
            return Ok(plays);
        }

        // the lock is released while the remote call runs
        let plays = self.api_client.fetch_plays(username).await?;
        self.plays
            .lock()
            .await
            .insert(username.to_string(), plays.clone());

        Ok(plays)
    }

    async fn fetch_thumbnail(&self, game_id: u64) -> Result<Option<String>, Error> {
        if let Some(thumbnail) = self.thumbnails.lock().await.get(&game_id) {
            return Ok(thumbnail);
        }

        let thumbnail = self.api_client.fetch_thumbnail(game_id).await?;
        self.thumbnails
            .lock()
            .await
            .insert(game_id, thumbnail.clone());

        Ok(thumbnail)
    }
}
