use async_trait::async_trait;

use crate::error::Error;
use crate::types::PlayRecord;

#[async_trait]
pub trait Client: Send + Sync {
    async fn fetch_plays(&self, username: &str) -> Result<Vec<PlayRecord>, Error>;
    async fn fetch_thumbnail(&self, game_id: u64) -> Result<Option<String>, Error>;
}
