use std::collections::BTreeMap;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::*;

// comment markers for cooperative game results
const WON_TEXT: &str = "Won";
const LOST_TEXT: &str = "Lost";

pub const DEFAULT_LATEST: usize = 10;

/// Plays of one user and the statistics derived from them.
///
/// Holds no data until [`PlayStats::fetch`] has run; every query fails with
/// [`Error::FetchNotPerformed`] before that.
pub struct PlayStats {
    username: String,
    plays: Option<Vec<PlayRecord>>,
}

impl PlayStats {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.into(),
            plays: None,
        }
    }

    pub fn from_plays(username: &str, plays: Vec<PlayRecord>) -> Self {
        Self {
            username: username.into(),
            plays: Some(plays),
        }
    }

    /// Fetches the plays of `username` in one go.
    pub async fn fetched<C: Client + ?Sized>(username: &str, client: &C) -> Result<Self> {
        let plays = client.fetch_plays(username).await?;
        Ok(Self::from_plays(username, plays))
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Replaces any previously fetched plays.
    pub async fn fetch<C: Client + ?Sized>(&mut self, client: &C) -> Result<()> {
        let plays = client.fetch_plays(&self.username).await?;
        self.plays = Some(plays);
        Ok(())
    }

    pub fn plays(&self) -> Result<&[PlayRecord]> {
        self.plays.as_deref().ok_or(Error::FetchNotPerformed)
    }

    /// Up to `n` plays, newest first. Plays logged on the same day keep the
    /// order BGG returned them in.
    pub async fn latest_played<C: Client + ?Sized>(
        &self,
        n: usize,
        client: &C,
    ) -> Result<Vec<LatestPlay>> {
        let mut plays: Vec<&PlayRecord> = self.plays()?.iter().collect();
        plays.sort_by(|a, b| b.date.cmp(&a.date));

        let mut latest = Vec::with_capacity(n.min(plays.len()));
        for play in plays.into_iter().take(n) {
            latest.push(LatestPlay {
                name: play.game_name.clone(),
                date: play.date,
                thumbnail: client.fetch_thumbnail(play.game_id).await?,
            });
        }

        Ok(latest)
    }

    pub fn cooperative_statistics(&self) -> Result<CoopStats> {
        let plays = self.plays()?;
        let count = |marker: &str| {
            plays
                .iter()
                .filter(|p| p.comment.as_deref().is_some_and(|c| c.contains(marker)))
                .count()
        };

        // a comment holding both markers counts towards both
        let wins = count(WON_TEXT);
        let losses = count(LOST_TEXT);
        let total = wins + losses;
        if total == 0 {
            return Err(Error::DivisionByZero);
        }

        Ok(CoopStats {
            wins,
            losses,
            win_percentage: (wins * 100 / total) as u8,
        })
    }

    /// Game id and total minutes of the most played game. Ties go to the
    /// lowest game id.
    pub fn most_played_id(&self) -> Result<Option<(u64, u64)>> {
        let mut minutes: BTreeMap<u64, u64> = BTreeMap::new();
        for play in self.plays()? {
            *minutes.entry(play.game_id).or_default() += u64::from(play.length);
        }

        let mut best: Option<(u64, u64)> = None;
        for (game_id, total) in minutes {
            if best.map_or(true, |(_, top)| total > top) {
                best = Some((game_id, total));
            }
        }

        Ok(best)
    }

    /// `None` when the user has no plays at all.
    pub async fn most_played<C: Client + ?Sized>(
        &self,
        client: &C,
    ) -> Result<Option<MostPlayed>> {
        let Some((game_id, total_minutes)) = self.most_played_id()? else {
            return Ok(None);
        };

        let game = self.game_by_id(game_id, client).await?;
        Ok(Some(MostPlayed {
            game_id,
            name: game.name,
            thumbnail: game.thumbnail,
            total_minutes,
        }))
    }

    pub async fn game_by_id<C: Client + ?Sized>(
        &self,
        game_id: u64,
        client: &C,
    ) -> Result<GameInfo> {
        let play = self
            .plays()?
            .iter()
            .find(|p| p.game_id == game_id)
            .ok_or(Error::GameNotFound(game_id))?;

        Ok(GameInfo {
            game_id,
            name: play.game_name.clone(),
            thumbnail: client.fetch_thumbnail(game_id).await?,
        })
    }
}
