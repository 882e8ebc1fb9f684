use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayRecord {
    pub date: NaiveDate,
    pub game_id: u64,
    pub game_name: String,
    pub comment: Option<String>,
    pub length: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LatestPlay {
    pub name: String,
    pub date: NaiveDate,
    pub thumbnail: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CoopStats {
    pub wins: usize,
    pub losses: usize,
    pub win_percentage: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MostPlayed {
    pub game_id: u64,
    pub name: String,
    pub thumbnail: Option<String>,
    pub total_minutes: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameInfo {
    pub game_id: u64,
    pub name: String,
    pub thumbnail: Option<String>,
}

// wire format of `/plays`

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Plays {
    #[serde(rename = "@username", default)]
    pub username: String,
    #[serde(rename = "play", default)]
    pub plays: Vec<Play>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Play {
    #[serde(rename = "@id", default)]
    pub id: u64,
    #[serde(rename = "@date")]
    pub date: String,
    #[serde(rename = "@length", default)]
    pub length: Option<String>,
    pub item: Option<PlayItem>,
    pub comments: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PlayItem {
    #[serde(rename = "@objectid")]
    pub object_id: u64,
    #[serde(rename = "@name")]
    pub name: String,
}

// wire format of `/thing`

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Things {
    #[serde(rename = "item", default)]
    pub items: Vec<Thing>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Thing {
    #[serde(rename = "@id")]
    pub id: u64,
    pub thumbnail: Option<String>,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    raw.parse::<NaiveDate>()
        .ok()
        .or_else(|| raw.parse::<NaiveDateTime>().ok().map(|dt| dt.date()))
}

impl TryFrom<Play> for PlayRecord {
    type Error = Error;

    fn try_from(play: Play) -> Result<Self, Error> {
        let date = parse_date(&play.date).ok_or_else(|| {
            Error::InvalidPlay(format!("play {} has date {:?}", play.id, play.date))
        })?;

        let item = play
            .item
            .ok_or_else(|| Error::InvalidPlay(format!("play {} has no item", play.id)))?;

        // BGG sends an empty attribute when no length was logged
        let length = match play.length.as_deref().map(str::trim) {
            None | Some("") => 0,
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                Error::InvalidPlay(format!("play {} has length {:?}", play.id, raw))
            })?,
        };

        Ok(Self {
            date,
            game_id: item.object_id,
            game_name: item.name,
            comment: play.comments,
            length,
        })
    }
}
