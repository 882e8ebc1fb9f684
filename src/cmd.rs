use std::net::TcpListener;
use std::sync::Arc;

use clap::Subcommand;
use serde::Serialize;

use crate::api_client::BggApiClient;
use crate::cached_client::CachedClient;
use crate::client::Client;
use crate::config::ApiConfig;
use crate::error::Error;
use crate::server;
use crate::stats::{PlayStats, DEFAULT_LATEST};
use crate::types::{CoopStats, GameInfo, LatestPlay, MostPlayed};

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Serve the statistics pages over HTTP
    Serve {
        #[arg(long, env = "PLAYLOG_HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, env = "PLAYLOG_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Games most recently played by a user
    Latest {
        username: String,
        #[arg(short = 'n', long, default_value_t = DEFAULT_LATEST)]
        count: usize,
        #[arg(long)]
        json: bool,
    },
    /// Cooperative wins and losses plus the most played game
    Stats {
        username: String,
        #[arg(long)]
        json: bool,
    },
    /// Name and thumbnail of one game from a user's plays
    Game {
        username: String,
        game_id: u64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct Statistics {
    cooperative: Option<CoopStats>,
    most_played: Option<MostPlayed>,
}

async fn load_plays(username: &str, client: &dyn Client) -> anyhow::Result<PlayStats> {
    eprintln!("fetching plays of {username}...");
    let mut stats = PlayStats::new(username);
    stats.fetch(client).await?;
    Ok(stats)
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn latest(games: &[LatestPlay]) {
    println!("Date | Game");
    for game in games {
        println!(" {} | {}", game.date, game.name);
    }
}

fn statistics(stats: &Statistics) {
    match &stats.cooperative {
        Some(coops) => println!(
            "Cooperative games: {} won, {} lost ({}% won)",
            coops.wins, coops.losses, coops.win_percentage
        ),
        None => println!("Cooperative games: none won or lost yet"),
    }
    match &stats.most_played {
        Some(game) => println!(
            "Most played: {} ({} minutes)",
            game.name, game.total_minutes
        ),
        None => println!("Most played: no plays logged yet"),
    }
}

fn game(game: &GameInfo) {
    println!("{} | {}", game.game_id, game.name);
    if let Some(thumbnail) = &game.thumbnail {
        println!("{thumbnail}");
    }
}

impl Cmd {
    pub async fn run(self, config: ApiConfig) -> anyhow::Result<()> {
        let client = CachedClient::new(BggApiClient::new(&config)?, config.cache_ttl());

        match self {
            Cmd::Serve { host, port } => {
                let address = format!("{host}:{port}");
                let listener = TcpListener::bind(&address)?;
                tracing::info!(%address, "serving play statistics");
                server::run(listener, Arc::new(client))?.await?;
            }
            Cmd::Latest {
                username,
                count,
                json,
            } => {
                let stats = load_plays(&username, &client).await?;
                let games = stats.latest_played(count, &client).await?;
                if json {
                    print_json(&games)?;
                } else {
                    latest(&games);
                }
            }
            Cmd::Stats { username, json } => {
                let stats = load_plays(&username, &client).await?;
                let cooperative = match stats.cooperative_statistics() {
                    Ok(coops) => Some(coops),
                    Err(Error::DivisionByZero) => None,
                    Err(e) => return Err(e.into()),
                };
                let summary = Statistics {
                    cooperative,
                    most_played: stats.most_played(&client).await?,
                };
                if json {
                    print_json(&summary)?;
                } else {
                    statistics(&summary);
                }
            }
            Cmd::Game {
                username,
                game_id,
                json,
            } => {
                let stats = load_plays(&username, &client).await?;
                let info = stats.game_by_id(game_id, &client).await?;
                if json {
                    print_json(&info)?;
                } else {
                    game(&info);
                }
            }
        }

        Ok(())
    }
}
