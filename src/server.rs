use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::http::header::ContentType;
use actix_web::{get, web, App, HttpResponse, HttpServer};
use serde::Deserialize;
use tracing_actix_web::TracingLogger;

use crate::client::Client;
use crate::error::Error;
use crate::render;
use crate::stats::{PlayStats, DEFAULT_LATEST};

pub fn run(listener: TcpListener, client: Arc<dyn Client>) -> Result<Server, std::io::Error> {
    // one client (and its caches) shared by every worker
    let client = web::Data::from(client);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(client.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(full_statistics)
        .service(latest_games)
        .service(statistics)
        .service(game);
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

#[derive(Debug, Deserialize)]
pub struct LatestQuery {
    pub count: Option<usize>,
}

#[get("/")]
async fn index() -> &'static str {
    "Please give the username to fetch data for"
}

#[get("/{username}")]
async fn full_statistics(
    username: web::Path<String>,
    client: web::Data<dyn Client>,
) -> Result<HttpResponse, Error> {
    let stats = PlayStats::fetched(&username, client.get_ref()).await?;
    let games = stats.latest_played(DEFAULT_LATEST, client.get_ref()).await?;
    tracing::debug!(?games, "latest games played");

    Ok(html(render::full_statistics(stats.username(), &games)))
}

#[get("/{username}/plays/latestgames")]
async fn latest_games(
    username: web::Path<String>,
    query: web::Query<LatestQuery>,
    client: web::Data<dyn Client>,
) -> Result<HttpResponse, Error> {
    let stats = PlayStats::fetched(&username, client.get_ref()).await?;
    let count = query.count.unwrap_or(DEFAULT_LATEST);
    let games = stats.latest_played(count, client.get_ref()).await?;
    tracing::debug!(?games, "latest games played");

    Ok(html(render::game_list(stats.username(), &games)))
}

#[get("/{username}/plays/statistics")]
async fn statistics(
    username: web::Path<String>,
    client: web::Data<dyn Client>,
) -> Result<HttpResponse, Error> {
    let stats = PlayStats::fetched(&username, client.get_ref()).await?;

    let coops = match stats.cooperative_statistics() {
        Ok(coops) => Some(coops),
        Err(Error::DivisionByZero) => None,
        Err(e) => return Err(e),
    };
    tracing::debug!(?coops, "coop statistics");

    let most_played = stats.most_played(client.get_ref()).await?;
    tracing::debug!(?most_played, "most played game");

    Ok(html(render::statistics(
        stats.username(),
        coops.as_ref(),
        most_played.as_ref(),
    )))
}

#[get("/{username}/games/{game_id}")]
async fn game(
    path: web::Path<(String, u64)>,
    client: web::Data<dyn Client>,
) -> Result<HttpResponse, Error> {
    let (username, game_id) = path.into_inner();
    let stats = PlayStats::fetched(&username, client.get_ref()).await?;
    let game = stats.game_by_id(game_id, client.get_ref()).await?;

    Ok(html(render::game(&game)))
}
