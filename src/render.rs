use std::fmt::Write;

use crate::types::{CoopStats, GameInfo, LatestPlay, MostPlayed};

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

fn thumbnail(url: Option<&str>, alt: &str) -> String {
    match url {
        Some(url) => format!("<img src=\"{}\" alt=\"{}\">", escape(url), escape(alt)),
        None => String::new(),
    }
}

fn game_items(games: &[LatestPlay]) -> String {
    let mut html = String::from("<ul class=\"games\">\n");
    for game in games {
        let _ = writeln!(
            html,
            "<li>{} <span class=\"name\">{}</span> <span class=\"date\">{}</span></li>",
            thumbnail(game.thumbnail.as_deref(), &game.name),
            escape(&game.name),
            game.date.format("%Y-%m-%d"),
        );
    }
    html.push_str("</ul>\n");
    html
}

pub fn game_list(username: &str, games: &[LatestPlay]) -> String {
    let title = format!("Latest games of {username}");
    let body = format!("<h1>{}</h1>\n{}", escape(&title), game_items(games));
    page(&title, &body)
}

pub fn full_statistics(username: &str, games: &[LatestPlay]) -> String {
    let title = format!("Board game statistics for {username}");
    let body = format!(
        "<h1>{}</h1>\n<h2>Latest games</h2>\n{}",
        escape(&title),
        game_items(games)
    );
    page(&title, &body)
}

pub fn statistics(
    username: &str,
    coops: Option<&CoopStats>,
    most_played: Option<&MostPlayed>,
) -> String {
    let title = format!("Statistics for {username}");
    let mut body = format!("<h1>{}</h1>\n<h2>Cooperative games</h2>\n", escape(&title));

    match coops {
        Some(coops) => {
            let _ = writeln!(
                body,
                "<p class=\"coops\">Wins: {} Losses: {} Win percentage: {}%</p>",
                coops.wins, coops.losses, coops.win_percentage
            );
        }
        None => body.push_str("<p class=\"coops\">No cooperative games won or lost yet.</p>\n"),
    }

    body.push_str("<h2>Most played</h2>\n");
    match most_played {
        Some(game) => {
            let _ = writeln!(
                body,
                "<p class=\"most-played\">{} {} ({} minutes)</p>",
                thumbnail(game.thumbnail.as_deref(), &game.name),
                escape(&game.name),
                game.total_minutes
            );
        }
        None => body.push_str("<p class=\"most-played\">No plays logged yet.</p>\n"),
    }

    page(&title, &body)
}

pub fn game(game: &GameInfo) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n",
        escape(&game.name),
        thumbnail(game.thumbnail.as_deref(), &game.name)
    );
    page(&game.name, &body)
}
