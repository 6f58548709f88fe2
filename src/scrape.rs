use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::http_cache::fetch_text_cached;
use crate::http_client::http_client;
use crate::record::MatchRecord;

const STATS_BASE_URL: &str = "https://www.veikkausliiga.com/tilastot";

// Completed seasons never change; their pages can sit in the cache for a
// month. The running season is always revalidated.
const PAST_SEASON_CACHE: Duration = Duration::from_secs(30 * 24 * 3600);

pub fn season_games_url(season: i32) -> String {
    format!("{STATS_BASE_URL}/{season}/veikkausliiga/ottelut/")
}

/// Fetch and parse one season's games page. An unreachable page or a page
/// with no parseable rows is an error the caller records per season.
pub fn fetch_season_games(season: i32) -> Result<Vec<MatchRecord>> {
    let client = http_client()?;
    let url = season_games_url(season);
    let fresh_for = if season < Utc::now().year() {
        Some(PAST_SEASON_CACHE)
    } else {
        None
    };
    let html =
        fetch_text_cached(client, &url, fresh_for).context("season games request failed")?;
    let games = parse_games_table(&html, season);
    if games.is_empty() {
        return Err(anyhow!("no parseable rows in games table (season {season})"));
    }
    Ok(games)
}

/// Parse the `<table id="games">` stats table. Layout observed on the site:
/// cell 0 date, cell 4 "Home - Away", cell 6 score, cell 7 attendance.
/// Rows that do not fit are dropped; the engines re-validate score and
/// attendance themselves, so raw text passes through untouched.
pub fn parse_games_table(html: &str, season: i32) -> Vec<MatchRecord> {
    let mut games = Vec::new();
    let document = Html::parse_document(html);

    let Ok(table_sel) = Selector::parse("table#games") else {
        return games;
    };
    let Ok(row_sel) = Selector::parse("tr") else {
        return games;
    };
    let Ok(cell_sel) = Selector::parse("td") else {
        return games;
    };

    for table in document.select(&table_sel) {
        for row in table.select(&row_sel) {
            let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
            if cells.len() < 8 {
                continue;
            }
            if let Some(game) = parse_game_row(&cells, season) {
                games.push(game);
            }
        }
    }
    games
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn parse_game_row(cells: &[String], season: i32) -> Option<MatchRecord> {
    let date = cells.first()?.clone();
    let (home_team, away_team) = cells.get(4)?.split_once(" - ")?;
    let home_team = home_team.trim();
    let away_team = away_team.trim();
    if date.is_empty() || home_team.is_empty() || away_team.is_empty() {
        return None;
    }
    let score = cells.get(6)?.clone();
    let attendance = cells
        .get(7)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    Some(MatchRecord {
        season,
        date,
        home_team: home_team.to_string(),
        away_team: away_team.to_string(),
        score,
        attendance,
    })
}
