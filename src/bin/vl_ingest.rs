use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};

use liiga_analytics::dataset;

const FIRST_SCRAPED_SEASON: i32 = 1990;
const DEFAULT_FETCH_DELAY_MS: u64 = 1500;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = std::env::args().skip(1).collect();

    let first_season = flag_or_env(&args, "--from", "VL_FROM")
        .and_then(|raw| raw.parse::<i32>().ok())
        .unwrap_or(FIRST_SCRAPED_SEASON);
    let last_season = flag_or_env(&args, "--to", "VL_TO")
        .and_then(|raw| raw.parse::<i32>().ok())
        .unwrap_or_else(|| Utc::now().year());
    let delay_ms = flag_or_env(&args, "--delay-ms", "VL_INGEST_DELAY_MS")
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(DEFAULT_FETCH_DELAY_MS);

    let db_path = flag_or_env(&args, "--db", "VL_DB")
        .map(PathBuf::from)
        .or_else(dataset::default_db_path)
        .context("unable to resolve sqlite path")?;

    let mut conn = dataset::open_db(&db_path)?;
    let summary = dataset::ingest_seasons(
        &mut conn,
        db_path.clone(),
        first_season,
        last_season,
        Duration::from_millis(delay_ms),
    )?;

    println!("Ingest complete");
    println!("DB: {}", summary.db_path.display());
    println!(
        "Seasons: {}/{} ({}..{})",
        summary.seasons_succeeded,
        summary.seasons_total,
        summary.first_season,
        summary.last_season
    );
    println!("Matches upserted: {}", summary.matches_upserted);
    if !summary.errors.is_empty() {
        println!("Errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(6) {
            println!("  - {err}");
        }
    }

    if let Some(json_out) = flag_value(&args, "--json-out") {
        let records = dataset::load_matches(&conn)?;
        let path = PathBuf::from(json_out);
        dataset::export_json(&records, &path)?;
        println!("Dataset: {} ({} matches)", path.display(), records.len());
    }

    Ok(())
}

fn flag_or_env(args: &[String], flag: &str, env_key: &str) -> Option<String> {
    flag_value(args, flag).or_else(|| {
        std::env::var(env_key)
            .ok()
            .filter(|v| !v.trim().is_empty())
    })
}

fn flag_value(args: &[String], name: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&format!("{name}=")) {
            if !value.trim().is_empty() {
                return Some(value.trim().to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}
