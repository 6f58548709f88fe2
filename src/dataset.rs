use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::http_cache::app_cache_dir;
use crate::record::MatchRecord;
use crate::scrape;

#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub db_path: PathBuf,
    pub first_season: i32,
    pub last_season: i32,
    pub seasons_total: usize,
    pub seasons_succeeded: usize,
    pub matches_upserted: usize,
    pub errors: Vec<String>,
}

pub fn default_db_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join("veikkausliiga_matches.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS matches (
            season INTEGER NOT NULL,
            match_date TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            score TEXT NOT NULL,
            attendance TEXT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (season, match_date, home_team, away_team)
        );
        CREATE INDEX IF NOT EXISTS idx_matches_season ON matches(season);

        CREATE TABLE IF NOT EXISTS ingest_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NULL,
            first_season INTEGER NOT NULL,
            last_season INTEGER NOT NULL,
            seasons_succeeded INTEGER NOT NULL,
            matches_upserted INTEGER NOT NULL,
            errors_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Scrape a year range into the match store. A failed season is recorded and
/// skipped; the run keeps going. `delay` spaces out the page fetches so the
/// stats site is not hammered.
pub fn ingest_seasons(
    conn: &mut Connection,
    db_path: PathBuf,
    first_season: i32,
    last_season: i32,
    delay: Duration,
) -> Result<IngestSummary> {
    if first_season > last_season {
        return Err(anyhow!(
            "invalid season range {first_season}..{last_season}"
        ));
    }

    let started_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO ingest_runs(started_at, finished_at, first_season, last_season, seasons_succeeded, matches_upserted, errors_json)
         VALUES (?1, NULL, ?2, ?3, 0, 0, '[]')",
        params![started_at, first_season as i64, last_season as i64],
    )
    .context("insert ingest run")?;
    let run_id = conn.last_insert_rowid();

    let mut seasons_succeeded = 0usize;
    let mut matches_upserted = 0usize;
    let mut errors: Vec<String> = Vec::new();

    for season in first_season..=last_season {
        match scrape::fetch_season_games(season) {
            Ok(rows) => {
                let tx = conn.transaction().context("begin ingest transaction")?;
                for row in &rows {
                    upsert_match(&tx, row)?;
                }
                tx.commit().context("commit ingest transaction")?;
                matches_upserted += rows.len();
                seasons_succeeded += 1;
            }
            Err(err) => errors.push(format!("season {season}: {err}")),
        }
        if season < last_season && !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    let finished_at = Utc::now().to_rfc3339();
    let errors_json = serde_json::to_string(&errors).unwrap_or_else(|_| "[]".to_string());
    conn.execute(
        "UPDATE ingest_runs
         SET finished_at = ?1, seasons_succeeded = ?2, matches_upserted = ?3, errors_json = ?4
         WHERE run_id = ?5",
        params![
            finished_at,
            seasons_succeeded as i64,
            matches_upserted as i64,
            errors_json,
            run_id
        ],
    )
    .context("update ingest run")?;

    Ok(IngestSummary {
        db_path,
        first_season,
        last_season,
        seasons_total: (last_season - first_season + 1) as usize,
        seasons_succeeded,
        matches_upserted,
        errors,
    })
}

/// Load every stored match, oldest season first, insertion order within a
/// season. The engines do their own ordering and validation on top.
pub fn load_matches(conn: &Connection) -> Result<Vec<MatchRecord>> {
    let mut stmt = conn
        .prepare(
            "SELECT season, match_date, home_team, away_team, score, attendance
             FROM matches
             ORDER BY season ASC, rowid ASC",
        )
        .context("prepare load matches query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(MatchRecord {
                season: row.get(0)?,
                date: row.get(1)?,
                home_team: row.get(2)?,
                away_team: row.get(3)?,
                score: row.get(4)?,
                attendance: row.get(5)?,
            })
        })
        .context("query load matches")?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode match row")?);
    }
    Ok(out)
}

pub fn upsert_match(conn: &Connection, m: &MatchRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO matches (season, match_date, home_team, away_team, score, attendance, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        ON CONFLICT(season, match_date, home_team, away_team) DO UPDATE SET
            score = excluded.score,
            attendance = excluded.attendance,
            updated_at = excluded.updated_at
        "#,
        params![
            m.season as i64,
            m.date,
            m.home_team,
            m.away_team,
            m.score,
            m.attendance,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert match")?;
    Ok(())
}

/// Read the flat JSON dataset (an array of match records).
pub fn load_json(path: &Path) -> Result<Vec<MatchRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read dataset {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid dataset json {}", path.display()))
}

/// Export the match collection as the flat JSON dataset.
pub fn export_json(records: &[MatchRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let json = serde_json::to_string_pretty(records).context("serialize dataset")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write dataset")?;
    fs::rename(&tmp, path).context("swap dataset")?;
    Ok(())
}
