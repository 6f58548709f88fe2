use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use liiga_analytics::aliases;
use liiga_analytics::analysis::{self, LeagueAnalysis};
use liiga_analytics::dataset;
use liiga_analytics::elo::EloConfig;
use liiga_analytics::export;
use liiga_analytics::record::MatchRecord;

const MAX_WARN_LINES: usize = 12;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut records = load_records(&args)?;
    if records.is_empty() {
        return Err(anyhow!("no match records loaded; run vl_ingest first"));
    }

    let alias_path = flag_or_env(&args, "--aliases", "VL_ALIASES")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(aliases::DEFAULT_ALIASES_PATH));
    let alias_map = aliases::load_alias_map(&alias_path)?;
    aliases::normalize_teams(&mut records, &alias_map);

    let result = analysis::analyze(&records, EloConfig::default());

    let skipped: Vec<String> = result
        .elo
        .skipped
        .iter()
        .chain(result.attendance.skipped.iter())
        .map(|s| s.to_string())
        .collect();
    for line in skipped.iter().take(MAX_WARN_LINES) {
        eprintln!("[WARN] skipped {line}");
    }
    if skipped.len() > MAX_WARN_LINES {
        eprintln!("[WARN] ... and {} more", skipped.len() - MAX_WARN_LINES);
    }

    let out_dir = flag_or_env(&args, "--out", "VL_OUT_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("reports"));
    let (chart_team, chart_season) = chart_target(&args, &result);
    let report = export::write_reports(&out_dir, &result, &chart_team, chart_season)?;

    println!("Analysis complete");
    println!("Matches: {}", records.len());
    println!(
        "Rating snapshots: {} across {} seasons",
        result.snapshot_count(),
        result.elo.seasons.len()
    );
    println!("Attendance records: {}", result.attendance.all_time.count);
    if let Some(max) = &result.attendance.all_time.max {
        println!(
            "Record crowd: {} ({} vs {}, {})",
            max.attendance, max.home_team, max.away_team, max.season
        );
    }
    println!("Reports in {}", report.out_dir.display());
    for file in &report.files {
        println!("  - {}", file.display());
    }

    Ok(())
}

fn load_records(args: &[String]) -> Result<Vec<MatchRecord>> {
    if let Some(json_path) = flag_value(args, "--json") {
        return dataset::load_json(&PathBuf::from(json_path));
    }
    let db_path = flag_or_env(args, "--db", "VL_DB")
        .map(PathBuf::from)
        .or_else(dataset::default_db_path)
        .context("unable to resolve sqlite path")?;
    let conn = dataset::open_db(&db_path)?;
    dataset::load_matches(&conn)
}

/// Chart defaults: the most recent season, and within it the team with the
/// most snapshots. Both can be pinned via flags or env.
fn chart_target(args: &[String], result: &LeagueAnalysis) -> (String, i32) {
    let season = flag_or_env(args, "--year", "VL_REPORT_YEAR")
        .and_then(|raw| raw.parse::<i32>().ok())
        .or_else(|| result.elo.seasons.keys().next_back().copied())
        .unwrap_or_default();

    let team = flag_or_env(args, "--team", "VL_REPORT_TEAM").unwrap_or_else(|| {
        let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
        if let Some(snapshots) = result.elo.seasons.get(&season) {
            for s in snapshots {
                *counts.entry(s.home_team.as_str()).or_default() += 1;
                *counts.entry(s.away_team.as_str()).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
            .map(|(team, _)| team.to_string())
            .unwrap_or_default()
    });

    (team, season)
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
