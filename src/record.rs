use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One league match as scraped from the season stats table.
///
/// `score` and `attendance` stay raw text. The rating engine and the
/// attendance aggregator each validate only the field they consume, so a
/// record with a broken score can still feed attendance stats and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    pub season: i32,
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub score: String,
    #[serde(default)]
    pub attendance: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MalformedScore,
    MalformedAttendance,
}

/// A record one of the engines refused, kept so the skip policy stays
/// auditable after a run instead of vanishing into a dropped row.
#[derive(Debug, Clone)]
pub struct SkippedRecord {
    pub season: i32,
    pub home_team: String,
    pub away_team: String,
    pub reason: SkipReason,
    pub raw_value: String,
}

impl SkippedRecord {
    pub fn for_record(record: &MatchRecord, reason: SkipReason) -> Self {
        let raw_value = match reason {
            SkipReason::MalformedScore => record.score.clone(),
            SkipReason::MalformedAttendance => record.attendance.clone().unwrap_or_default(),
        };
        Self {
            season: record.season,
            home_team: record.home_team.clone(),
            away_team: record.away_team.clone(),
            reason,
            raw_value,
        }
    }
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.reason {
            SkipReason::MalformedScore => "score",
            SkipReason::MalformedAttendance => "attendance",
        };
        write!(
            f,
            "{} {} vs {}: unusable {} {:?}",
            self.season, self.home_team, self.away_team, field, self.raw_value
        )
    }
}

/// Split a score cell into goals. The site has used a plain hyphen, en dash,
/// em dash and the minus sign as separator over the years; all are accepted.
pub fn parse_score(raw: &str) -> Option<(u32, u32)> {
    let normalized = raw.replace(['–', '—', '−'], "-");
    let mut parts = normalized.split('-').map(str::trim);
    let home = parts.next()?.parse::<u32>().ok()?;
    let away = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((home, away))
}

/// Attendance cells carry thousand separators as regular or no-break spaces.
/// Anything left that is not pure digits is treated as missing.
pub fn parse_attendance(raw: Option<&str>) -> Option<u32> {
    let cleaned: String = raw?.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<u32>().ok()
}

/// Parse a day-first date cell ("15.4.", "15.04.2015", "Ma 15.4.") against
/// the season year when the cell itself has no year.
pub fn parse_match_date(raw: &str, season: i32) -> Option<NaiveDate> {
    let token = raw.trim().split_whitespace().last()?;
    let token = token.trim_end_matches('.');
    let mut parts = token.split('.');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    let year: i32 = match parts.next() {
        Some(y) => y.trim().parse().ok()?,
        None => season,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Order one season's matches chronologically. Structured dates are used only
/// when every record in the season parses; a single failure switches the
/// whole season to lexical order on the raw field, so one season is never
/// ordered by mixed strategies.
pub fn order_season_matches(season: i32, matches: &mut [&MatchRecord]) {
    let all_parse = matches
        .iter()
        .all(|m| parse_match_date(&m.date, season).is_some());
    if all_parse {
        matches.sort_by_cached_key(|m| parse_match_date(&m.date, season));
    } else {
        matches.sort_by(|a, b| a.date.cmp(&b.date));
    }
}
