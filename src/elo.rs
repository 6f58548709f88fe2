use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::record::{MatchRecord, SkipReason, SkippedRecord, order_season_matches, parse_score};

#[derive(Debug, Clone, Copy)]
pub struct EloConfig {
    pub k: f64,
    pub home_adv_pts: f64,
    pub initial_rating: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k: 30.0,
            home_adv_pts: 100.0,
            initial_rating: 1500.0,
        }
    }
}

/// Post-match ratings for one processed match, rounded to a tenth of a
/// point. Emission order within a season is the trajectory.
#[derive(Debug, Clone, Serialize)]
pub struct RatingSnapshot {
    pub season: i32,
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub home_elo: f64,
    pub away_elo: f64,
}

/// Rating state for a single season. Teams need no registration: an unseen
/// team reads as the initial rating and is materialized on first update.
/// The map is dropped at season end; ratings never cross season boundaries.
#[derive(Debug)]
pub struct SeasonRatings {
    initial: f64,
    ratings: HashMap<String, f64>,
}

impl SeasonRatings {
    pub fn new(initial: f64) -> Self {
        Self {
            initial,
            ratings: HashMap::new(),
        }
    }

    pub fn get(&self, team: &str) -> f64 {
        self.ratings.get(team).copied().unwrap_or(self.initial)
    }

    pub fn set(&mut self, team: &str, rating: f64) {
        self.ratings.insert(team.to_string(), rating);
    }
}

#[derive(Debug, Default)]
pub struct EloHistory {
    pub seasons: BTreeMap<i32, Vec<RatingSnapshot>>,
    pub skipped: Vec<SkippedRecord>,
}

/// Run the rating engine over the full record collection: partition by
/// season, order each season chronologically, then fold the update rule over
/// the matches in sequence. A season with no usable matches yields an empty
/// trajectory, never an error.
pub fn compute_elo_history(records: &[MatchRecord], cfg: EloConfig) -> EloHistory {
    let mut by_season: BTreeMap<i32, Vec<&MatchRecord>> = BTreeMap::new();
    for record in records {
        by_season.entry(record.season).or_default().push(record);
    }

    let mut history = EloHistory::default();
    for (season, mut matches) in by_season {
        order_season_matches(season, &mut matches);
        let snapshots = run_season(season, &matches, cfg, &mut history.skipped);
        history.seasons.insert(season, snapshots);
    }
    history
}

fn run_season(
    season: i32,
    matches: &[&MatchRecord],
    cfg: EloConfig,
    skipped: &mut Vec<SkippedRecord>,
) -> Vec<RatingSnapshot> {
    let mut ratings = SeasonRatings::new(cfg.initial_rating);
    let mut snapshots = Vec::with_capacity(matches.len());

    for m in matches {
        let Some((home_goals, away_goals)) = parse_score(&m.score) else {
            skipped.push(SkippedRecord::for_record(m, SkipReason::MalformedScore));
            continue;
        };

        let home = ratings.get(&m.home_team);
        let away = ratings.get(&m.away_team);

        // Home advantage only enters the expectation, never the stored rating.
        let expected_home = expected_score(home + cfg.home_adv_pts, away);
        let actual = if home_goals > away_goals {
            1.0
        } else if home_goals < away_goals {
            0.0
        } else {
            0.5
        };

        let delta = cfg.k * (actual - expected_home);
        ratings.set(&m.home_team, home + delta);
        ratings.set(&m.away_team, away - delta);

        // Rounding happens at emission only; the carried state keeps full
        // precision for the rest of the season.
        snapshots.push(RatingSnapshot {
            season,
            date: m.date.clone(),
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            home_elo: round_tenth(home + delta),
            away_elo: round_tenth(away - delta),
        });
    }

    snapshots
}

fn expected_score(r_home: f64, r_away: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf((r_away - r_home) / 400.0))
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_score_is_even_for_equal_ratings() {
        let p = expected_score(1500.0, 1500.0);
        assert!((p - 0.5).abs() < 1e-12);
    }

    #[test]
    fn expected_scores_sum_to_one() {
        let p_home = expected_score(1600.0, 1480.0);
        let p_away = expected_score(1480.0, 1600.0);
        assert!((p_home + p_away - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unseen_team_reads_initial_rating() {
        let mut ratings = SeasonRatings::new(1500.0);
        assert_eq!(ratings.get("HJK"), 1500.0);
        ratings.set("HJK", 1512.25);
        assert_eq!(ratings.get("HJK"), 1512.25);
        assert_eq!(ratings.get("Inter"), 1500.0);
    }

    #[test]
    fn round_tenth_keeps_one_decimal() {
        assert_eq!(round_tenth(1510.79805), 1510.8);
        assert_eq!(round_tenth(1489.20195), 1489.2);
    }
}
