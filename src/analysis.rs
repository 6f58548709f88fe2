use crate::attendance::{AttendanceReport, compute_attendance_report};
use crate::elo::{EloConfig, EloHistory, compute_elo_history};
use crate::record::MatchRecord;

/// Combined output of both engines, assembled once and read-only afterwards.
#[derive(Debug)]
pub struct LeagueAnalysis {
    pub elo: EloHistory,
    pub attendance: AttendanceReport,
}

impl LeagueAnalysis {
    pub fn snapshot_count(&self) -> usize {
        self.elo.seasons.values().map(Vec::len).sum()
    }
}

/// The two engines own disjoint state and read the same immutable records,
/// so they run on separate rayon tasks. Match ordering inside a season stays
/// strictly sequential within the rating engine itself.
pub fn analyze(records: &[MatchRecord], cfg: EloConfig) -> LeagueAnalysis {
    let (elo, attendance) = rayon::join(
        || compute_elo_history(records, cfg),
        || compute_attendance_report(records),
    );
    LeagueAnalysis { elo, attendance }
}
