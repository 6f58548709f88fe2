use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use liiga_analytics::analysis::analyze;
use liiga_analytics::attendance::compute_attendance_report;
use liiga_analytics::elo::{EloConfig, compute_elo_history};
use liiga_analytics::record::MatchRecord;
use liiga_analytics::scrape::parse_games_table;

static GAMES_PAGE_HTML: &str = include_str!("../tests/fixtures/games_page.html");

const TEAMS: &[&str] = &[
    "HJK",
    "Inter",
    "Lahti",
    "KuPS",
    "SJK",
    "VPS",
    "Haka",
    "Ilves",
    "Mariehamn",
    "Honka",
    "RoPS",
    "TPS",
];

fn synthetic_records(seasons: i32, matches_per_season: usize) -> Vec<MatchRecord> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut out = Vec::new();
    for season in 2000..2000 + seasons {
        for idx in 0..matches_per_season {
            let home = TEAMS[rng.gen_range(0..TEAMS.len())];
            let mut away = TEAMS[rng.gen_range(0..TEAMS.len())];
            while away == home {
                away = TEAMS[rng.gen_range(0..TEAMS.len())];
            }
            out.push(MatchRecord {
                season,
                date: format!("{}.{}.", 1 + idx % 28, 4 + (idx / 28) % 6),
                home_team: home.to_string(),
                away_team: away.to_string(),
                score: format!("{}-{}", rng.gen_range(0..5), rng.gen_range(0..5)),
                attendance: Some(rng.gen_range(500..12_000).to_string()),
            });
        }
    }
    out
}

fn bench_games_page_parse(c: &mut Criterion) {
    c.bench_function("games_page_parse", |b| {
        b.iter(|| {
            let games = parse_games_table(black_box(GAMES_PAGE_HTML), 2015);
            black_box(games.len());
        })
    });
}

fn bench_elo_history(c: &mut Criterion) {
    let records = synthetic_records(30, 200);
    c.bench_function("elo_history_compute", |b| {
        b.iter(|| {
            let history = compute_elo_history(black_box(&records), EloConfig::default());
            black_box(history.seasons.len());
        })
    });
}

fn bench_attendance_report(c: &mut Criterion) {
    let records = synthetic_records(30, 200);
    c.bench_function("attendance_report_compute", |b| {
        b.iter(|| {
            let report = compute_attendance_report(black_box(&records));
            black_box(report.all_time.count);
        })
    });
}

fn bench_full_analysis(c: &mut Criterion) {
    let records = synthetic_records(30, 200);
    c.bench_function("full_analysis", |b| {
        b.iter(|| {
            let result = analyze(black_box(&records), EloConfig::default());
            black_box(result.snapshot_count());
        })
    });
}

criterion_group!(
    perf,
    bench_games_page_parse,
    bench_elo_history,
    bench_attendance_report,
    bench_full_analysis
);
criterion_main!(perf);
