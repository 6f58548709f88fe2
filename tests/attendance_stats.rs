use liiga_analytics::attendance::{LEADERBOARD_SIZE, compute_attendance_report};
use liiga_analytics::record::{MatchRecord, SkipReason};

fn record(season: i32, home: &str, attendance: Option<&str>) -> MatchRecord {
    MatchRecord {
        season,
        date: "15.4.".to_string(),
        home_team: home.to_string(),
        away_team: "Visitors".to_string(),
        score: "1-0".to_string(),
        attendance: attendance.map(|s| s.to_string()),
    }
}

#[test]
fn leaderboard_keeps_input_order_on_ties() {
    let records = vec![
        record(2020, "X", Some("5000")),
        record(2021, "Y", Some("9000")),
        record(2020, "Z", Some("9000")),
    ];
    let report = compute_attendance_report(&records);

    assert_eq!(report.top_matches.len(), 3);
    assert_eq!(report.top_matches[0].season, 2021);
    assert_eq!(report.top_matches[0].home_team, "Y");
    assert_eq!(report.top_matches[1].season, 2020);
    assert_eq!(report.top_matches[1].home_team, "Z");
    assert_eq!(report.top_matches[2].home_team, "X");

    // The first record to reach the extreme keeps it.
    let max = report.all_time.max.as_ref().unwrap();
    assert_eq!(max.season, 2021);
    assert_eq!(max.home_team, "Y");
    assert_eq!(max.attendance, 9000);
}

#[test]
fn leaderboard_is_truncated_and_non_increasing() {
    let records: Vec<MatchRecord> = (0..25)
        .map(|idx| {
            let crowd = (1000 + (idx * 37) % 900).to_string();
            record(2015, "Host", Some(crowd.as_str()))
        })
        .collect();
    let report = compute_attendance_report(&records);

    assert_eq!(report.top_matches.len(), LEADERBOARD_SIZE);
    for pair in report.top_matches.windows(2) {
        assert!(pair[0].attendance >= pair[1].attendance);
    }
}

#[test]
fn averages_follow_sum_over_count() {
    let records = vec![
        record(2015, "HJK", Some("4 000")),
        record(2015, "Inter", Some("6 000")),
        record(2016, "Lahti", Some("1 500")),
    ];
    let report = compute_attendance_report(&records);

    assert_eq!(report.all_time.count, 3);
    assert_eq!(report.all_time.sum, 11_500);
    assert!((report.all_time.average() - 11_500.0 / 3.0).abs() < 1e-9);

    let season_2015 = &report.seasons[&2015];
    assert_eq!(season_2015.count, 2);
    assert!((season_2015.average() - 5000.0).abs() < 1e-9);

    let season_2016 = &report.seasons[&2016];
    assert_eq!(season_2016.count, 1);
    assert!((season_2016.average() - 1500.0).abs() < 1e-9);
}

#[test]
fn empty_input_yields_zeroed_report() {
    let report = compute_attendance_report(&[]);

    assert_eq!(report.all_time.count, 0);
    assert_eq!(report.all_time.average(), 0.0);
    assert!(report.all_time.max.is_none());
    assert!(report.all_time.min.is_none());
    assert!(report.seasons.is_empty());
    assert!(report.top_matches.is_empty());
    assert!(report.skipped.is_empty());
}

#[test]
fn malformed_attendance_is_skipped_with_diagnostic() {
    let records = vec![
        record(2015, "HJK", Some("4 000")),
        record(2015, "Inter", None),
        record(2015, "Lahti", Some("n/a")),
    ];
    let report = compute_attendance_report(&records);

    assert_eq!(report.all_time.count, 1);
    assert_eq!(report.skipped.len(), 2);
    assert!(
        report
            .skipped
            .iter()
            .all(|s| s.reason == SkipReason::MalformedAttendance)
    );
    assert_eq!(report.skipped[0].home_team, "Inter");
    assert_eq!(report.skipped[1].raw_value, "n/a");
}

#[test]
fn zero_attendance_is_a_valid_observation() {
    let records = vec![
        record(2015, "HJK", Some("0")),
        record(2015, "Inter", Some("2 500")),
    ];
    let report = compute_attendance_report(&records);

    assert_eq!(report.all_time.count, 2);
    let min = report.all_time.min.as_ref().unwrap();
    assert_eq!(min.attendance, 0);
    assert_eq!(min.home_team, "HJK");
}

#[test]
fn season_accumulator_tracks_its_own_record_fixture() {
    let records = vec![
        record(2015, "HJK", Some("9 000")),
        record(2016, "Lahti", Some("2 000")),
        record(2016, "KuPS", Some("4 500")),
    ];
    let report = compute_attendance_report(&records);

    let max_2016 = report.seasons[&2016].max.as_ref().unwrap();
    assert_eq!(max_2016.home_team, "KuPS");
    assert_eq!(max_2016.attendance, 4500);

    let all_time = report.all_time.max.as_ref().unwrap();
    assert_eq!(all_time.home_team, "HJK");
}
