use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Chart, ChartType, Workbook, Worksheet};

use crate::analysis::LeagueAnalysis;
use crate::attendance::AttendanceReport;
use crate::elo::{EloHistory, RatingSnapshot};

#[derive(Debug)]
pub struct ReportFiles {
    pub out_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Render every output view into `out_dir`: the season-keyed Elo history as
/// JSON, one CSV per season, the attendance report as Markdown, and a
/// workbook with all three plus a trajectory chart for `chart_team`.
pub fn write_reports(
    out_dir: &Path,
    analysis: &LeagueAnalysis,
    chart_team: &str,
    chart_season: i32,
) -> Result<ReportFiles> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("create report dir {}", out_dir.display()))?;
    let mut files = Vec::new();

    let history_path = out_dir.join("elo_history.json");
    write_elo_history_json(&history_path, &analysis.elo)?;
    files.push(history_path);

    for (season, snapshots) in &analysis.elo.seasons {
        let path = out_dir.join(format!("elo_{season}.csv"));
        write_season_csv(&path, snapshots)?;
        files.push(path);
    }

    let attendance_path = out_dir.join("attendance.md");
    write_attendance_markdown(&attendance_path, &analysis.attendance)?;
    files.push(attendance_path);

    let workbook_path = out_dir.join("liiga_report.xlsx");
    write_workbook(&workbook_path, analysis, chart_team, chart_season)?;
    files.push(workbook_path);

    Ok(ReportFiles {
        out_dir: out_dir.to_path_buf(),
        files,
    })
}

fn write_elo_history_json(path: &Path, history: &EloHistory) -> Result<()> {
    let json = serde_json::to_string_pretty(&history.seasons).context("serialize elo history")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).context("write elo history")?;
    fs::rename(&tmp, path).context("swap elo history")?;
    Ok(())
}

fn write_season_csv(path: &Path, snapshots: &[RatingSnapshot]) -> Result<()> {
    let mut out = String::from("date,home_team,away_team,home_elo,away_elo\n");
    for s in snapshots {
        let _ = writeln!(
            out,
            "{},{},{},{:.1},{:.1}",
            csv_field(&s.date),
            csv_field(&s.home_team),
            csv_field(&s.away_team),
            s.home_elo,
            s.away_elo
        );
    }
    fs::write(path, out).with_context(|| format!("write {}", path.display()))
}

fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

fn write_attendance_markdown(path: &Path, report: &AttendanceReport) -> Result<()> {
    let mut out = String::from("# Veikkausliiga attendance\n\n## All time\n\n");
    let _ = writeln!(out, "| Metric | Value | Fixture |");
    let _ = writeln!(out, "| --- | --- | --- |");
    let _ = writeln!(out, "| Matches counted | {} | |", report.all_time.count);
    let _ = writeln!(
        out,
        "| Average crowd | {:.1} | |",
        report.all_time.average()
    );
    if let Some(max) = &report.all_time.max {
        let _ = writeln!(
            out,
            "| Record crowd | {} | {} vs {} ({}) |",
            max.attendance, max.home_team, max.away_team, max.season
        );
    }
    if let Some(min) = &report.all_time.min {
        let _ = writeln!(
            out,
            "| Smallest crowd | {} | {} vs {} ({}) |",
            min.attendance, min.home_team, min.away_team, min.season
        );
    }

    out.push_str("\n## By season\n\n");
    let _ = writeln!(out, "| Season | Matches | Average | Record crowd | Fixture |");
    let _ = writeln!(out, "| --- | --- | --- | --- | --- |");
    for season in report.seasons.values() {
        let (record_crowd, fixture) = match &season.max {
            Some(max) => (
                max.attendance.to_string(),
                format!("{} vs {}", max.home_team, max.away_team),
            ),
            None => (String::new(), String::new()),
        };
        let _ = writeln!(
            out,
            "| {} | {} | {:.1} | {} | {} |",
            season.season,
            season.count,
            season.average(),
            record_crowd,
            fixture
        );
    }

    out.push_str("\n## Top crowds\n\n");
    let _ = writeln!(out, "| # | Season | Home team | Attendance |");
    let _ = writeln!(out, "| --- | --- | --- | --- |");
    for (idx, top) in report.top_matches.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            idx + 1,
            top.season,
            top.home_team,
            top.attendance
        );
    }

    fs::write(path, out).with_context(|| format!("write {}", path.display()))
}

fn write_workbook(
    path: &Path,
    analysis: &LeagueAnalysis,
    chart_team: &str,
    chart_season: i32,
) -> Result<()> {
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Elo History")?;
        write_history_sheet(sheet, &analysis.elo)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Attendance")?;
        write_attendance_sheet(sheet, &analysis.attendance)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Top Matches")?;
        write_top_matches_sheet(sheet, &analysis.attendance)?;
    }

    let trajectory = team_trajectory(&analysis.elo, chart_team, chart_season);
    if !trajectory.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Trajectory")?;
        sheet.write_string(0, 0, "date")?;
        sheet.write_string(0, 1, "elo")?;
        for (idx, (date, elo)) in trajectory.iter().enumerate() {
            let row = (idx + 1) as u32;
            sheet.write_string(row, 0, date)?;
            sheet.write_number(row, 1, *elo)?;
        }

        let last_row = trajectory.len() as u32;
        let mut chart = Chart::new(ChartType::Line);
        chart
            .add_series()
            .set_categories(("Trajectory", 1, 0, last_row, 0))
            .set_values(("Trajectory", 1, 1, last_row, 1))
            .set_name(chart_team);
        let title = format!("{chart_team} Elo {chart_season}");
        chart.title().set_name(title.as_str());
        sheet.insert_chart(1, 3, &chart)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_history_sheet(sheet: &mut Worksheet, history: &EloHistory) -> Result<()> {
    let header = ["Season", "Date", "Home", "Away", "Home Elo", "Away Elo"];
    for (col, title) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }
    let mut row = 1u32;
    for snapshots in history.seasons.values() {
        for s in snapshots {
            sheet.write_number(row, 0, s.season as f64)?;
            sheet.write_string(row, 1, &s.date)?;
            sheet.write_string(row, 2, &s.home_team)?;
            sheet.write_string(row, 3, &s.away_team)?;
            sheet.write_number(row, 4, s.home_elo)?;
            sheet.write_number(row, 5, s.away_elo)?;
            row += 1;
        }
    }
    Ok(())
}

fn write_attendance_sheet(sheet: &mut Worksheet, report: &AttendanceReport) -> Result<()> {
    let header = ["Season", "Matches", "Total", "Average", "Record", "Fixture"];
    for (col, title) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }
    let mut row = 1u32;
    for season in report.seasons.values() {
        sheet.write_number(row, 0, season.season as f64)?;
        sheet.write_number(row, 1, season.count as f64)?;
        sheet.write_number(row, 2, season.sum as f64)?;
        sheet.write_number(row, 3, season.average())?;
        if let Some(max) = &season.max {
            sheet.write_number(row, 4, f64::from(max.attendance))?;
            sheet.write_string(row, 5, format!("{} vs {}", max.home_team, max.away_team))?;
        }
        row += 1;
    }
    Ok(())
}

fn write_top_matches_sheet(sheet: &mut Worksheet, report: &AttendanceReport) -> Result<()> {
    let header = ["Rank", "Season", "Home team", "Attendance"];
    for (col, title) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }
    for (idx, top) in report.top_matches.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet.write_number(row, 0, (idx + 1) as f64)?;
        sheet.write_number(row, 1, top.season as f64)?;
        sheet.write_string(row, 2, &top.home_team)?;
        sheet.write_number(row, 3, f64::from(top.attendance))?;
    }
    Ok(())
}

/// A team's post-match ratings in one season, in trajectory order.
pub fn team_trajectory(history: &EloHistory, team: &str, season: i32) -> Vec<(String, f64)> {
    let Some(snapshots) = history.seasons.get(&season) else {
        return Vec::new();
    };
    snapshots
        .iter()
        .filter_map(|s| {
            if s.home_team == team {
                Some((s.date.clone(), s.home_elo))
            } else if s.away_team == team {
                Some((s.date.clone(), s.away_elo))
            } else {
                None
            }
        })
        .collect()
}
