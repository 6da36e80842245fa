use std::fs::File;
use std::path::Path;

use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::aggregate::{Aggregates, GroupedMeans, InsightSummary};
use crate::dataset::RawTable;
use crate::error::{PipelineError, Result};
use crate::model::EnrichedTeamMatch;

pub const ENRICHED_COLUMNS: &[&str] = &[
    "eventId",
    "teamId",
    "possessionPct",
    "totalShots",
    "shotsOnTarget",
    "foulsCommitted",
    "yellowCards",
    "redCards",
    "name",
    "location",
    "date",
    "homeTeamId",
    "awayTeamId",
    "homeTeamWinner",
    "attendance",
    "isHome",
    "isWinner",
    "shotAccuracy",
    "disciplineScore",
    "possessionBucket",
];

pub fn enriched_row(row: &EnrichedTeamMatch) -> Vec<String> {
    let j = &row.joined;
    let s = &j.stat;
    vec![
        s.event_id.to_string(),
        s.team_id.to_string(),
        fmt_float(s.possession_pct),
        s.total_shots.to_string(),
        s.shots_on_target.to_string(),
        s.fouls_committed.to_string(),
        s.yellow_cards.to_string(),
        s.red_cards.to_string(),
        j.name.clone().unwrap_or_default(),
        j.location.clone().unwrap_or_default(),
        j.date.clone().unwrap_or_default(),
        opt_to_string(j.home_team_id),
        opt_to_string(j.away_team_id),
        j.home_team_winner.map(fmt_bool).unwrap_or_default(),
        // Typed as a count, so `22000.0` in the source is written as `22000`.
        opt_to_string(j.attendance),
        fmt_bool(j.is_home),
        j.is_winner.map(fmt_bool).unwrap_or_default(),
        row.shot_accuracy.map(fmt_float).unwrap_or_default(),
        row.discipline_score.to_string(),
        row.possession_bucket
            .map(|b| b.label().to_string())
            .unwrap_or_default(),
    ]
}

/// Overwrites `path` with the enriched table. Returns the number of data rows written.
pub fn write_enriched_csv(path: &Path, rows: &[EnrichedTeamMatch]) -> Result<usize> {
    let write_err = |message: String| PipelineError::Write {
        path: path.to_path_buf(),
        message,
    };
    let file = File::create(path).map_err(|err| write_err(err.to_string()))?;
    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(ENRICHED_COLUMNS)
        .map_err(|err| write_err(err.to_string()))?;
    for row in rows {
        writer
            .write_record(enriched_row(row))
            .map_err(|err| write_err(err.to_string()))?;
    }
    writer.flush().map_err(|err| write_err(err.to_string()))?;
    info!(path = %path.display(), rows = rows.len(), "wrote enriched table");
    Ok(rows.len())
}

pub fn write_workbook(
    path: &Path,
    rows: &[EnrichedTeamMatch],
    summary: &InsightSummary,
    aggregates: &Aggregates,
) -> Result<()> {
    let write_err = |err: rust_xlsxwriter::XlsxError| PipelineError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let mut match_rows: Vec<Vec<String>> =
        vec![ENRICHED_COLUMNS.iter().map(|c| c.to_string()).collect()];
    match_rows.extend(rows.iter().map(enriched_row));

    let mut insight_rows = vec![vec!["Metric".to_string(), "Value".to_string()]];
    insight_rows.extend(
        summary
            .rows
            .iter()
            .map(|r| vec![r.metric.clone(), r.value.map(fmt_float).unwrap_or_default()]),
    );

    let mut team_rows = vec![vec![
        "Team".to_string(),
        "Matches".to_string(),
        "Win Rate".to_string(),
    ]];
    team_rows.extend(
        aggregates
            .by_team
            .iter()
            .map(|g| vec![g.key.clone(), g.count.to_string(), fmt_float(g.mean)]),
    );

    let mut workbook = Workbook::new();
    for (name, sheet_rows) in [
        ("TeamMatch", &match_rows),
        ("Insights", &insight_rows),
        ("TeamWinRate", &team_rows),
    ] {
        let sheet = workbook.add_worksheet();
        sheet.set_name(name).map_err(write_err)?;
        write_rows(sheet, sheet_rows).map_err(write_err)?;
    }
    workbook.save(path).map_err(write_err)?;
    info!(path = %path.display(), "wrote workbook");
    Ok(())
}

fn write_rows(
    worksheet: &mut Worksheet,
    rows: &[Vec<String>],
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet.write_string(row_idx as u32, col_idx as u16, value)?;
        }
    }
    Ok(())
}

pub fn print_raw_preview(table: &RawTable, limit: usize) {
    let headers: Vec<String> = table.headers.iter().map(str::to_string).collect();
    let rows = table
        .records
        .iter()
        .take(limit)
        .map(|r| r.iter().map(str::to_string).collect())
        .collect::<Vec<Vec<String>>>();
    print_grid(&headers, &rows);
}

pub fn print_info(table: &RawTable) {
    println!(
        "{} ({}): {} rows, {} columns",
        table.name,
        table.path.display(),
        table.len(),
        table.headers.len()
    );
    for col in table.info() {
        println!("  {:20} {} non-empty", col.name, col.non_empty);
    }
}

pub fn print_joined_preview(rows: &[EnrichedTeamMatch], limit: usize) {
    let headers = ["eventId", "name", "isHome", "homeTeamWinner", "isWinner"];
    let grid = rows
        .iter()
        .take(limit)
        .map(|r| {
            let j = &r.joined;
            vec![
                j.stat.event_id.to_string(),
                j.name.clone().unwrap_or_default(),
                fmt_bool(j.is_home),
                j.home_team_winner.map(fmt_bool).unwrap_or_default(),
                j.is_winner.map(fmt_bool).unwrap_or_default(),
            ]
        })
        .collect::<Vec<_>>();
    print_grid(&headers.map(String::from), &grid);
}

pub fn print_feature_preview(rows: &[EnrichedTeamMatch], limit: usize) {
    let headers = [
        "name",
        "possessionPct",
        "possessionBucket",
        "shotAccuracy",
        "disciplineScore",
    ];
    let grid = rows
        .iter()
        .take(limit)
        .map(|r| {
            vec![
                r.joined.name.clone().unwrap_or_default(),
                fmt_float(r.joined.stat.possession_pct),
                r.possession_bucket
                    .map(|b| b.label().to_string())
                    .unwrap_or_default(),
                r.shot_accuracy
                    .map(|v| format!("{v:.3}"))
                    .unwrap_or_else(|| "NaN".to_string()),
                r.discipline_score.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    print_grid(&headers.map(String::from), &grid);
}

pub fn print_grouped<K>(label: impl Fn(&K) -> String, groups: &GroupedMeans<K>, limit: usize)
where
    K: Eq + std::hash::Hash + Clone,
{
    if groups.is_empty() {
        println!("(no groups)");
        return;
    }
    for g in groups.iter().take(limit) {
        println!("  {:24} {:.4} (n={})", label(&g.key), g.mean, g.count);
    }
}

pub fn print_summary(summary: &InsightSummary) {
    for row in &summary.rows {
        let value = row
            .value
            .map(|v| format!("{v:.4}"))
            .unwrap_or_else(|| "n/a".to_string());
        println!("  {:34} {}", row.metric, value);
    }
}

fn print_grid(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(idx) {
                *w = (*w).max(cell.len());
            }
        }
    }
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:>w$}"))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(headers));
    for row in rows {
        println!("{}", line(row.as_slice()));
    }
}

/// Integral values keep a trailing `.0` so the column reads as floating point.
pub fn fmt_float(value: f64) -> String {
    let s = value.to_string();
    if value.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

fn fmt_bool(value: bool) -> String {
    String::from(if value { "True" } else { "False" })
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
