use std::fs;
use std::path::{Path, PathBuf};

use match_insights::PipelineError;
use match_insights::aggregate::MissingGroupPolicy;
use match_insights::config::{DataPaths, PipelineConfig};
use match_insights::pipeline;

fn fixture_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn config_for(data_dir: &Path, output: PathBuf) -> PipelineConfig {
    PipelineConfig {
        data: DataPaths::in_dir(data_dir),
        output,
        ..PipelineConfig::default()
    }
}

fn copy_fixtures(into: &Path) {
    for name in ["fixtures.csv", "teamStats.csv", "teams.csv"] {
        fs::copy(fixture_dir().join(name), into.join(name)).expect("fixture copy");
    }
}

#[test]
fn writes_one_row_per_stat_record() {
    let out_dir = tempfile::tempdir().expect("tempdir");
    let out = out_dir.path().join("team_match_analysis.csv");
    let report = pipeline::run(&config_for(&fixture_dir(), out.clone())).expect("run succeeds");

    assert_eq!(report.rows_written, 7);
    let written = fs::read_to_string(&out).expect("output readable");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(
        lines[0],
        "eventId,teamId,possessionPct,totalShots,shotsOnTarget,foulsCommitted,yellowCards,\
         redCards,name,location,date,homeTeamId,awayTeamId,homeTeamWinner,attendance,isHome,\
         isWinner,shotAccuracy,disciplineScore,possessionBucket"
    );
    assert_eq!(
        lines[1],
        "1,10,55.0,5,3,2,1,0,Alpha,Alpha City,2024-08-17,10,20,True,41000,True,True,0.6,4,High"
    );
    assert_eq!(
        lines[3],
        "2,20,40.0,0,0,5,0,0,Beta,Beta Town,2024-08-24,20,30,False,,True,False,,5,Medium"
    );
    // Integral-float counts and attendance in the sources come out as plain integers.
    assert!(lines[4].starts_with("2,30,60.0,12,6,7,1,0,Gamma FC,"));
    assert!(lines[5].contains(",2024-08-31,30,10,,22000,True,,"));
    assert_eq!(
        lines[7],
        "4,40,38.5,6,2,4,1,0,,,,,,,,False,,0.3333333333333333,6,Low"
    );
}

#[test]
fn reports_data_quality_without_failing() {
    let out_dir = tempfile::tempdir().expect("tempdir");
    let report = pipeline::run(&config_for(&fixture_dir(), out_dir.path().join("out.csv")))
        .expect("run succeeds");

    assert_eq!(report.quality.unmatched_teams, 1);
    assert_eq!(report.quality.unmatched_fixtures, 1);
    assert_eq!(report.quality.zero_shot_rows, 1);
    assert_eq!(report.quality.shots_exceed_total, 0);
    assert_eq!(report.quality.uncategorised_possession, 0);
}

#[test]
fn insight_summary_matches_hand_computed_values() {
    let out_dir = tempfile::tempdir().expect("tempdir");
    let report = pipeline::run(&config_for(&fixture_dir(), out_dir.path().join("out.csv")))
        .expect("run succeeds");
    let summary = &report.summary;

    assert_eq!(summary.rows.len(), 8);
    assert_eq!(summary.get("Win rate (Low possession)"), None);
    assert_eq!(summary.get("Win rate (Medium possession)"), Some(0.0));
    assert_eq!(summary.get("Win rate (High possession)"), Some(1.0));
    assert_eq!(summary.get("Win rate (Very High possession)"), Some(1.0));

    let close = |metric: &str, expected: f64| {
        let got = summary.get(metric).expect("metric present");
        assert!((got - expected).abs() < 1e-9, "{metric}: {got} != {expected}");
    };
    close("Avg shot accuracy (Wins)", 0.55);
    close("Avg shot accuracy (Losses)", 0.25);
    close("Avg discipline score (Wins)", 6.5);
    close("Avg discipline score (Losses)", 12.0);

    let teams: Vec<(&str, f64)> = report
        .aggregates
        .by_team
        .iter()
        .map(|g| (g.key.as_str(), g.mean))
        .collect();
    assert_eq!(teams, vec![("Alpha", 1.0), ("Gamma FC", 1.0), ("Beta", 0.0)]);
}

#[test]
fn reruns_are_byte_identical() {
    let out_dir = tempfile::tempdir().expect("tempdir");
    let out = out_dir.path().join("out.csv");
    let cfg = config_for(&fixture_dir(), out.clone());

    pipeline::run(&cfg).expect("first run");
    let first = fs::read(&out).expect("first output");
    pipeline::run(&cfg).expect("second run");
    let second = fs::read(&out).expect("second output");
    assert_eq!(first, second);
}

#[test]
fn missing_source_is_file_access_error() {
    let data = tempfile::tempdir().expect("tempdir");
    let err = pipeline::run(&config_for(data.path(), data.path().join("out.csv")))
        .expect_err("no inputs");
    match err {
        PipelineError::FileAccess { path, .. } => assert!(path.ends_with("fixtures.csv")),
        other => panic!("expected file access error, got {other:?}"),
    }
}

#[test]
fn missing_column_is_schema_error() {
    let data = tempfile::tempdir().expect("tempdir");
    copy_fixtures(data.path());
    fs::write(data.path().join("teams.csv"), "teamId,name\n10,Alpha\n").expect("write teams");

    let err = pipeline::run(&config_for(data.path(), data.path().join("out.csv")))
        .expect_err("location column missing");
    match err {
        PipelineError::Schema { table, column } => {
            assert_eq!(table, "teams");
            assert_eq!(column, "location");
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn malformed_value_is_parse_error() {
    let data = tempfile::tempdir().expect("tempdir");
    copy_fixtures(data.path());
    fs::write(
        data.path().join("teamStats.csv"),
        "eventId,teamId,possessionPct,totalShots,shotsOnTarget,foulsCommitted,yellowCards,redCards\n\
         1,10,55,5,3,2,1,0\n\
         1,20,45,eight,2,10,2,1\n",
    )
    .expect("write stats");

    let err = pipeline::run(&config_for(data.path(), data.path().join("out.csv")))
        .expect_err("bad shot count");
    match err {
        PipelineError::Parse { path, line, .. } => {
            assert!(path.ends_with("teamStats.csv"));
            assert_eq!(line, 3);
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn unwritable_destination_is_write_error() {
    let out_dir = tempfile::tempdir().expect("tempdir");
    let out = out_dir.path().join("missing").join("out.csv");
    let err = pipeline::run(&config_for(&fixture_dir(), out)).expect_err("parent missing");
    assert!(matches!(err, PipelineError::Write { .. }), "got {err:?}");
}

#[test]
fn strict_policy_fails_on_empty_group() {
    let out_dir = tempfile::tempdir().expect("tempdir");
    let mut cfg = config_for(&fixture_dir(), out_dir.path().join("out.csv"));
    cfg.missing_groups = MissingGroupPolicy::Fail;

    match pipeline::run(&cfg) {
        Err(PipelineError::EmptyGroup { metric }) => {
            assert_eq!(metric, "Win rate (Low possession)")
        }
        other => panic!("expected empty group error, got {other:?}"),
    }
}

#[test]
fn workbook_export_is_optional_extra() {
    let out_dir = tempfile::tempdir().expect("tempdir");
    let xlsx = out_dir.path().join("insights.xlsx");
    let mut cfg = config_for(&fixture_dir(), out_dir.path().join("out.csv"));
    cfg.xlsx = Some(xlsx.clone());

    pipeline::run(&cfg).expect("run succeeds");
    let meta = fs::metadata(&xlsx).expect("workbook written");
    assert!(meta.len() > 0);
}
