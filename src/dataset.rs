use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

use crate::config::DataPaths;
use crate::error::{PipelineError, Result};
use crate::model::{Fixture, Team, TeamMatchStat};

pub const FIXTURE_COLUMNS: &[&str] = &[
    "eventId",
    "date",
    "homeTeamId",
    "awayTeamId",
    "homeTeamWinner",
    "attendance",
];

pub const TEAM_STAT_COLUMNS: &[&str] = &[
    "eventId",
    "teamId",
    "possessionPct",
    "totalShots",
    "shotsOnTarget",
    "foulsCommitted",
    "yellowCards",
    "redCards",
];

pub const TEAM_COLUMNS: &[&str] = &["teamId", "name", "location"];

/// Untyped CSV contents in source row order.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub name: String,
    pub path: PathBuf,
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_empty: usize,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn info(&self) -> Vec<ColumnInfo> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, name)| ColumnInfo {
                name: name.to_string(),
                non_empty: self
                    .records
                    .iter()
                    .filter(|r| r.get(idx).is_some_and(|v| !v.trim().is_empty()))
                    .count(),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct SourceTables {
    pub fixtures: RawTable,
    pub team_stats: RawTable,
    pub teams: RawTable,
}

#[derive(Debug, Clone, Default)]
pub struct CleanTables {
    pub fixtures: Vec<Fixture>,
    pub team_stats: Vec<TeamMatchStat>,
    pub teams: Vec<Team>,
}

pub fn load_table(name: &str, path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| PipelineError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|err| parse_error(path, &err))?
        .clone();

    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record.map_err(|err| parse_error(path, &err))?);
    }

    info!(table = name, rows = records.len(), columns = headers.len(), "loaded table");
    Ok(RawTable {
        name: name.to_string(),
        path: path.to_path_buf(),
        headers,
        records,
    })
}

pub fn load_sources(paths: &DataPaths) -> Result<SourceTables> {
    Ok(SourceTables {
        fixtures: load_table("fixtures", &paths.fixtures)?,
        team_stats: load_table("teamStats", &paths.team_stats)?,
        teams: load_table("teams", &paths.teams)?,
    })
}

/// Keeps only `columns`, in the given order. Row order and values are untouched.
pub fn project(table: &RawTable, columns: &[&str]) -> Result<RawTable> {
    let indices = columns
        .iter()
        .map(|column| {
            table
                .column_index(column)
                .ok_or_else(|| PipelineError::Schema {
                    table: table.name.clone(),
                    column: column.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    let records = table
        .records
        .iter()
        .map(|record| {
            let mut out: StringRecord = indices
                .iter()
                .map(|&idx| record.get(idx).unwrap_or(""))
                .collect();
            out.set_position(record.position().cloned());
            out
        })
        .collect::<Vec<_>>();

    debug!(table = %table.name, columns = columns.len(), "projected table");
    Ok(RawTable {
        name: table.name.clone(),
        path: table.path.clone(),
        headers: columns.iter().copied().collect(),
        records,
    })
}

pub fn project_sources(sources: &SourceTables) -> Result<SourceTables> {
    Ok(SourceTables {
        fixtures: project(&sources.fixtures, FIXTURE_COLUMNS)?,
        team_stats: project(&sources.team_stats, TEAM_STAT_COLUMNS)?,
        teams: project(&sources.teams, TEAM_COLUMNS)?,
    })
}

pub fn decode_rows<T: DeserializeOwned>(table: &RawTable) -> Result<Vec<T>> {
    table
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            record
                .deserialize(Some(&table.headers))
                .map_err(|err| PipelineError::Parse {
                    path: table.path.clone(),
                    line: record
                        .position()
                        .map(|p| p.line())
                        .unwrap_or(idx as u64 + 2),
                    message: err.to_string(),
                })
        })
        .collect()
}

pub fn decode_sources(projected: &SourceTables) -> Result<CleanTables> {
    Ok(CleanTables {
        fixtures: decode_rows(&projected.fixtures)?,
        team_stats: decode_rows(&projected.team_stats)?,
        teams: decode_rows(&projected.teams)?,
    })
}

fn parse_error(path: &Path, err: &csv::Error) -> PipelineError {
    PipelineError::Parse {
        path: path.to_path_buf(),
        line: err.position().map(|p| p.line()).unwrap_or(1),
        message: err.to_string(),
    }
}

pub(crate) fn de_opt_string<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    let raw = String::deserialize(d)?;
    let trimmed = raw.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

/// Accepts the spellings pandas and hand-written files use for booleans. Empty is absent.
pub(crate) fn de_flag<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<bool>, D::Error> {
    let raw = String::deserialize(d)?;
    parse_flag(&raw).map_err(D::Error::custom)
}

pub(crate) fn de_count<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<u32, D::Error> {
    let raw = String::deserialize(d)?;
    let value = parse_count(&raw).map_err(D::Error::custom)?;
    u32::try_from(value)
        .map_err(|_| D::Error::custom(format!("count `{}` out of range", raw.trim())))
}

pub(crate) fn de_opt_count<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<u64>, D::Error> {
    let raw = String::deserialize(d)?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_count(&raw).map(Some).map_err(D::Error::custom)
}

fn parse_flag(raw: &str) -> std::result::Result<Option<bool>, String> {
    match raw.trim() {
        "" => Ok(None),
        "True" | "true" | "TRUE" | "1" | "1.0" => Ok(Some(true)),
        "False" | "false" | "FALSE" | "0" | "0.0" => Ok(Some(false)),
        other => Err(format!("invalid boolean `{other}`")),
    }
}

// Integral floats such as `12.0` show up in pandas exports of count columns.
fn parse_count(raw: &str) -> std::result::Result<u64, String> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<u64>() {
        return Ok(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
            Ok(v as u64)
        }
        _ => Err(format!("expected a non-negative count, got `{trimmed}`")),
    }
}
