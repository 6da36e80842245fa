use std::path::{Path, PathBuf};

use crate::aggregate::MissingGroupPolicy;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const FIXTURES_FILE: &str = "fixtures.csv";
pub const TEAM_STATS_FILE: &str = "teamStats.csv";
pub const TEAMS_FILE: &str = "teams.csv";
pub const DEFAULT_OUTPUT: &str = "team_match_analysis.csv";

pub const DATA_DIR_ENV: &str = "MATCH_INSIGHTS_DATA_DIR";
pub const OUTPUT_ENV: &str = "MATCH_INSIGHTS_OUT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub fixtures: PathBuf,
    pub team_stats: PathBuf,
    pub teams: PathBuf,
}

impl DataPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            fixtures: dir.join(FIXTURES_FILE),
            team_stats: dir.join(TEAM_STATS_FILE),
            teams: dir.join(TEAMS_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub data: DataPaths,
    pub output: PathBuf,
    pub xlsx: Option<PathBuf>,
    pub missing_groups: MissingGroupPolicy,
    pub preview_rows: usize,
    pub top_teams: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data: DataPaths::in_dir(Path::new(DEFAULT_DATA_DIR)),
            output: PathBuf::from(DEFAULT_OUTPUT),
            xlsx: None,
            missing_groups: MissingGroupPolicy::ReportGap,
            preview_rows: 5,
            top_teams: 10,
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::resolve(&args, |key| std::env::var(key).ok())
    }

    /// Flags win over environment values, which win over the defaults.
    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();

        let data_dir = arg_value(args, "--data-dir")
            .or_else(|| env(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()));
        if let Some(dir) = data_dir {
            cfg.data = DataPaths::in_dir(Path::new(dir.trim()));
        }

        let output =
            arg_value(args, "--out").or_else(|| env(OUTPUT_ENV).filter(|v| !v.trim().is_empty()));
        if let Some(out) = output {
            cfg.output = PathBuf::from(out.trim());
        }

        cfg.xlsx = arg_value(args, "--xlsx").map(PathBuf::from);

        if has_flag(args, "--strict-groups") {
            cfg.missing_groups = MissingGroupPolicy::Fail;
        }
        if let Some(n) = arg_value(args, "--preview-rows").and_then(|v| v.parse::<usize>().ok()) {
            cfg.preview_rows = n;
        }
        if let Some(n) = arg_value(args, "--top-teams").and_then(|v| v.parse::<usize>().ok()) {
            cfg.top_teams = n;
        }
        cfg
    }
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&prefix) {
            if !v.trim().is_empty() {
                return Some(v.trim().to_string());
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}
