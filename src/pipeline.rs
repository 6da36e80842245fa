use std::path::PathBuf;

use tracing::{info, warn};

use crate::aggregate::{Aggregates, InsightSummary, MissingGroupPolicy};
use crate::config::PipelineConfig;
use crate::dataset::{self, CleanTables};
use crate::error::Result;
use crate::features;
use crate::join;
use crate::model::{EnrichedTeamMatch, PossessionBucket};
use crate::report;

/// Row-level issues that are carried through the output rather than failing the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataQuality {
    pub unmatched_teams: usize,
    pub unmatched_fixtures: usize,
    pub zero_shot_rows: usize,
    pub shots_exceed_total: usize,
    pub uncategorised_possession: usize,
}

impl DataQuality {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }

    fn log(&self) {
        if self.is_clean() {
            return;
        }
        warn!(
            unmatched_teams = self.unmatched_teams,
            unmatched_fixtures = self.unmatched_fixtures,
            zero_shot_rows = self.zero_shot_rows,
            shots_exceed_total = self.shots_exceed_total,
            uncategorised_possession = self.uncategorised_possession,
            "data quality issues carried into output"
        );
    }
}

#[derive(Debug, Clone)]
pub struct Enriched {
    pub rows: Vec<EnrichedTeamMatch>,
    pub quality: DataQuality,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub output: PathBuf,
    pub rows_written: usize,
    pub quality: DataQuality,
    pub aggregates: Aggregates,
    pub summary: InsightSummary,
}

/// Join and feature stages over already-decoded tables. No I/O.
pub fn enrich_tables(clean: &CleanTables) -> Enriched {
    let joined = join::join_team_matches(&clean.team_stats, &clean.teams, &clean.fixtures);
    let rows = features::derive_features(joined.rows);

    let quality = DataQuality {
        unmatched_teams: joined.unmatched_teams,
        unmatched_fixtures: joined.unmatched_fixtures,
        zero_shot_rows: rows.iter().filter(|r| r.shot_accuracy.is_none()).count(),
        shots_exceed_total: rows
            .iter()
            .filter(|r| r.joined.stat.shots_on_target > r.joined.stat.total_shots)
            .count(),
        uncategorised_possession: rows.iter().filter(|r| r.possession_bucket.is_none()).count(),
    };
    Enriched { rows, quality }
}

pub fn summarise(
    rows: &[EnrichedTeamMatch],
    policy: MissingGroupPolicy,
) -> Result<(Aggregates, InsightSummary)> {
    let aggregates = Aggregates::compute(rows);
    let summary = InsightSummary::build(&aggregates, policy)?;
    Ok((aggregates, summary))
}

pub fn run(cfg: &PipelineConfig) -> Result<PipelineReport> {
    let sources = dataset::load_sources(&cfg.data)?;
    for table in [&sources.fixtures, &sources.team_stats, &sources.teams] {
        println!("\n--- {} ---", table.name.to_uppercase());
        report::print_raw_preview(table, cfg.preview_rows);
    }
    for table in [&sources.fixtures, &sources.team_stats, &sources.teams] {
        println!("\n--- {} INFO ---", table.name.to_uppercase());
        report::print_info(table);
    }

    let projected = dataset::project_sources(&sources)?;
    for table in [&projected.fixtures, &projected.team_stats, &projected.teams] {
        println!("\n--- {} CLEAN ---", table.name.to_uppercase());
        report::print_raw_preview(table, cfg.preview_rows);
    }
    let clean = dataset::decode_sources(&projected)?;

    let Enriched { rows, quality } = enrich_tables(&clean);
    quality.log();
    info!(rows = rows.len(), "enriched team matches");

    println!("\n--- TEAM MATCH DATA ---");
    report::print_joined_preview(&rows, 10);
    println!("\n--- FEATURE ENGINEERED DATA ---");
    report::print_feature_preview(&rows, 10);

    let (aggregates, summary) = summarise(&rows, cfg.missing_groups)?;

    println!("\n--- WIN RATE BY POSSESSION ---");
    report::print_grouped(
        |b: &PossessionBucket| b.label().to_string(),
        &aggregates.by_possession,
        PossessionBucket::ALL.len(),
    );
    println!("\n--- TOP TEAMS BY WIN RATE ---");
    report::print_grouped(|name: &String| name.clone(), &aggregates.by_team, cfg.top_teams);
    println!("\n--- SHOT ACCURACY VS MATCH RESULT ---");
    report::print_grouped(
        |won: &bool| result_label(*won),
        &aggregates.shot_accuracy_by_result,
        2,
    );
    println!("\n--- DISCIPLINE SCORE VS MATCH RESULT ---");
    report::print_grouped(
        |won: &bool| result_label(*won),
        &aggregates.discipline_by_result,
        2,
    );
    println!("\n--- FINAL INSIGHT SUMMARY ---");
    report::print_summary(&summary);

    let rows_written = report::write_enriched_csv(&cfg.output, &rows)?;
    if let Some(xlsx) = &cfg.xlsx {
        report::write_workbook(xlsx, &rows, &summary, &aggregates)?;
    }
    println!("\nData exported to {} ({rows_written} rows)", cfg.output.display());

    Ok(PipelineReport {
        output: cfg.output.clone(),
        rows_written,
        quality,
        aggregates,
        summary,
    })
}

fn result_label(won: bool) -> String {
    String::from(if won { "Win" } else { "Loss" })
}
