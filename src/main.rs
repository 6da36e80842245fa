use anyhow::{Context, Result};

use match_insights::config::PipelineConfig;
use match_insights::logging::init_logging;
use match_insights::pipeline;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let cfg = PipelineConfig::from_env();
    let report = pipeline::run(&cfg).context("team match analysis failed")?;
    if !report.quality.is_clean() {
        eprintln!(
            "note: {} rows without shot accuracy, {} without possession bucket, {} unmatched fixtures",
            report.quality.zero_shot_rows,
            report.quality.uncategorised_possession,
            report.quality.unmatched_fixtures
        );
    }
    Ok(())
}
