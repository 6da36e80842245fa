use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of a pipeline run. Row-level data-quality issues are never reported here.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data in {} (line {line}): {message}", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("table `{table}` has no column `{column}`")]
    Schema { table: String, column: String },

    #[error("cannot write {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("metric `{metric}` has no rows in its group")]
    EmptyGroup { metric: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
