pub mod aggregate;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod join;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod report;

pub use error::{PipelineError, Result};
