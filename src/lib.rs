pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{Exporter, HttpApiSource};
pub use config::{CliArgs, RunConfig};
pub use core::{SearchEngine, SourceRegistry};
pub use domain::model::{
    CanonicalPosting, Profile, RawPosting, RunResult, ScoredPosting, SourceOutcome,
};
pub use domain::ports::Source;
pub use utils::error::{Result, ScoutError, SourceError};
