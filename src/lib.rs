pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::SieveConfig};

pub use adapters::{DisabledAdjudicator, HttpAdjudicator};
pub use app::pipelines::BatchPipeline;
pub use core::{etl::SieveEngine, orchestrator::Orchestrator};
pub use domain::model::{PipelineKind, PipelineOutcome, PipelineResult, RawResult, RejectReason};
pub use utils::error::{Result, SieveError};
