pub mod date_resolver;
pub mod dedup;
pub mod domain_classifier;
pub mod etl;
pub mod event_classifier;
pub mod lexical;
pub mod orchestrator;
pub mod report;
pub mod scorer;

pub use crate::domain::model::{PipelineOutcome, RawResult};
pub use crate::domain::ports::{Adjudicator, ConfigProvider, Pipeline, SeenUrls, Storage};
pub use crate::utils::error::Result;
