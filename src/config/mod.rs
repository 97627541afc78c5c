pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::PipelineKind;
#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::{Result, SieveError};
#[cfg(feature = "cli")]
use crate::utils::validation::Validate;
#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum PipelineArg {
    News,
    Events,
}

#[cfg(feature = "cli")]
impl From<PipelineArg> for PipelineKind {
    fn from(arg: PipelineArg) -> Self {
        match arg {
            PipelineArg::News => PipelineKind::News,
            PipelineArg::Events => PipelineKind::Events,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "relevance-sieve")]
#[command(about = "Classify search results into accepted, rejected and escalated buckets")]
pub struct CliConfig {
    #[arg(short, long, help = "Path to TOML configuration file; built-in defaults when omitted")]
    pub config: Option<String>,

    #[arg(short, long, help = "JSON array of raw search results, relative to --input-dir")]
    pub input: String,

    #[arg(long, default_value = ".")]
    pub input_dir: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_enum, default_value = "news")]
    pub pipeline: PipelineArg,

    #[arg(long, help = "Newline-separated URLs already persisted by the store")]
    pub seen_file: Option<String>,

    #[arg(long, default_value = "sieve_report.zip")]
    pub report_name: String,

    #[arg(long, help = "Validate configuration and input, then exit")]
    pub dry_run: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn report_name(&self) -> &str {
        &self.report_name
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.input.trim().is_empty() {
            return Err(SieveError::MissingConfigError {
                field: "input".to_string(),
            });
        }
        if self.output_path.trim().is_empty() {
            return Err(SieveError::MissingConfigError {
                field: "output_path".to_string(),
            });
        }
        if !self.report_name.ends_with(".zip") {
            return Err(SieveError::InvalidConfigValueError {
                field: "report_name".to_string(),
                value: self.report_name.clone(),
                reason: "Report name must end with .zip".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = CliConfig::parse_from(["relevance-sieve", "--input", "results.json"]);
        assert_eq!(config.pipeline, PipelineArg::News);
        assert_eq!(config.output_path, "./output");
        assert_eq!(config.report_name(), "sieve_report.zip");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_events_pipeline() {
        let config = CliConfig::parse_from([
            "relevance-sieve",
            "-i",
            "events.json",
            "--pipeline",
            "events",
            "--seen-file",
            "seen.txt",
            "-v",
        ]);
        assert_eq!(PipelineKind::from(config.pipeline), PipelineKind::Events);
        assert_eq!(config.seen_file.as_deref(), Some("seen.txt"));
        assert!(config.verbose);
    }

    #[test]
    fn test_report_name_must_be_zip() {
        let config = CliConfig::parse_from([
            "relevance-sieve",
            "-i",
            "results.json",
            "--report-name",
            "report.csv",
        ]);
        assert!(matches!(
            config.validate(),
            Err(SieveError::InvalidConfigValueError { .. })
        ));
    }
}
