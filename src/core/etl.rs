use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

/// 依序執行 extract / transform / load
pub struct SieveEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SieveEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting sieve run...");

        // Extract
        let raw = self.pipeline.extract().await?;
        tracing::info!("Extracted {} raw results", raw.len());

        // Transform
        let outcome = self.pipeline.transform(raw).await?;
        tracing::info!(
            "{} pipeline accepted {} and rejected {} results",
            outcome.kind,
            outcome.counters.accepted,
            outcome.counters.rejected
        );

        // Load
        let output_path = self.pipeline.load(outcome).await?;
        tracing::info!("Report saved to: {}", output_path);

        Ok(output_path)
    }
}
