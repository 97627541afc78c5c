use clap::Parser;
use relevance_sieve::app::pipelines::batch_pipeline::load_seen_urls;
use relevance_sieve::core::Pipeline;
use relevance_sieve::domain::ports::{Adjudicator, SeenUrls};
use relevance_sieve::utils::error::{ErrorSeverity, SieveError};
use relevance_sieve::utils::{logger, validation::Validate};
use relevance_sieve::{
    BatchPipeline, CliConfig, DisabledAdjudicator, HttpAdjudicator, LocalStorage, Orchestrator,
    PipelineKind, SieveConfig, SieveEngine,
};
use std::sync::Arc;

fn exit_code(e: &SieveError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 配置或系統錯誤
    }
}

fn fail(stage: &str, e: &SieveError) -> ! {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());
    std::process::exit(exit_code(e).max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting relevance-sieve CLI");
    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = cli.validate() {
        fail("CLI validation", &e);
    }

    // 載入並驗證配置
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            SieveConfig::from_file(path).unwrap_or_else(|e| fail("Loading configuration", &e))
        }
        None => {
            tracing::info!("Using built-in keyword and domain profile");
            SieveConfig::default()
        }
    };
    if let Err(e) = config.validate() {
        fail("Configuration validation", &e);
    }
    let config = Arc::new(config);

    let adjudicator: Arc<dyn Adjudicator> = match HttpAdjudicator::from_config(&config.adjudication)
    {
        Some(http) => Arc::new(http),
        None => {
            tracing::warn!(
                "No adjudication endpoint configured; escalated items will be rejected as adjudicator_failure"
            );
            Arc::new(DisabledAdjudicator)
        }
    };

    let source = LocalStorage::new(cli.input_dir.clone());
    let sink = LocalStorage::new(cli.output_path.clone());

    let seen: Option<Arc<dyn SeenUrls>> = match &cli.seen_file {
        Some(path) => {
            let urls = load_seen_urls(&source, path, config.dedup.retain_query)
                .await
                .unwrap_or_else(|e| fail("Loading seen URLs", &e));
            let urls: Arc<dyn SeenUrls> = Arc::new(urls);
            Some(urls)
        }
        None => None,
    };

    let kind = PipelineKind::from(cli.pipeline);
    let today = chrono::Local::now().date_naive();
    let orchestrator = Orchestrator::new(config, kind, adjudicator, seen, today)
        .unwrap_or_else(|e| fail("Pipeline setup", &e));

    let pipeline = BatchPipeline::new(source, sink, cli.clone(), orchestrator);

    if cli.dry_run {
        let raw = pipeline
            .extract()
            .await
            .unwrap_or_else(|e| fail("Reading input", &e));
        tracing::info!(
            "🔍 Dry run: {} raw results would be processed by the {} pipeline",
            raw.len(),
            kind
        );
        println!("✅ Configuration and input are valid ({} results)", raw.len());
        return Ok(());
    }

    let engine = SieveEngine::new(pipeline);
    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Sieve run completed successfully!");
            println!("✅ Sieve run completed successfully!");
            println!("📁 Report saved to: {}", output_path);
        }
        Err(e) => {
            if exit_code(&e) > 0 {
                fail("Sieve run", &e);
            }
            tracing::warn!("Sieve run finished with a warning: {}", e);
        }
    }

    Ok(())
}
