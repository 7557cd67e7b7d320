use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use deer_guide::{
    AnalysisOrchestrator, AnalysisRequest, AnalysisState, DeerGuideConfig, HttpEnvironmentClient,
    NominatimResolver, OrchestratorSettings, RunPhase, http, logging,
};

#[derive(Debug, Parser)]
#[command(
    name = "deer-guide",
    version,
    about = "Whitetail hunting recommendations from live weather and terrain data"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "DEERGUIDE_CONFIG")]
    config: Option<PathBuf>,

    /// Analyze once and exit instead of refreshing on a timer
    #[arg(long)]
    once: bool,

    /// Place name or "lat,lon"; defaults to the configured location
    location: Option<String>,
}

fn render(state: &AnalysisState) {
    println!("{}", state.map_view());
    println!("{}\n", state.status_readout());
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = DeerGuideConfig::load_from_path(cli.config)?;
    logging::initialize_logging(&config.logging)?;

    let client = http::build_client(&config.http)?;
    let resolver = Arc::new(NominatimResolver::new(client.clone(), &config.geocoding));
    let environment = Arc::new(HttpEnvironmentClient::new(client, &config));
    let settings = OrchestratorSettings::from_config(&config)?;
    let orchestrator = AnalysisOrchestrator::new(resolver, environment, settings);

    let request = cli.location.map(AnalysisRequest::Query);

    if cli.once {
        let request = request.unwrap_or_else(|| AnalysisRequest::At(orchestrator.snapshot().center));
        let outcome = orchestrator.analyze(request).await;
        render(&orchestrator.snapshot());
        if let Err(e) = outcome {
            return Err(e).context("Analysis failed");
        }
        return Ok(());
    }

    let mut updates = orchestrator.subscribe();
    match request {
        Some(request) => orchestrator.start_with(request).await,
        None => orchestrator.start().await,
    }
    render(&updates.borrow_and_update());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state.phase != RunPhase::Running {
                    render(&state);
                }
            }
        }
    }

    orchestrator.stop();
    tracing::info!("Shutting down");
    Ok(())
}
