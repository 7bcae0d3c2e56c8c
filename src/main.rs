use balrogworker::cli::Cli;
use balrogworker::config::{self, ProcessEnv};
use balrogworker::{observability, worker};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // A missing .env file is fine; real deployments set variables directly
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = config::resolve(&cli, &ProcessEnv)?;

    observability::init_tracing(config.loglevel);
    tracing::debug!(?config, "Resolved configuration");

    if let Err(e) = worker::run(&config).await {
        tracing::error!(error = %e, "Worker failed");
        return Err(e.into());
    }

    Ok(())
}
