use std::process::ExitCode;

use github_summary::{Config, run};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(output_dir = %config.output_dir.display(), "output will be saved here");

    match run(&config).await {
        Ok(path) => {
            println!("Summary saved to: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "run aborted");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
