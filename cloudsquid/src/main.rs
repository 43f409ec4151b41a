use clap::Parser;
use tracing_subscriber::EnvFilter;

use cloudsquid::cli::{run, Cli};

#[tokio::main]
async fn main() {
    // Load environment
    dotenvy::dotenv().ok();

    init_tracing();
    tracing::info!("CLI application startup: tracing initialised, environment loaded");

    // Usage errors exit with code 1; --help and --version stay on code 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    tracing::info!("CLI arguments parsed, starting workflow");

    match run(cli).await {
        Ok(()) => {
            tracing::info!("CLI run completed successfully");
        }
        Err(e) => {
            if tracing::enabled!(tracing::Level::ERROR) {
                tracing::error!(error = %e, "CLI exited with error");
            } else {
                eprintln!("Error: {e:#}");
            }
            std::process::exit(1);
        }
    }
}

/// Diagnostics go to stderr so stdout carries only the final result payload.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
