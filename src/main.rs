//! Server process entry point.
//!
//! ```text
//! admin-gate --config server.json
//!     → load config → init logging → admin listener
//!     → park until an operator sends STOP → notify subsystems → exit
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use admin_gate::Application;
use clap::Parser;

#[derive(Parser)]
#[command(name = "admin-gate")]
#[command(about = "Server process with a single-operator admin control channel", long_about = None)]
struct Cli {
    /// Path to the JSON or TOML configuration file
    #[arg(short, long)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let app = match Application::from_config_file(&cli.config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("An error occurred: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing::info!("admin-gate v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = app.run().await {
        tracing::error!(error = %e, "Server stopped with an error");
        eprintln!("An error occurred: {}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
