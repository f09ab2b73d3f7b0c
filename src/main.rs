use certmeta::observability::init_logging;
use certmeta::plugin::PluginStdioServer;
use certmeta::{Result, APP_NAME, VERSION};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "certmeta")]
#[command(about = "Multi-environment ADC certificate metadata plugin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (optional - won't fail if missing).
    // This must happen before any config is read from environment.
    if let Err(e) = dotenvy::dotenv() {
        if !e.to_string().contains("not found") {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json)?;

    info!(app_name = APP_NAME, version = VERSION, "Starting certificate metadata plugin");

    PluginStdioServer::new().run().await
}
