//! Ratio Forge API Server binary
//!
//! HTTP REST API for balance-sheet ratio analysis with per-user sessions.

use clap::Parser;
use ratio_forge::api::run_api_server;
use ratio_forge::config::Settings;
use ratio_forge::logging;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ratio-forge-server")]
#[command(version)]
#[command(author = "RoyalBit Inc. <admin@royalbit.ca>")]
#[command(about = "Ratio Forge API Server - HTTP REST API for balance-sheet ratio analysis")]
#[command(long_about = r#"
Ratio Forge API Server - HTTP REST API

Endpoints:
  - POST   /api/v1/analyze                   - Analyze rows without a session
  - POST   /api/v1/sessions                  - Create a session
  - GET    /api/v1/sessions/:id              - Session analysis and chat history
  - DELETE /api/v1/sessions/:id              - Delete a session
  - POST   /api/v1/sessions/:id/table        - Analyze rows into the session
  - POST   /api/v1/sessions/:id/commentary   - Narrative commentary
  - POST   /api/v1/sessions/:id/messages     - Follow-up question

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Commentary and chat need an API key (GEMINI_API_KEY or narrative.api_key).

Example usage:
  ratio-forge-server                           # Start on localhost:8080
  ratio-forge-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/analyze \
    -H "Content-Type: application/json" \
    -d '{"rows": [["TOTAL ASSETS", 100, 150]]}'
"#)]
struct Args {
    /// Config file (default: ./ratio-forge.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, env = "RATIO_FORGE_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RATIO_FORGE_PORT")]
    port: Option<u16>,

    /// API key for the text-generation service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("ratio_forge=info,tower_http=info");
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(key) = args.api_key {
        settings.narrative.api_key = Some(key);
    }

    run_api_server(settings).await
}
