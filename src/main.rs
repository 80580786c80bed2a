// src/main.rs

use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use dream_library::config::{log_level_from_env, CONFIG};
use dream_library::llm::GeminiConnector;
use dream_library::session::SessionController;
use dream_library::ui::TerminalApp;

#[derive(Parser)]
#[command(name = "dream-library")]
#[command(about = "Interactive choose-your-own-adventure stories for children", long_about = None)]
struct Cli {
    /// Gemini model to use (overrides STORY_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The subscriber must exist before CONFIG is forced, so its parse
    // warnings are not lost
    let (level, bad_level) = match log_level_from_env() {
        Ok(level) => (level, None),
        Err(raw) => (Level::INFO, Some(raw)),
    };
    let level = if cli.debug { Level::DEBUG } else { level };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(raw) = bad_level {
        warn!("Config: STORY_LOG_LEVEL = '{}' (parse failed, using info)", raw);
    }

    let mut config = (*CONFIG).clone();
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }

    info!("Model: {}", config.model);
    if !config.has_api_key() {
        warn!("API_KEY is not set; stories cannot be started");
    }

    let connector = Arc::new(GeminiConnector::from_config(&config));
    let controller = Arc::new(SessionController::from_config(connector, &config));

    let mut app = TerminalApp::new(
        controller,
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    );
    app.run().await
}
