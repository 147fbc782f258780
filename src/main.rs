use std::sync::Arc;

use coverage_advisor::advisor::AdvisorService;
use coverage_advisor::config::Config;
use coverage_advisor::gemini_client::GeminiClient;
use coverage_advisor::handlers::{self, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, constructs the Gemini client
/// (a missing API key aborts startup here, not per request), then serves the
/// advisory routes.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coverage_advisor=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let gemini = GeminiClient::from_config(&config)?;
    tracing::info!("✓ Gemini client initialized: model {}", config.gemini_model);

    let advisor = AdvisorService::new(Arc::new(gemini), &config);

    // Build application state
    let app_state = Arc::new(AppState { advisor });

    let app = handlers::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
