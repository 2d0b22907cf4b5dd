use overdose_sentinel::{
    analytics::AnalyticsEngine,
    api::{build_router, AppState},
    config::Config,
    forecast::ForecastService,
    processing::{AnalysisWorker, IncidentProcessor},
    state::create_store,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "overdose_sentinel=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        default_config()
    });

    tracing::info!("Starting Overdose Sentinel v{}", env!("CARGO_PKG_VERSION"));

    // Initialize storage backend
    tracing::info!("Storage backend: {:?}", config.state.backend);
    let store = create_store(&config.state)?;
    tracing::info!("Storage backend initialized");

    // Spawn the analysis worker around a validated engine
    let engine = AnalyticsEngine::new(config.analytics.clone())?;
    let worker = AnalysisWorker::spawn(engine);
    tracing::info!(
        baseline_window_days = config.analytics.baseline_window_days,
        current_period_days = config.analytics.current_period_days,
        "Analysis worker started"
    );

    // Initialize the forecasting collaborator
    let forecasts = match ForecastService::from_config(&config.forecast) {
        Ok(service) => {
            if config.forecast.enabled {
                tracing::info!(model = %config.forecast.model, "Forecasting collaborator enabled");
            } else {
                tracing::info!("Forecasting collaborator disabled; low-risk placeholders will be used");
            }
            Arc::new(service)
        }
        Err(e) => {
            tracing::warn!("Forecasting initialization failed: {}", e);
            tracing::warn!("Continuing with low-risk placeholder forecasts");
            Arc::new(ForecastService::new(None))
        }
    };

    // Wire the processor and router
    let processor = Arc::new(IncidentProcessor::new(store, worker, forecasts));
    let router = build_router(AppState::new(processor));

    let addr = format!("{}:{}", config.server.host, config.server.http_port);
    tracing::info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn default_config() -> Config {
    use overdose_sentinel::config::{ServerConfig, StateBackend, StateConfig};

    Config {
        server: ServerConfig::default(),
        state: StateConfig {
            backend: StateBackend::Memory,
            path: None,
        },
        analytics: Default::default(),
        forecast: Default::default(),
    }
}
