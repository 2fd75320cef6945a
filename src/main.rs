use std::sync::Arc;

use xtra_secure::api::router::create_router;
use xtra_secure::config::AppConfig;
use xtra_secure::pipeline::ClassificationPipeline;
use xtra_secure::provisioning::provision;
use xtra_secure::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_json);

    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = xtra_secure::metrics::init_metrics()?;

    // --- Model provisioning: both classifiers or nothing ---
    let http = reqwest::Client::new();
    let loaded = provision(&config.models, &http).await.map_err(|e| {
        tracing::error!(error = %e, "Model provisioning failed, refusing to start");
        e
    })?;

    tracing::info!(
        text = %loaded.provenance.text,
        binary = %loaded.provenance.binary,
        source = %loaded.provenance.source,
        "Models ready"
    );

    if config.has_api_token() {
        tracing::info!("Bearer token required on classification routes");
    } else {
        tracing::warn!("API_TOKEN is not set, classification routes are open");
    }

    let state = AppState {
        pipeline: Arc::new(ClassificationPipeline::new(loaded.classifiers)),
        provenance: loaded.provenance,
        config,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
