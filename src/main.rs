use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use climia::api::AppState;
use climia::{ClimiaConfig, ClimiaError, ForecastService, MeasurementStore, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = run().await {
        if let Some(app_err) = err.chain().find_map(|e| e.downcast_ref::<ClimiaError>()) {
            eprintln!("{}", app_err.user_message());
        }
        return Err(err);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ClimiaConfig::load_from_path(config_path)?;

    logging::init(&config.logging)?;
    tracing::info!("Starting climia {}", climia::VERSION);

    let store = MeasurementStore::open(&config.storage.path)?;

    if let Some(seed) = &config.storage.seed_file {
        store.import_json(seed).await?;
    }

    let service = ForecastService::from_source(Arc::new(store.clone()), config.timezone()?);
    tracing::info!(
        "Forecasting with timezone {}, today is {}",
        config.forecast.timezone,
        service.today()
    );

    let state = AppState::new(service, store, config.server.api_token.clone());
    web::run(&config.server, state).await
}
