mod config;
mod error;
mod json;
mod middlewares;
mod routes;
mod services;

use std::sync::Arc;

use plate_share_store::{FoodStore, MongoStore};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::services::firebase::{FirebaseVerifier, ServiceAccount, TokenVerifier};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FoodStore>,
    pub verifier: Arc<dyn TokenVerifier>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let service_account = ServiceAccount::from_file(&config.service_account_path)?;
    tracing::info!(project = %service_account.project_id, "loaded service account");
    let verifier = FirebaseVerifier::new(
        service_account,
        config.firebase_api_key.clone(),
        &config.identity_toolkit_url,
    );

    let store = MongoStore::connect(&config.mongodb_uri, &config.database).await?;

    // the driver reconnects lazily, so a failed ping is not fatal
    match store.ping().await {
        Ok(()) => tracing::info!("pinged deployment, connected to MongoDB"),
        Err(e) => tracing::error!(error = %e, "failed to ping MongoDB"),
    }

    let state = AppState {
        store: Arc::new(store),
        verifier: Arc::new(verifier),
    };

    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
