use std::{path::PathBuf, sync::Arc};

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    config::Configuration,
    error::AppError,
    network::{AppState, routes},
    scene::SceneDirectory,
    storage::Storage,
};

pub struct Server {
    address: String,
    router: Router,
}

impl Server {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub async fn start(self) -> Result<(), AppError> {
        info!("Starting HTTP server on {}", self.address);
        let listener = TcpListener::bind(&self.address)
            .await
            .map_err(|e| AppError::Bind(e, self.address.clone()))?;
        if let Ok(local) = listener.local_addr() {
            info!("Listening on {}", local);
        }
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(AppError::Serve)?;
        info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub struct ServerBuilder {
    configuration: Configuration,
}

impl ServerBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.configuration.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.configuration.port = port;
        self
    }

    pub fn uploads_dir(mut self, uploads_dir: impl Into<PathBuf>) -> Self {
        self.configuration.uploads_dir = uploads_dir.into();
        self
    }

    pub fn outputs_dir(mut self, outputs_dir: impl Into<PathBuf>) -> Self {
        self.configuration.outputs_dir = outputs_dir.into();
        self
    }

    pub fn scene_map_path(mut self, scene_map_path: impl Into<PathBuf>) -> Self {
        self.configuration.scene_map_path = scene_map_path.into();
        self
    }

    pub fn allowed_origins(mut self, allowed_origins: Vec<String>) -> Self {
        self.configuration.allowed_origins = allowed_origins;
        self
    }

    pub fn max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.configuration.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Creates the storage directories and assembles the router.
    pub async fn build(self) -> Result<Server, AppError> {
        let configuration = self.configuration;
        let storage = Storage::new(&configuration.uploads_dir, &configuration.outputs_dir);
        storage.ensure().await?;

        let state = Arc::new(AppState {
            storage,
            scenes: SceneDirectory::new(&configuration.scene_map_path),
        });
        let router = routes(
            state,
            &configuration.allowed_origins,
            configuration.max_upload_bytes,
        )?;
        Ok(Server {
            address: configuration.listen_address(),
            router,
        })
    }
}
