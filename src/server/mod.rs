pub mod handlers;
pub mod types;

pub use handlers::AppState;

use crate::{
    Result,
    config::Config,
    pipeline::DetectClassifyPipeline,
    upload::UploadStore,
    vision::{OnnxClassifier, OnnxDetector},
};
use axum::{Router, extract::DefaultBodyLimit, routing::post};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Builds the HTTP routes around an already initialised state.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let results = ServeDir::new(state.pipeline.result_dir());

    Router::new()
        .route("/detect_and_classify", post(handlers::detect_and_classify))
        .nest_service(types::RESULTS_ROUTE, results)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // Load both models before accepting traffic
    let models = &config.models;
    let detector = OnnxDetector::load(&models.detection, models.intra_threads)?;
    let classifier = OnnxClassifier::load(&models.classification, models.intra_threads)?;
    info!("Models loaded");

    let pipeline = DetectClassifyPipeline::new(
        Arc::new(detector),
        Arc::new(classifier),
        config.storage.result_dir.clone(),
    )
    .await?;
    let uploads = UploadStore::new(
        config.storage.upload_dir.clone(),
        config.upload.allowed_extensions.clone(),
    )
    .await?;

    let app_state = AppState {
        pipeline: Arc::new(pipeline),
        uploads: Arc::new(uploads),
    };

    let app = router(app_state, config.server.max_upload_bytes);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
