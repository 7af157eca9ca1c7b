//! PGNet handwriting recognition server binary.

use pgnet_ocr::pipeline::PGNetPipeline;
use pgnet_ocr::server::{self, AppState, ServerConfig, TranslationClient};
use pgnet_ocr::utils::visualization::AnnotationConfig;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    info!(model = %config.pipeline.model_path.display(), "building pipeline");
    let pipeline = Arc::new(PGNetPipeline::new(&config.pipeline)?);

    let state = Arc::new(AppState {
        pipeline,
        annotation: AnnotationConfig::with_system_font(),
        translator: TranslationClient::new(config.translate_api_url.clone()),
        config: config.clone(),
    });
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
