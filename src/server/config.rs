//! Server configuration from environment variables.

use crate::core::{OcrError, OcrResult};
use crate::pipeline::PipelineConfig;
use axum::http::HeaderValue;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind_addr: String,
    /// Frontend origin allowed by CORS.
    pub allowed_origin: HeaderValue,
    /// External translation endpoint; translation is disabled when unset.
    pub translate_api_url: Option<String>,
    /// Pipeline settings forwarded to [`crate::pipeline::PGNetPipeline`].
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    /// Reads configuration from the environment, falling back to defaults.
    ///
    /// Recognized variables: `PGNET_MODEL_PATH`, `PGNET_DICT_PATH`,
    /// `PGNET_BIND_ADDR`, `PGNET_ALLOWED_ORIGIN`, `PGNET_SESSION_POOL_SIZE`
    /// and `TRANSLATE_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the allowed origin is not a valid
    /// header value or the pool size is not a positive integer.
    pub fn from_env() -> OcrResult<Self> {
        let mut pipeline = PipelineConfig::default();
        if let Ok(path) = env::var("PGNET_MODEL_PATH") {
            pipeline.model_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("PGNET_DICT_PATH") {
            pipeline.dict_path = PathBuf::from(path);
        }
        if let Ok(size) = env::var("PGNET_SESSION_POOL_SIZE") {
            pipeline.session_pool_size = size.parse::<usize>().ok().filter(|&n| n > 0).ok_or_else(
                || {
                    OcrError::config_error(format!(
                        "PGNET_SESSION_POOL_SIZE must be a positive integer, got {size:?}"
                    ))
                },
            )?;
        }

        let origin = env::var("PGNET_ALLOWED_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let allowed_origin = origin.parse::<HeaderValue>().map_err(|_| {
            OcrError::config_error(format!("PGNET_ALLOWED_ORIGIN is not a valid origin: {origin:?}"))
        })?;

        Ok(Self {
            bind_addr: env::var("PGNET_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            allowed_origin,
            translate_api_url: env::var("TRANSLATE_API_URL").ok(),
            pipeline,
        })
    }
}
