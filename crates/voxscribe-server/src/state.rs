use std::sync::Arc;
use voxscribe_engine::Transcriber;

/// Static facts reported by `/health`.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub engine: String,
    pub version: String,
}

impl ServiceInfo {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub transcriber: Arc<Transcriber>,
    pub info: Arc<ServiceInfo>,
}

impl AppState {
    pub fn new(transcriber: Arc<Transcriber>, info: ServiceInfo) -> Self {
        Self {
            transcriber,
            info: Arc::new(info),
        }
    }
}
