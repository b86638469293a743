use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::llm_client::DocumentService;
use crate::session::SessionContext;
use crate::voice_platform::VoicePlatform;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Document-understanding service used by the extractor.
    pub documents: Arc<dyn DocumentService>,
    /// Voice-agent platform used by the provisioner and the feedback retriever.
    pub voice: Arc<dyn VoicePlatform>,
    /// The operator's session. Never held across an outbound call.
    pub session: Arc<Mutex<SessionContext>>,
}

impl AppState {
    pub fn new(
        config: Config,
        documents: Arc<dyn DocumentService>,
        voice: Arc<dyn VoicePlatform>,
    ) -> Self {
        Self {
            config,
            documents,
            voice,
            session: Arc::new(Mutex::new(SessionContext::new())),
        }
    }
}
