pub mod concierge;
pub mod config;
pub mod media;
pub mod provider;
pub mod rest;
pub mod rooms;
pub mod storage;

use std::sync::Arc;

use config::ConciergeConfig;
use media::MediaStore;
use provider::ChatProvider;
use storage::Storage;

/// Shared application state passed to every route handler.
///
/// All external collaborators (tenant store, object store, AI provider) are
/// constructed once in bootstrap and injected here. No process-wide
/// singletons — every collaborator stays swappable in tests.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ConciergeConfig>,
    pub storage: Arc<Storage>,
    pub media: Arc<MediaStore>,
    pub provider: Arc<dyn ChatProvider>,
    pub started_at: std::time::Instant,
}
