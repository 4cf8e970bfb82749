use std::sync::Arc;
use tokio::sync::RwLock;

use crate::assistant::Assistant;
use crate::catalog::CatalogStore;
use crate::indexer::CatalogIndexer;

/// Shared state behind every API handler.
///
/// The indexer sits behind a `RwLock`: searches take read locks and may
/// run concurrently, while a rebuild takes the write lock, so it can
/// never race another rebuild or a search against the directory wipe.
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub indexer: RwLock<CatalogIndexer>,
    pub assistant: Assistant,
}
