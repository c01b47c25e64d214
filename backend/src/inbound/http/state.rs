//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` and depend only on the
//! domain services and ports, so they stay testable without infrastructure.

use std::sync::Arc;

use crate::domain::ports::{
    InMemoryImageStore, InMemoryPieceRepository, InMemoryStageDetailRepository,
    InMemoryUserRepository, InMemoryUserStatsQuery, UserRepository, UserStatsQuery,
};
use crate::domain::{ImageService, PieceService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Piece lifecycle operations.
    pub pieces: Arc<PieceService>,
    /// User image uploads.
    pub images: Arc<ImageService>,
    /// User storage port.
    pub users: Arc<dyn UserRepository>,
    /// Aggregate statistics port.
    pub stats: Arc<dyn UserStatsQuery>,
}

impl HttpState {
    /// Build state over the given services and ports.
    pub fn new(
        pieces: Arc<PieceService>,
        images: Arc<ImageService>,
        users: Arc<dyn UserRepository>,
        stats: Arc<dyn UserStatsQuery>,
    ) -> Self {
        Self {
            pieces,
            images,
            users,
            stats,
        }
    }

    /// Fully in-memory state for tests and the no-infrastructure fallback.
    pub fn in_memory() -> Self {
        let piece_repo = Arc::new(InMemoryPieceRepository::new());
        let pieces = Arc::new(PieceService::new(
            piece_repo.clone(),
            Arc::new(InMemoryStageDetailRepository::new()),
        ));
        let images = Arc::new(ImageService::new(Arc::new(InMemoryImageStore::new())));
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let stats: Arc<dyn UserStatsQuery> = Arc::new(InMemoryUserStatsQuery::new(piece_repo));
        Self::new(pieces, images, users, stats)
    }
}
