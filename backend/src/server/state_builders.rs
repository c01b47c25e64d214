//! Builders selecting real or in-memory ports for the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use backend::domain::ports::{
    ImageStore, InMemoryImageStore, InMemoryPieceRepository, InMemoryStageDetailRepository,
    InMemoryUserRepository, InMemoryUserStatsQuery, UserRepository, UserStatsQuery,
};
use backend::domain::{ImageService, PieceService};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DbPool, DieselPieceRepository, DieselStageDetailRepository, DieselUserRepository,
    DieselUserStatsQuery,
};

use super::ServerConfig;

fn build_database_state(pool: &DbPool, images: Arc<ImageService>) -> HttpState {
    let pieces = Arc::new(PieceService::new(
        Arc::new(DieselPieceRepository::new(pool.clone())),
        Arc::new(DieselStageDetailRepository::new(pool.clone())),
    ));
    let users: Arc<dyn UserRepository> = Arc::new(DieselUserRepository::new(pool.clone()));
    let stats: Arc<dyn UserStatsQuery> = Arc::new(DieselUserStatsQuery::new(pool.clone()));
    HttpState::new(pieces, images, users, stats)
}

fn build_in_memory_state(images: Arc<ImageService>) -> HttpState {
    let piece_repo = Arc::new(InMemoryPieceRepository::new());
    let pieces = Arc::new(PieceService::new(
        piece_repo.clone(),
        Arc::new(InMemoryStageDetailRepository::new()),
    ));
    let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
    let stats: Arc<dyn UserStatsQuery> = Arc::new(InMemoryUserStatsQuery::new(piece_repo));
    HttpState::new(pieces, images, users, stats)
}

/// Build the shared HTTP state from configured adapters with in-memory
/// fallbacks for development and tests.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let store: Arc<dyn ImageStore> = match &config.image_store {
        Some(store) => store.clone(),
        None => {
            warn!("no image store configured; uploads are held in memory");
            Arc::new(InMemoryImageStore::new())
        }
    };
    let images = Arc::new(ImageService::new(store));

    let state = match &config.db_pool {
        Some(pool) => build_database_state(pool, images),
        None => {
            warn!("no database configured; state will not survive a restart");
            build_in_memory_state(images)
        }
    };
    web::Data::new(state)
}
