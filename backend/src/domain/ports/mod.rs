//! Outbound ports the domain depends on.
//!
//! Each port is an async trait with a small error enum; adapters live under
//! `outbound`. The in-memory implementations here back unit tests and the
//! degraded no-infrastructure startup mode.

pub mod image_store;
pub mod piece_repository;
pub mod stage_detail_repository;
pub mod user_repository;
pub mod user_stats_query;

pub use image_store::{ImageStore, ImageStoreError, InMemoryImageStore, StoredImage};
pub use piece_repository::{InMemoryPieceRepository, PieceRepository, PieceRepositoryError};
pub use stage_detail_repository::{
    InMemoryStageDetailRepository, StageDetailRepository, StageDetailRepositoryError,
};
pub use user_repository::{InMemoryUserRepository, UserRepository, UserRepositoryError};
pub use user_stats_query::{InMemoryUserStatsQuery, UserStatsQuery, UserStatsQueryError};
