//! Core domain: models, validation, ports, and services.
//!
//! Everything here is transport-agnostic; HTTP concerns live under
//! `inbound` and storage concerns under `outbound`.

pub mod error;
pub mod image_service;
pub mod piece;
pub mod piece_service;
pub mod ports;
pub mod stage;
pub mod stage_detail;
pub mod stats;
pub mod user;

pub use error::{Error, ErrorCode};
pub use image_service::{ImageService, UserImage};
pub use piece::{NewPiece, Piece, PieceId, PiecePatch};
pub use piece_service::PieceService;
pub use stage::{Priority, Stage};
pub use stage_detail::{PieceWithStages, StageDetail, StageDetailPatch};
pub use stats::UserStats;
pub use user::{NewUser, User, UserId, UserPatch, UserSocials, Username};
