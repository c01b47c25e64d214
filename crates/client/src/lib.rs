//! Client library for the Potterly backend.
//!
//! Pairs a typed HTTP API client with a reactive in-memory store:
//!
//! - [`api::HttpPiecesApi`] speaks the REST wire format over `reqwest`.
//! - [`store::PiecesStore`] keeps a local piece list, applies mutations
//!   optimistically, and reconciles with the server's responses.

pub mod api;
pub mod error;
pub mod store;
pub mod types;

pub use api::{HttpPiecesApi, PiecesApi};
pub use error::ClientError;
pub use store::PiecesStore;
pub use types::{
    Piece, PieceDraft, PieceUpdate, PieceWithStages, Priority, Stage, StageDetailUpdate,
    StageEntries, StageEntry,
};
