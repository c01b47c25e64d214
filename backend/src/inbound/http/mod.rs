//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod pieces;
pub mod state;
pub mod user_images;
pub mod users;
pub mod validation;

pub use error::ApiResult;
