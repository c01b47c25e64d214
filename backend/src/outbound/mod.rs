//! Outbound adapters implementing the domain's ports.
//!
//! - **persistence**: PostgreSQL repositories via Diesel
//! - **blob**: S3 object storage for user images
//!
//! Adapters translate between domain types and infrastructure
//! representations; they contain no business logic.

pub mod blob;
pub mod persistence;
