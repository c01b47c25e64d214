//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain; the adapters translate them at the boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{pieces, stage_details, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub google_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub location: String,
    pub title: String,
    pub bio: String,
    pub website: String,
    pub socials: serde_json::Value,
    pub username: String,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub google_id: Option<&'a str>,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub location: &'a str,
    pub title: &'a str,
    pub bio: &'a str,
    pub website: &'a str,
    pub socials: &'a serde_json::Value,
    pub username: &'a str,
    pub profile_picture: Option<&'a str>,
}

/// Changeset struct for patching user records. `None` fields are skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub location: Option<&'a str>,
    pub title: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub website: Option<&'a str>,
    pub socials: Option<serde_json::Value>,
    pub username: Option<&'a str>,
    pub profile_picture: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Row struct for reading from the pieces table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pieces)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PieceRow {
    pub id: Uuid,
    pub title: String,
    pub kind: String,
    pub details: String,
    pub status: Option<String>,
    pub priority: String,
    pub stage: String,
    pub archived: bool,
    pub starred: bool,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
}

/// Insertable struct for creating piece records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pieces)]
pub(crate) struct NewPieceRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub kind: &'a str,
    pub details: &'a str,
    pub status: Option<&'a str>,
    pub priority: &'a str,
    pub stage: &'a str,
    pub owner_id: Uuid,
    pub due_date: Option<DateTime<Utc>>,
}

/// Changeset struct for patching piece records. `None` fields are skipped;
/// `last_updated` is always written.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = pieces)]
pub(crate) struct PieceChangeset<'a> {
    pub title: Option<&'a str>,
    pub kind: Option<&'a str>,
    pub details: Option<&'a str>,
    pub status: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub stage: Option<&'a str>,
    pub archived: Option<bool>,
    pub starred: Option<bool>,
    pub due_date: Option<DateTime<Utc>>,
    pub last_updated: DateTime<Utc>,
}

/// Row struct for reading from the stage_details table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = stage_details)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StageDetailRow {
    pub id: Uuid,
    pub piece_id: Uuid,
    pub stage: String,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub weight: Option<i32>,
    pub glazes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating stage-detail records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = stage_details)]
pub(crate) struct NewStageDetailRow<'a> {
    pub id: Uuid,
    pub piece_id: Uuid,
    pub stage: &'a str,
}

/// Changeset struct for patching stage-detail records. `None` fields are
/// skipped; `updated_at` is always written.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = stage_details)]
pub(crate) struct StageDetailChangeset<'a> {
    pub notes: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub weight: Option<i32>,
    pub glazes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
