//! Pottery piece data model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::stage::{Priority, Stage};
use super::user::UserId;

/// Maximum length of a piece title.
pub const TITLE_MAX: usize = 255;
/// Maximum length of a piece kind (the `type` column).
pub const KIND_MAX: usize = 50;

/// Stable piece identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct PieceId(Uuid);

impl PieceId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PieceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Validation errors for piece fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PieceValidationError {
    /// Title is empty once trimmed.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeds [`TITLE_MAX`] characters.
    #[error("title must be at most {TITLE_MAX} characters")]
    TitleTooLong,
    /// Kind is empty once trimmed.
    #[error("type must not be empty")]
    EmptyKind,
    /// Kind exceeds [`KIND_MAX`] characters.
    #[error("type must be at most {KIND_MAX} characters")]
    KindTooLong,
}

fn validate_title(title: &str) -> Result<(), PieceValidationError> {
    if title.trim().is_empty() {
        return Err(PieceValidationError::EmptyTitle);
    }
    if title.chars().count() > TITLE_MAX {
        return Err(PieceValidationError::TitleTooLong);
    }
    Ok(())
}

fn validate_kind(kind: &str) -> Result<(), PieceValidationError> {
    if kind.trim().is_empty() {
        return Err(PieceValidationError::EmptyKind);
    }
    if kind.chars().count() > KIND_MAX {
        return Err(PieceValidationError::KindTooLong);
    }
    Ok(())
}

/// A tracked pottery piece.
///
/// ## Invariants
/// - `stage` holds the piece's current workflow position; stage-detail rows
///   for all six stages exist regardless of it (historical record).
/// - `owner_id` references exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    /// Stable identifier.
    pub id: PieceId,
    /// Short human-readable title.
    pub title: String,
    /// Free-text kind of ware (mug, bowl, vase, ...), the `type` column.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-text description.
    pub details: String,
    /// Optional free-text status note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Scheduling priority.
    pub priority: Priority,
    /// Current workflow position.
    pub stage: Stage,
    /// Hidden from active views when set.
    pub archived: bool,
    /// Pinned by the owner.
    pub starred: bool,
    /// Owning user.
    pub owner_id: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Touched by every update.
    pub last_updated: DateTime<Utc>,
    /// Optional target date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Fields required to create a piece. Validated before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPiece {
    /// Short human-readable title.
    pub title: String,
    /// Free-text kind of ware.
    pub kind: String,
    /// Free-text description; may be empty.
    pub details: String,
    /// Optional free-text status note.
    pub status: Option<String>,
    /// Scheduling priority.
    pub priority: Priority,
    /// Initial workflow position.
    pub stage: Stage,
    /// Owning user.
    pub owner_id: UserId,
    /// Optional target date.
    pub due_date: Option<DateTime<Utc>>,
}

impl NewPiece {
    /// Check field invariants before the piece is persisted.
    pub fn validate(&self) -> Result<(), PieceValidationError> {
        validate_title(&self.title)?;
        validate_kind(&self.kind)?;
        Ok(())
    }
}

/// Partial update for a piece. `None` fields are left unchanged.
///
/// `last_updated` is always touched by the service; it is not part of the
/// patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PiecePatch {
    /// Replacement title.
    pub title: Option<String>,
    /// Replacement kind.
    pub kind: Option<String>,
    /// Replacement description.
    pub details: Option<String>,
    /// Replacement status note.
    pub status: Option<String>,
    /// Replacement priority.
    pub priority: Option<Priority>,
    /// Replacement workflow position.
    pub stage: Option<Stage>,
    /// Replacement archived flag.
    pub archived: Option<bool>,
    /// Replacement starred flag.
    pub starred: Option<bool>,
    /// Replacement target date.
    pub due_date: Option<DateTime<Utc>>,
}

impl PiecePatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Check invariants on the fields present in the patch.
    pub fn validate(&self) -> Result<(), PieceValidationError> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(kind) = &self.kind {
            validate_kind(kind)?;
        }
        Ok(())
    }
}
