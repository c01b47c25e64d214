//! Wire types shared with the backend.
//!
//! These mirror the server's JSON exactly (camelCase, `type` for the kind
//! column) so a deserialised piece can be sent back unmodified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Workflow stage of a piece, in production order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Concept only.
    Ideas,
    /// On the wheel.
    Throw,
    /// Leather-hard trimming.
    Trim,
    /// First firing.
    Bisque,
    /// Glaze application.
    Glaze,
    /// Out of the glaze kiln.
    Finished,
}

impl Stage {
    /// Wire name of the stage, as used in URLs and JSON keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ideas => "ideas",
            Self::Throw => "throw",
            Self::Trim => "trim",
            Self::Bisque => "bisque",
            Self::Glaze => "glaze",
            Self::Finished => "finished",
        }
    }
}

/// Scheduling priority of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Work on this next.
    High,
    /// Default.
    Medium,
    /// Back of the queue.
    Low,
}

/// A tracked pottery piece as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    /// Stable identifier.
    pub id: Uuid,
    /// Short human-readable title.
    pub title: String,
    /// Kind of ware (mug, bowl, vase, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-text description.
    pub details: String,
    /// Optional free-text status note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
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
    pub owner_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Touched by every update.
    pub last_updated: DateTime<Utc>,
    /// Optional target date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Per-stage notes attached to a piece.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEntry {
    /// Free-text notes; empty when never written.
    pub notes: String,
    /// Image reference; empty when never written.
    pub image_url: String,
    /// Thrown weight in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    /// Glaze descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glazes: Option<String>,
}

/// The six stage entries of a piece, keyed by stage name on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageEntries {
    /// Entry for the `ideas` stage.
    pub ideas: StageEntry,
    /// Entry for the `throw` stage.
    pub throw: StageEntry,
    /// Entry for the `trim` stage.
    pub trim: StageEntry,
    /// Entry for the `bisque` stage.
    pub bisque: StageEntry,
    /// Entry for the `glaze` stage.
    pub glaze: StageEntry,
    /// Entry for the `finished` stage.
    pub finished: StageEntry,
}

/// A piece merged with its stage entries, the detail-endpoint shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceWithStages {
    /// The piece itself.
    #[serde(flatten)]
    pub piece: Piece,
    /// Stage entries keyed by stage name.
    pub stage_details: StageEntries,
}

/// Fields for creating a piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceDraft {
    /// Short title.
    pub title: String,
    /// Kind of ware.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Free-text status note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Priority; the server defaults to `medium`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Initial stage; the server defaults to `ideas`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Owning user.
    pub owner_id: Uuid,
    /// Optional target date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl PieceDraft {
    /// Minimal draft with the required fields only.
    #[must_use]
    pub fn new(title: impl Into<String>, kind: impl Into<String>, owner_id: Uuid) -> Self {
        Self {
            title: title.into(),
            kind: kind.into(),
            details: None,
            status: None,
            priority: None,
            stage: None,
            owner_id,
            due_date: None,
        }
    }
}

/// Partial update for a piece. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceUpdate {
    /// Replacement title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Replacement kind.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Replacement description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Replacement status note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Replacement priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Replacement stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    /// Replacement archived flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    /// Replacement starred flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,
    /// Replacement target date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

impl PieceUpdate {
    /// True when no field is set; the server rejects empty updates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Partial update for one stage entry of a piece.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDetailUpdate {
    /// Replacement notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Replacement image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Replacement thrown weight in grams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    /// Replacement glaze descriptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glazes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Stage::Ideas, "ideas")]
    #[case(Stage::Bisque, "bisque")]
    #[case(Stage::Finished, "finished")]
    fn stage_names_match_the_wire(#[case] stage: Stage, #[case] expected: &str) {
        assert_eq!(stage.as_str(), expected);
        assert_eq!(
            serde_json::to_value(stage).expect("serialise stage"),
            serde_json::Value::String(expected.to_owned())
        );
    }

    #[rstest]
    fn drafts_serialise_the_kind_as_type() {
        let draft = PieceDraft::new("Teapot", "teapot", Uuid::new_v4());
        let value = serde_json::to_value(&draft).expect("serialise draft");
        assert_eq!(value["type"], "teapot");
        assert!(value.get("kind").is_none());
        // Unset optionals stay off the wire so the server applies defaults.
        assert!(value.get("priority").is_none());
    }

    #[rstest]
    fn empty_updates_are_detectable() {
        assert!(PieceUpdate::default().is_empty());
        let update = PieceUpdate {
            starred: Some(true),
            ..PieceUpdate::default()
        };
        assert!(!update.is_empty());
    }

    #[rstest]
    fn pieces_round_trip_through_the_detail_shape() {
        let raw = serde_json::json!({
            "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
            "title": "Tall mug",
            "type": "mug",
            "details": "",
            "priority": "medium",
            "stage": "throw",
            "archived": false,
            "starred": true,
            "ownerId": "11111111-1111-4111-8111-111111111111",
            "createdAt": "2025-06-01T10:00:00Z",
            "lastUpdated": "2025-06-02T10:00:00Z",
            "stageDetails": {
                "ideas": {"notes": "sketched", "imageUrl": ""},
                "throw": {"notes": "", "imageUrl": "", "weight": 420},
                "trim": {"notes": "", "imageUrl": ""},
                "bisque": {"notes": "", "imageUrl": ""},
                "glaze": {"notes": "", "imageUrl": ""},
                "finished": {"notes": "", "imageUrl": ""}
            }
        });
        let detail: PieceWithStages = serde_json::from_value(raw).expect("deserialise detail");
        assert_eq!(detail.piece.stage, Stage::Throw);
        assert_eq!(detail.stage_details.throw.weight, Some(420));
        assert_eq!(detail.stage_details.ideas.notes, "sketched");
        assert_eq!(detail.piece.status, None);
    }
}
