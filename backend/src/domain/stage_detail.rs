//! Per-stage metadata attached to a piece, and the nested assembly of a
//! piece with all six of its stage rows.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::piece::{Piece, PieceId};
use super::stage::Stage;

/// Stable stage-detail row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct StageDetailId(Uuid);

impl StageDetailId {
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

impl fmt::Display for StageDetailId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One row of per-stage metadata for a piece.
///
/// All six rows are created alongside the piece and cascade-deleted with it.
/// `weight` is meaningful for the `throw` stage and `glazes` for the `glaze`
/// stage; the columns exist on every row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageDetail {
    /// Stable identifier.
    pub id: StageDetailId,
    /// Owning piece.
    pub piece_id: PieceId,
    /// Which of the six stages this row records.
    pub stage: Stage,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Reference into the image blob store.
    pub image_url: Option<String>,
    /// Thrown weight in grams.
    pub weight: Option<i32>,
    /// Glaze descriptions.
    pub glazes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Touched by every update.
    pub updated_at: DateTime<Utc>,
}

/// Validation errors for stage-detail updates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageDetailValidationError {
    /// Weight must be a non-negative number of grams.
    #[error("weight must not be negative")]
    NegativeWeight,
}

/// Partial update for one `(piece, stage)` row. `None` fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageDetailPatch {
    /// Replacement notes.
    pub notes: Option<String>,
    /// Replacement image reference.
    pub image_url: Option<String>,
    /// Replacement thrown weight in grams.
    pub weight: Option<i32>,
    /// Replacement glaze descriptions.
    pub glazes: Option<String>,
}

impl StageDetailPatch {
    /// True when the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Check invariants on the fields present in the patch.
    pub fn validate(&self) -> Result<(), StageDetailValidationError> {
        if matches!(self.weight, Some(w) if w < 0) {
            return Err(StageDetailValidationError::NegativeWeight);
        }
        Ok(())
    }
}

/// Stage entry in the assembled piece view.
///
/// Absent columns surface as the same defaults the original records started
/// from: empty strings for text, `null` for weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageEntry {
    /// Free-text notes; empty when never written.
    pub notes: String,
    /// Image reference; empty when never written.
    pub image_url: String,
    /// Thrown weight in grams.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
    /// Glaze descriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glazes: Option<String>,
}

impl From<StageDetail> for StageEntry {
    fn from(detail: StageDetail) -> Self {
        Self {
            notes: detail.notes.unwrap_or_default(),
            image_url: detail.image_url.unwrap_or_default(),
            weight: detail.weight,
            glazes: detail.glazes,
        }
    }
}

/// The six stage entries of a piece, keyed by stage name on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
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

impl StageEntries {
    fn slot(&mut self, stage: Stage) -> &mut StageEntry {
        match stage {
            Stage::Ideas => &mut self.ideas,
            Stage::Throw => &mut self.throw,
            Stage::Trim => &mut self.trim,
            Stage::Bisque => &mut self.bisque,
            Stage::Glaze => &mut self.glaze,
            Stage::Finished => &mut self.finished,
        }
    }
}

/// A piece merged with its stage rows into one nested object.
///
/// This is the response shape of the piece-detail endpoint. Rows missing
/// from the database are tolerated and presented as default entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PieceWithStages {
    /// The piece row itself.
    #[serde(flatten)]
    pub piece: Piece,
    /// Stage entries keyed by stage name.
    pub stage_details: StageEntries,
}

impl PieceWithStages {
    /// Merge a piece with its dependent stage rows.
    ///
    /// Rows whose `piece_id` does not match are ignored; a duplicate stage
    /// keeps the later row (rows are expected unique per stage).
    pub fn assemble(piece: Piece, details: Vec<StageDetail>) -> Self {
        let mut stage_details = StageEntries::default();
        for detail in details {
            if detail.piece_id != piece.id {
                continue;
            }
            let stage = detail.stage;
            *stage_details.slot(stage) = StageEntry::from(detail);
        }
        Self {
            piece,
            stage_details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stage::Priority;
    use crate::domain::user::UserId;
    use rstest::rstest;

    fn piece() -> Piece {
        Piece {
            id: PieceId::random(),
            title: "Teapot".to_owned(),
            kind: "teapot".to_owned(),
            details: String::new(),
            status: None,
            priority: Priority::Low,
            stage: Stage::Trim,
            archived: false,
            starred: false,
            owner_id: UserId::random(),
            created_at: Utc::now(),
            last_updated: Utc::now(),
            due_date: None,
        }
    }

    fn detail(piece_id: PieceId, stage: Stage) -> StageDetail {
        StageDetail {
            id: StageDetailId::random(),
            piece_id,
            stage,
            notes: Some(format!("{stage} notes")),
            image_url: None,
            weight: (stage == Stage::Throw).then_some(420),
            glazes: (stage == Stage::Glaze).then(|| "tenmoku over shino".to_owned()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn assembles_all_six_stages() {
        let piece = piece();
        let details = Stage::ALL
            .into_iter()
            .map(|stage| detail(piece.id, stage))
            .collect();

        let assembled = PieceWithStages::assemble(piece, details);

        assert_eq!(assembled.stage_details.throw.weight, Some(420));
        assert_eq!(
            assembled.stage_details.glaze.glazes.as_deref(),
            Some("tenmoku over shino")
        );
        assert_eq!(assembled.stage_details.bisque.notes, "bisque notes");
    }

    #[rstest]
    fn missing_rows_surface_as_defaults() {
        let piece = piece();
        let details = vec![detail(piece.id, Stage::Throw)];

        let assembled = PieceWithStages::assemble(piece, details);

        assert_eq!(assembled.stage_details.throw.weight, Some(420));
        assert_eq!(assembled.stage_details.glaze, StageEntry::default());
        assert_eq!(assembled.stage_details.finished.notes, "");
    }

    #[rstest]
    fn rows_for_other_pieces_are_ignored() {
        let piece = piece();
        let foreign = detail(PieceId::random(), Stage::Ideas);

        let assembled = PieceWithStages::assemble(piece, vec![foreign]);

        assert_eq!(assembled.stage_details.ideas, StageEntry::default());
    }

    #[rstest]
    fn assembled_view_flattens_piece_fields() {
        let piece = piece();
        let id = piece.id;
        let assembled = PieceWithStages::assemble(piece, Vec::new());

        let value = serde_json::to_value(&assembled).expect("serialise");
        assert_eq!(value.get("id"), Some(&serde_json::json!(id)));
        assert!(value.get("stageDetails").is_some());
        assert!(value["stageDetails"].get("bisque").is_some());
    }

    #[rstest]
    fn negative_weight_is_rejected() {
        let patch = StageDetailPatch {
            weight: Some(-1),
            ..StageDetailPatch::default()
        };
        assert_eq!(
            patch.validate().expect_err("negative weight"),
            StageDetailValidationError::NegativeWeight
        );
    }
}
