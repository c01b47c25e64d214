//! Port for stage-detail persistence.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::piece::PieceId;
use crate::domain::stage::Stage;
use crate::domain::stage_detail::{StageDetail, StageDetailId, StageDetailPatch};

/// Errors raised by stage-detail repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageDetailRepositoryError {
    /// Repository connection could not be established.
    #[error("stage detail repository connection failed: {message}")]
    Connection {
        /// Adapter-level detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("stage detail repository query failed: {message}")]
    Query {
        /// Adapter-level detail.
        message: String,
    },
}

impl StageDetailRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for the per-stage rows attached to each piece.
///
/// Every piece owns exactly one row per stage; the full set is created when
/// the piece is created and removed when the piece is deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StageDetailRepository: Send + Sync {
    /// Insert one empty row per stage for a freshly created piece.
    async fn insert_defaults(
        &self,
        piece_id: PieceId,
    ) -> Result<Vec<StageDetail>, StageDetailRepositoryError>;

    /// Fetch every stage row belonging to a piece.
    async fn list_by_piece(
        &self,
        piece_id: &PieceId,
    ) -> Result<Vec<StageDetail>, StageDetailRepositoryError>;

    /// Apply a patch to one `(piece, stage)` row, touching `updated_at`.
    /// Returns `None` when the row does not exist.
    async fn update(
        &self,
        piece_id: &PieceId,
        stage: Stage,
        patch: &StageDetailPatch,
    ) -> Result<Option<StageDetail>, StageDetailRepositoryError>;

    /// Remove every stage row belonging to a piece, returning the count.
    async fn delete_by_piece(&self, piece_id: &PieceId)
        -> Result<u64, StageDetailRepositoryError>;
}

fn default_row(piece_id: PieceId, stage: Stage) -> StageDetail {
    let now = Utc::now();
    StageDetail {
        id: StageDetailId::random(),
        piece_id,
        stage,
        notes: None,
        image_url: None,
        weight: None,
        glazes: None,
        created_at: now,
        updated_at: now,
    }
}

fn apply_patch(detail: &mut StageDetail, patch: &StageDetailPatch) {
    if let Some(notes) = &patch.notes {
        detail.notes = Some(notes.clone());
    }
    if let Some(image_url) = &patch.image_url {
        detail.image_url = Some(image_url.clone());
    }
    if let Some(weight) = patch.weight {
        detail.weight = Some(weight);
    }
    if let Some(glazes) = &patch.glazes {
        detail.glazes = Some(glazes.clone());
    }
    detail.updated_at = Utc::now();
}

/// In-memory implementation backing tests and the no-database fallback.
#[derive(Debug, Default)]
pub struct InMemoryStageDetailRepository {
    rows: Mutex<HashMap<(PieceId, Stage), StageDetail>>,
}

impl InMemoryStageDetailRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StageDetailRepository for InMemoryStageDetailRepository {
    async fn insert_defaults(
        &self,
        piece_id: PieceId,
    ) -> Result<Vec<StageDetail>, StageDetailRepositoryError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StageDetailRepositoryError::query("stage detail store poisoned"))?;
        let mut inserted = Vec::with_capacity(Stage::ALL.len());
        for stage in Stage::ALL {
            let row = default_row(piece_id, stage);
            rows.insert((piece_id, stage), row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn list_by_piece(
        &self,
        piece_id: &PieceId,
    ) -> Result<Vec<StageDetail>, StageDetailRepositoryError> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| StageDetailRepositoryError::query("stage detail store poisoned"))?;
        Ok(Stage::ALL
            .into_iter()
            .filter_map(|stage| rows.get(&(*piece_id, stage)).cloned())
            .collect())
    }

    async fn update(
        &self,
        piece_id: &PieceId,
        stage: Stage,
        patch: &StageDetailPatch,
    ) -> Result<Option<StageDetail>, StageDetailRepositoryError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StageDetailRepositoryError::query("stage detail store poisoned"))?;
        Ok(rows.get_mut(&(*piece_id, stage)).map(|row| {
            apply_patch(row, patch);
            row.clone()
        }))
    }

    async fn delete_by_piece(
        &self,
        piece_id: &PieceId,
    ) -> Result<u64, StageDetailRepositoryError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StageDetailRepositoryError::query("stage detail store poisoned"))?;
        let before = rows.len();
        rows.retain(|(owner, _), _| owner != piece_id);
        Ok((before - rows.len()) as u64)
    }
}
