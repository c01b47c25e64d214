//! Piece workflows spanning the piece and stage-detail ports.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::piece::{NewPiece, Piece, PieceId, PiecePatch};
use crate::domain::ports::{
    PieceRepository, PieceRepositoryError, StageDetailRepository, StageDetailRepositoryError,
};
use crate::domain::stage::Stage;
use crate::domain::stage_detail::{PieceWithStages, StageDetail, StageDetailPatch};
use crate::domain::user::UserId;

fn map_piece_repo_error(error: PieceRepositoryError) -> Error {
    match error {
        PieceRepositoryError::Connection { .. } => {
            Error::service_unavailable("piece storage is unavailable")
        }
        PieceRepositoryError::Query { message } => Error::internal(message),
    }
}

fn map_stage_repo_error(error: StageDetailRepositoryError) -> Error {
    match error {
        StageDetailRepositoryError::Connection { .. } => {
            Error::service_unavailable("stage detail storage is unavailable")
        }
        StageDetailRepositoryError::Query { message } => Error::internal(message),
    }
}

/// Orchestrates piece lifecycle operations.
///
/// Creating a piece also creates its six stage rows; the two inserts are not
/// atomic, so a failed stage insert rolls the piece back by deleting it.
pub struct PieceService {
    pieces: Arc<dyn PieceRepository>,
    stage_details: Arc<dyn StageDetailRepository>,
}

impl PieceService {
    /// Build a service over the given ports.
    pub fn new(
        pieces: Arc<dyn PieceRepository>,
        stage_details: Arc<dyn StageDetailRepository>,
    ) -> Self {
        Self {
            pieces,
            stage_details,
        }
    }

    /// Create a piece together with one empty stage row per stage.
    pub async fn create(&self, draft: NewPiece) -> Result<PieceWithStages, Error> {
        draft
            .validate()
            .map_err(|error| Error::invalid_request(error.to_string()))?;

        let id = PieceId::random();
        let piece = self
            .pieces
            .insert(id, &draft)
            .await
            .map_err(map_piece_repo_error)?;

        let details = match self.stage_details.insert_defaults(id).await {
            Ok(details) => details,
            Err(error) => {
                tracing::error!(piece_id = %id, %error, "stage rows failed; rolling piece back");
                if let Err(cleanup) = self.pieces.delete(&id).await {
                    tracing::error!(piece_id = %id, error = %cleanup, "piece rollback failed");
                }
                return Err(map_stage_repo_error(error));
            }
        };

        Ok(PieceWithStages::assemble(piece, details))
    }

    /// Fetch a piece merged with its stage rows.
    pub async fn get_with_stages(&self, id: &PieceId) -> Result<PieceWithStages, Error> {
        let piece = self
            .pieces
            .find_by_id(id)
            .await
            .map_err(map_piece_repo_error)?
            .ok_or_else(|| Error::not_found(format!("piece {id} not found")))?;
        let details = self
            .stage_details
            .list_by_piece(id)
            .await
            .map_err(map_stage_repo_error)?;
        Ok(PieceWithStages::assemble(piece, details))
    }

    /// List an owner's pieces, newest first.
    pub async fn list_for_owner(
        &self,
        owner_id: &UserId,
        include_archived: bool,
    ) -> Result<Vec<Piece>, Error> {
        self.pieces
            .list_by_owner(owner_id, include_archived)
            .await
            .map_err(map_piece_repo_error)
    }

    /// Apply a patch to a piece.
    pub async fn update(&self, id: &PieceId, patch: PiecePatch) -> Result<Piece, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request("no fields to update"));
        }
        patch
            .validate()
            .map_err(|error| Error::invalid_request(error.to_string()))?;
        self.pieces
            .update(id, &patch)
            .await
            .map_err(map_piece_repo_error)?
            .ok_or_else(|| Error::not_found(format!("piece {id} not found")))
    }

    /// Apply a patch to one stage row of a piece.
    pub async fn update_stage_detail(
        &self,
        piece_id: &PieceId,
        stage: Stage,
        patch: StageDetailPatch,
    ) -> Result<StageDetail, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_request("no fields to update"));
        }
        patch
            .validate()
            .map_err(|error| Error::invalid_request(error.to_string()))?;
        self.stage_details
            .update(piece_id, stage, &patch)
            .await
            .map_err(map_stage_repo_error)?
            .ok_or_else(|| Error::not_found(format!("piece {piece_id} not found")))
    }

    /// Delete a piece and its stage rows.
    pub async fn delete(&self, id: &PieceId) -> Result<(), Error> {
        self.stage_details
            .delete_by_piece(id)
            .await
            .map_err(map_stage_repo_error)?;
        let deleted = self.pieces.delete(id).await.map_err(map_piece_repo_error)?;
        if deleted {
            Ok(())
        } else {
            Err(Error::not_found(format!("piece {id} not found")))
        }
    }
}
