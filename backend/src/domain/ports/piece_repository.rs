//! Port for piece persistence.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::piece::{NewPiece, Piece, PieceId, PiecePatch};
use crate::domain::user::UserId;

/// Errors raised by piece repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PieceRepositoryError {
    /// Repository connection could not be established.
    #[error("piece repository connection failed: {message}")]
    Connection {
        /// Adapter-level detail.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("piece repository query failed: {message}")]
    Query {
        /// Adapter-level detail.
        message: String,
    },
}

impl PieceRepositoryError {
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

/// Port for piece storage and retrieval.
///
/// Lookups return `Ok(None)` for unknown identifiers; mutations report
/// whether a row was hit so services can surface not-found uniformly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PieceRepository: Send + Sync {
    /// Persist a new piece and return the stored row.
    async fn insert(&self, id: PieceId, piece: &NewPiece) -> Result<Piece, PieceRepositoryError>;

    /// Fetch one piece by id.
    async fn find_by_id(&self, id: &PieceId) -> Result<Option<Piece>, PieceRepositoryError>;

    /// List pieces for an owner, newest first. Archived pieces are included
    /// only when `include_archived` is set.
    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        include_archived: bool,
    ) -> Result<Vec<Piece>, PieceRepositoryError>;

    /// Apply a patch, touching `last_updated`. Returns the updated row, or
    /// `None` when the piece does not exist.
    async fn update(
        &self,
        id: &PieceId,
        patch: &PiecePatch,
    ) -> Result<Option<Piece>, PieceRepositoryError>;

    /// Delete a piece (stage rows cascade). Returns whether a row was hit.
    async fn delete(&self, id: &PieceId) -> Result<bool, PieceRepositoryError>;
}

/// In-memory implementation backing tests and the no-database fallback.
#[derive(Debug, Default)]
pub struct InMemoryPieceRepository {
    pieces: Mutex<HashMap<PieceId, Piece>>,
}

impl InMemoryPieceRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_patch(piece: &mut Piece, patch: &PiecePatch) {
    if let Some(title) = &patch.title {
        piece.title = title.clone();
    }
    if let Some(kind) = &patch.kind {
        piece.kind = kind.clone();
    }
    if let Some(details) = &patch.details {
        piece.details = details.clone();
    }
    if let Some(status) = &patch.status {
        piece.status = Some(status.clone());
    }
    if let Some(priority) = patch.priority {
        piece.priority = priority;
    }
    if let Some(stage) = patch.stage {
        piece.stage = stage;
    }
    if let Some(archived) = patch.archived {
        piece.archived = archived;
    }
    if let Some(starred) = patch.starred {
        piece.starred = starred;
    }
    if let Some(due_date) = patch.due_date {
        piece.due_date = Some(due_date);
    }
    piece.last_updated = Utc::now();
}

#[async_trait]
impl PieceRepository for InMemoryPieceRepository {
    async fn insert(&self, id: PieceId, piece: &NewPiece) -> Result<Piece, PieceRepositoryError> {
        let now = Utc::now();
        let stored = Piece {
            id,
            title: piece.title.clone(),
            kind: piece.kind.clone(),
            details: piece.details.clone(),
            status: piece.status.clone(),
            priority: piece.priority,
            stage: piece.stage,
            archived: false,
            starred: false,
            owner_id: piece.owner_id,
            created_at: now,
            last_updated: now,
            due_date: piece.due_date,
        };
        self.pieces
            .lock()
            .map_err(|_| PieceRepositoryError::query("piece store poisoned"))?
            .insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &PieceId) -> Result<Option<Piece>, PieceRepositoryError> {
        Ok(self
            .pieces
            .lock()
            .map_err(|_| PieceRepositoryError::query("piece store poisoned"))?
            .get(id)
            .cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        include_archived: bool,
    ) -> Result<Vec<Piece>, PieceRepositoryError> {
        let mut pieces: Vec<Piece> = self
            .pieces
            .lock()
            .map_err(|_| PieceRepositoryError::query("piece store poisoned"))?
            .values()
            .filter(|piece| piece.owner_id == *owner_id)
            .filter(|piece| include_archived || !piece.archived)
            .cloned()
            .collect();
        pieces.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pieces)
    }

    async fn update(
        &self,
        id: &PieceId,
        patch: &PiecePatch,
    ) -> Result<Option<Piece>, PieceRepositoryError> {
        let mut pieces = self
            .pieces
            .lock()
            .map_err(|_| PieceRepositoryError::query("piece store poisoned"))?;
        Ok(pieces.get_mut(id).map(|piece| {
            apply_patch(piece, patch);
            piece.clone()
        }))
    }

    async fn delete(&self, id: &PieceId) -> Result<bool, PieceRepositoryError> {
        Ok(self
            .pieces
            .lock()
            .map_err(|_| PieceRepositoryError::query("piece store poisoned"))?
            .remove(id)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stage::{Priority, Stage};
    use rstest::rstest;

    fn draft(owner_id: UserId) -> NewPiece {
        NewPiece {
            title: "Tea bowl".to_owned(),
            kind: "bowl".to_owned(),
            details: String::new(),
            status: None,
            priority: Priority::Medium,
            stage: Stage::Ideas,
            owner_id,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let repo = InMemoryPieceRepository::new();
        let id = PieceId::random();
        let owner = UserId::random();

        let stored = repo.insert(id, &draft(owner)).await.expect("insert");
        assert_eq!(stored.id, id);
        assert!(!stored.archived);

        let found = repo.find_by_id(&id).await.expect("find").expect("present");
        assert_eq!(found.title, "Tea bowl");
    }

    #[tokio::test]
    async fn list_by_owner_excludes_archived_by_default() {
        let repo = InMemoryPieceRepository::new();
        let owner = UserId::random();
        let kept = PieceId::random();
        let archived = PieceId::random();
        repo.insert(kept, &draft(owner)).await.expect("insert");
        repo.insert(archived, &draft(owner)).await.expect("insert");
        repo.update(
            &archived,
            &PiecePatch {
                archived: Some(true),
                ..PiecePatch::default()
            },
        )
        .await
        .expect("archive");

        let visible = repo.list_by_owner(&owner, false).await.expect("list");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, kept);

        let all = repo.list_by_owner(&owner, true).await.expect("list all");
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn update_touches_last_updated() {
        let repo = InMemoryPieceRepository::new();
        let id = PieceId::random();
        let stored = repo
            .insert(id, &draft(UserId::random()))
            .await
            .expect("insert");

        let updated = repo
            .update(
                &id,
                &PiecePatch {
                    stage: Some(Stage::Throw),
                    ..PiecePatch::default()
                },
            )
            .await
            .expect("update")
            .expect("present");

        assert_eq!(updated.stage, Stage::Throw);
        assert!(updated.last_updated >= stored.last_updated);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_rows_are_reported_not_errored() {
        let repo = InMemoryPieceRepository::new();
        let id = PieceId::random();

        assert!(repo.find_by_id(&id).await.expect("find").is_none());
        assert!(repo
            .update(&id, &PiecePatch::default())
            .await
            .expect("update")
            .is_none());
        assert!(!repo.delete(&id).await.expect("delete"));
    }
}
