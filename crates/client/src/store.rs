//! Reactive in-memory store of pieces with optimistic mutations.
//!
//! Mutations apply to the local state first so the UI updates immediately,
//! then call the API. On success the server's copy replaces the optimistic
//! one; on failure the previous state is restored and the error returned.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use uuid::Uuid;

use crate::api::PiecesApi;
use crate::error::ClientError;
use crate::types::{Piece, PieceDraft, PieceUpdate, PieceWithStages, Priority, Stage};

/// Shared store of one owner's pieces.
///
/// Subscribers receive the full piece list on every change through a
/// [`watch`] channel, newest first like the server's listing.
pub struct PiecesStore {
    api: Arc<dyn PiecesApi>,
    state: watch::Sender<Vec<Piece>>,
}

fn optimistic_piece(draft: &PieceDraft) -> Piece {
    let now = Utc::now();
    Piece {
        id: Uuid::new_v4(),
        title: draft.title.clone(),
        kind: draft.kind.clone(),
        details: draft.details.clone().unwrap_or_default(),
        status: draft.status.clone(),
        priority: draft.priority.unwrap_or(Priority::Medium),
        stage: draft.stage.unwrap_or(Stage::Ideas),
        archived: false,
        starred: false,
        owner_id: draft.owner_id,
        created_at: now,
        last_updated: now,
        due_date: draft.due_date,
    }
}

fn apply_update(piece: &mut Piece, update: &PieceUpdate) {
    if let Some(title) = &update.title {
        piece.title = title.clone();
    }
    if let Some(kind) = &update.kind {
        piece.kind = kind.clone();
    }
    if let Some(details) = &update.details {
        piece.details = details.clone();
    }
    if let Some(status) = &update.status {
        piece.status = Some(status.clone());
    }
    if let Some(priority) = update.priority {
        piece.priority = priority;
    }
    if let Some(stage) = update.stage {
        piece.stage = stage;
    }
    if let Some(archived) = update.archived {
        piece.archived = archived;
    }
    if let Some(starred) = update.starred {
        piece.starred = starred;
    }
    if let Some(due_date) = update.due_date {
        piece.due_date = Some(due_date);
    }
    piece.last_updated = Utc::now();
}

impl PiecesStore {
    /// Build an empty store over the given API.
    #[must_use]
    pub fn new(api: Arc<dyn PiecesApi>) -> Self {
        let (state, _) = watch::channel(Vec::new());
        Self { api, state }
    }

    /// Subscribe to state changes. The receiver starts at the current state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Piece>> {
        self.state.subscribe()
    }

    /// Snapshot of the current piece list.
    #[must_use]
    pub fn pieces(&self) -> Vec<Piece> {
        self.state.borrow().clone()
    }

    fn publish(&self, pieces: Vec<Piece>) {
        let _ = self.state.send_replace(pieces);
    }

    /// Replace the local state with the server's listing for the owner.
    pub async fn refresh(
        &self,
        owner_id: &Uuid,
        include_archived: bool,
    ) -> Result<(), ClientError> {
        let pieces = self.api.list(owner_id, include_archived).await?;
        self.publish(pieces);
        Ok(())
    }

    /// Create a piece, showing a local placeholder until the server answers.
    pub async fn create(&self, draft: PieceDraft) -> Result<PieceWithStages, ClientError> {
        let snapshot = self.pieces();
        let placeholder = optimistic_piece(&draft);
        let placeholder_id = placeholder.id;

        let mut next = snapshot.clone();
        next.insert(0, placeholder);
        self.publish(next);

        match self.api.create(&draft).await {
            Ok(created) => {
                let server_copy = created.piece.clone();
                self.state.send_modify(|pieces| {
                    if let Some(slot) = pieces.iter_mut().find(|piece| piece.id == placeholder_id)
                    {
                        *slot = server_copy;
                    }
                });
                Ok(created)
            }
            Err(error) => {
                self.publish(snapshot);
                Err(error)
            }
        }
    }

    /// Update a piece, applying the change locally first.
    pub async fn update(&self, id: &Uuid, update: PieceUpdate) -> Result<Piece, ClientError> {
        let snapshot = self.pieces();
        if !snapshot.iter().any(|piece| piece.id == *id) {
            return Err(ClientError::NotFound);
        }

        self.state.send_modify(|pieces| {
            if let Some(piece) = pieces.iter_mut().find(|piece| piece.id == *id) {
                apply_update(piece, &update);
            }
        });

        match self.api.update(id, &update).await {
            Ok(server_copy) => {
                let reconciled = server_copy.clone();
                self.state.send_modify(|pieces| {
                    if let Some(slot) = pieces.iter_mut().find(|piece| piece.id == *id) {
                        *slot = reconciled;
                    }
                });
                Ok(server_copy)
            }
            Err(error) => {
                self.publish(snapshot);
                Err(error)
            }
        }
    }

    /// Delete a piece, removing it locally first.
    pub async fn delete(&self, id: &Uuid) -> Result<(), ClientError> {
        let snapshot = self.pieces();
        if !snapshot.iter().any(|piece| piece.id == *id) {
            return Err(ClientError::NotFound);
        }

        self.state
            .send_modify(|pieces| pieces.retain(|piece| piece.id != *id));

        match self.api.delete(id).await {
            Ok(()) => Ok(()),
            Err(error) => {
                self.publish(snapshot);
                Err(error)
            }
        }
    }
}
