//! PostgreSQL-backed `PieceRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::piece::{NewPiece, Piece, PieceId, PiecePatch};
use crate::domain::ports::{PieceRepository, PieceRepositoryError};
use crate::domain::stage::{Priority, Stage};
use crate::domain::user::UserId;

use super::models::{NewPieceRow, PieceChangeset, PieceRow};
use super::pool::{DbPool, PoolError};
use super::schema::pieces;

/// Diesel-backed implementation of the `PieceRepository` port.
#[derive(Clone)]
pub struct DieselPieceRepository {
    pool: DbPool,
}

impl DieselPieceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PieceRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PieceRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PieceRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PieceRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => PieceRepositoryError::query("record not found"),
        _ => PieceRepositoryError::query("database error"),
    }
}

/// Convert a database row to a domain piece.
///
/// Unrecognised stage or priority values are logged and defaulted rather
/// than failing the whole read.
pub(crate) fn row_to_piece(row: PieceRow) -> Piece {
    let stage = row.stage.parse().unwrap_or_else(|_| {
        tracing::warn!(value = row.stage, piece_id = %row.id, "unrecognised stage, defaulting to ideas");
        Stage::Ideas
    });
    let priority = row.priority.parse().unwrap_or_else(|_| {
        tracing::warn!(value = row.priority, piece_id = %row.id, "unrecognised priority, defaulting to medium");
        Priority::Medium
    });

    Piece {
        id: PieceId::from_uuid(row.id),
        title: row.title,
        kind: row.kind,
        details: row.details,
        status: row.status,
        priority,
        stage,
        archived: row.archived,
        starred: row.starred,
        owner_id: UserId::from_uuid(row.owner_id),
        created_at: row.created_at,
        last_updated: row.last_updated,
        due_date: row.due_date,
    }
}

#[async_trait]
impl PieceRepository for DieselPieceRepository {
    async fn insert(&self, id: PieceId, piece: &NewPiece) -> Result<Piece, PieceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewPieceRow {
            id: *id.as_uuid(),
            title: &piece.title,
            kind: &piece.kind,
            details: &piece.details,
            status: piece.status.as_deref(),
            priority: piece.priority.as_str(),
            stage: piece.stage.as_str(),
            owner_id: *piece.owner_id.as_uuid(),
            due_date: piece.due_date,
        };

        let row: PieceRow = diesel::insert_into(pieces::table)
            .values(&new_row)
            .returning(PieceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row_to_piece(row))
    }

    async fn find_by_id(&self, id: &PieceId) -> Result<Option<Piece>, PieceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let result: Option<PieceRow> = pieces::table
            .filter(pieces::id.eq(id.as_uuid()))
            .select(PieceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(result.map(row_to_piece))
    }

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        include_archived: bool,
    ) -> Result<Vec<Piece>, PieceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = pieces::table
            .filter(pieces::owner_id.eq(owner_id.as_uuid()))
            .into_boxed();
        if !include_archived {
            query = query.filter(pieces::archived.eq(false));
        }

        let rows: Vec<PieceRow> = query
            .order(pieces::created_at.desc())
            .select(PieceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_piece).collect())
    }

    async fn update(
        &self,
        id: &PieceId,
        patch: &PiecePatch,
    ) -> Result<Option<Piece>, PieceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = PieceChangeset {
            title: patch.title.as_deref(),
            kind: patch.kind.as_deref(),
            details: patch.details.as_deref(),
            status: patch.status.as_deref(),
            priority: patch.priority.map(|p| p.as_str()),
            stage: patch.stage.map(|s| s.as_str()),
            archived: patch.archived,
            starred: patch.starred,
            due_date: patch.due_date,
            last_updated: Utc::now(),
        };

        let row: Option<PieceRow> = diesel::update(pieces::table)
            .filter(pieces::id.eq(id.as_uuid()))
            .set(&changeset)
            .returning(PieceRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_piece))
    }

    async fn delete(&self, id: &PieceId) -> Result<bool, PieceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(pieces::table.filter(pieces::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
