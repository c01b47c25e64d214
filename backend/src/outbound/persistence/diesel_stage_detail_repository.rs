//! PostgreSQL-backed `StageDetailRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::piece::PieceId;
use crate::domain::ports::{StageDetailRepository, StageDetailRepositoryError};
use crate::domain::stage::Stage;
use crate::domain::stage_detail::{StageDetail, StageDetailId, StageDetailPatch};

use super::models::{NewStageDetailRow, StageDetailChangeset, StageDetailRow};
use super::pool::{DbPool, PoolError};
use super::schema::stage_details;

/// Diesel-backed implementation of the `StageDetailRepository` port.
#[derive(Clone)]
pub struct DieselStageDetailRepository {
    pool: DbPool,
}

impl DieselStageDetailRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> StageDetailRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StageDetailRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> StageDetailRepositoryError {
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
            StageDetailRepositoryError::connection("database connection error")
        }
        DieselError::NotFound => StageDetailRepositoryError::query("record not found"),
        _ => StageDetailRepositoryError::query("database error"),
    }
}

/// Convert a database row to a domain stage detail.
fn row_to_detail(row: StageDetailRow) -> Result<StageDetail, StageDetailRepositoryError> {
    let stage = row.stage.parse().map_err(|_| {
        StageDetailRepositoryError::query(format!("unrecognised stage value {:?}", row.stage))
    })?;
    Ok(StageDetail {
        id: StageDetailId::from_uuid(row.id),
        piece_id: PieceId::from_uuid(row.piece_id),
        stage,
        notes: row.notes,
        image_url: row.image_url,
        weight: row.weight,
        glazes: row.glazes,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl StageDetailRepository for DieselStageDetailRepository {
    async fn insert_defaults(
        &self,
        piece_id: PieceId,
    ) -> Result<Vec<StageDetail>, StageDetailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let ids: Vec<Uuid> = Stage::ALL.iter().map(|_| Uuid::new_v4()).collect();
        let new_rows: Vec<NewStageDetailRow<'_>> = Stage::ALL
            .iter()
            .zip(&ids)
            .map(|(stage, id)| NewStageDetailRow {
                id: *id,
                piece_id: *piece_id.as_uuid(),
                stage: stage.as_str(),
            })
            .collect();

        let rows: Vec<StageDetailRow> = diesel::insert_into(stage_details::table)
            .values(&new_rows)
            .returning(StageDetailRow::as_returning())
            .get_results(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_detail).collect()
    }

    async fn list_by_piece(
        &self,
        piece_id: &PieceId,
    ) -> Result<Vec<StageDetail>, StageDetailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<StageDetailRow> = stage_details::table
            .filter(stage_details::piece_id.eq(piece_id.as_uuid()))
            .select(StageDetailRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_detail).collect()
    }

    async fn update(
        &self,
        piece_id: &PieceId,
        stage: Stage,
        patch: &StageDetailPatch,
    ) -> Result<Option<StageDetail>, StageDetailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = StageDetailChangeset {
            notes: patch.notes.as_deref(),
            image_url: patch.image_url.as_deref(),
            weight: patch.weight,
            glazes: patch.glazes.as_deref(),
            updated_at: Utc::now(),
        };

        let row: Option<StageDetailRow> = diesel::update(stage_details::table)
            .filter(
                stage_details::piece_id
                    .eq(piece_id.as_uuid())
                    .and(stage_details::stage.eq(stage.as_str())),
            )
            .set(&changeset)
            .returning(StageDetailRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_detail).transpose()
    }

    async fn delete_by_piece(
        &self,
        piece_id: &PieceId,
    ) -> Result<u64, StageDetailRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(
            stage_details::table.filter(stage_details::piece_id.eq(piece_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(deleted as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(stage: &str) -> StageDetailRow {
        StageDetailRow {
            id: Uuid::new_v4(),
            piece_id: Uuid::new_v4(),
            stage: stage.to_owned(),
            notes: Some("pulled a bit thin".to_owned()),
            image_url: None,
            weight: Some(480),
            glazes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn row_to_detail_parses_the_stage() {
        let detail = row_to_detail(row("throw")).expect("valid row");
        assert_eq!(detail.stage, Stage::Throw);
        assert_eq!(detail.weight, Some(480));
    }

    #[rstest]
    fn unknown_stage_values_are_query_errors() {
        let error = row_to_detail(row("firing")).expect_err("invalid row");
        assert!(matches!(error, StageDetailRepositoryError::Query { .. }));
        assert!(error.to_string().contains("firing"));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(
            repo_err,
            StageDetailRepositoryError::Connection { .. }
        ));
    }
}
