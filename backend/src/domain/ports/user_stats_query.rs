//! Port for the aggregate user statistics query.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::ports::piece_repository::PieceRepository;
use crate::domain::stats::UserStats;
use crate::domain::user::UserId;

/// Errors raised by stats query adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserStatsQueryError {
    /// Query backend connection could not be established.
    #[error("stats query connection failed: {message}")]
    Connection {
        /// Adapter-level detail.
        message: String,
    },
    /// Query failed during execution.
    #[error("stats query failed: {message}")]
    Query {
        /// Adapter-level detail.
        message: String,
    },
}

impl UserStatsQueryError {
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

/// Port for computing a user's piece statistics.
///
/// The SQL adapter aggregates in the database; callers must not assume the
/// counts were derived from rows they have already fetched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStatsQuery: Send + Sync {
    /// Compute stats over every piece owned by the user.
    async fn stats_for_user(&self, user_id: &UserId) -> Result<UserStats, UserStatsQueryError>;
}

/// Stats adapter that folds over a piece repository in memory.
///
/// Backs tests and the no-database fallback, where no SQL aggregate exists.
pub struct InMemoryUserStatsQuery {
    pieces: Arc<dyn PieceRepository>,
}

impl InMemoryUserStatsQuery {
    /// Compute stats from the given piece repository.
    pub fn new(pieces: Arc<dyn PieceRepository>) -> Self {
        Self { pieces }
    }
}

#[async_trait]
impl UserStatsQuery for InMemoryUserStatsQuery {
    async fn stats_for_user(&self, user_id: &UserId) -> Result<UserStats, UserStatsQueryError> {
        let pieces = self
            .pieces
            .list_by_owner(user_id, true)
            .await
            .map_err(|error| UserStatsQueryError::query(error.to_string()))?;
        Ok(UserStats::from_pieces(&pieces))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::piece::NewPiece;
    use crate::domain::ports::piece_repository::InMemoryPieceRepository;
    use crate::domain::piece::{PieceId, PiecePatch};
    use crate::domain::stage::{Priority, Stage};

    fn draft(owner_id: UserId, stage: Stage) -> NewPiece {
        NewPiece {
            title: "Tumbler".to_owned(),
            kind: "cup".to_owned(),
            details: String::new(),
            status: None,
            priority: Priority::Low,
            stage,
            owner_id,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn counts_include_archived_pieces() {
        let repo = Arc::new(InMemoryPieceRepository::new());
        let owner = UserId::random();
        repo.insert(PieceId::random(), &draft(owner, Stage::Throw))
            .await
            .expect("insert");
        let archived = PieceId::random();
        repo.insert(archived, &draft(owner, Stage::Finished))
            .await
            .expect("insert");
        repo.update(
            &archived,
            &PiecePatch {
                archived: Some(true),
                ..PiecePatch::default()
            },
        )
        .await
        .expect("archive");

        let stats = InMemoryUserStatsQuery::new(repo)
            .stats_for_user(&owner)
            .await
            .expect("stats");

        assert_eq!(stats.total_pieces, 2);
        assert_eq!(stats.active_pieces, 1);
        assert_eq!(stats.archived_pieces, 1);
        assert_eq!(stats.pieces_by_stage.finished, 1);
    }

    #[tokio::test]
    async fn unknown_user_yields_zeroes() {
        let query = InMemoryUserStatsQuery::new(Arc::new(InMemoryPieceRepository::new()));
        let stats = query
            .stats_for_user(&UserId::random())
            .await
            .expect("stats");
        assert_eq!(stats, UserStats::default());
    }
}
