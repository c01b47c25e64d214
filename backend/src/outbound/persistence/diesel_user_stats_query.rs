//! PostgreSQL-backed `UserStatsQuery` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserStatsQuery, UserStatsQueryError};
use crate::domain::stage::Stage;
use crate::domain::stats::UserStats;
use crate::domain::user::UserId;

use super::pool::{DbPool, PoolError};
use super::schema::pieces;

/// Narrow projection of a piece used only for counting.
type StatsRow = (String, String, bool, bool);

/// Diesel-backed implementation of the `UserStatsQuery` port.
///
/// Fetches only the four columns the counts depend on rather than whole
/// piece rows.
#[derive(Clone)]
pub struct DieselUserStatsQuery {
    pool: DbPool,
}

impl DieselUserStatsQuery {
    /// Create a new query adapter with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserStatsQueryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserStatsQueryError::connection(message)
        }
    }
}

/// Fold count rows into aggregate stats.
///
/// Rows with unrecognised stage or priority values still count towards the
/// totals; they are skipped in the per-value breakdowns.
fn fold_rows(rows: &[StatsRow]) -> UserStats {
    let mut stats = UserStats::default();
    for (stage, priority, archived, starred) in rows {
        let stage: Option<Stage> = stage.parse().ok();
        stats.total_pieces += 1;
        if *archived {
            stats.archived_pieces += 1;
        } else if stage == Some(Stage::Finished) {
            stats.completed_pieces += 1;
        } else {
            stats.active_pieces += 1;
        }
        if *starred {
            stats.starred_pieces += 1;
        }
        if let Some(stage) = stage {
            *stats.pieces_by_stage.slot(stage) += 1;
        }
        if let Ok(priority) = priority.parse() {
            *stats.pieces_by_priority.slot(priority) += 1;
        }
    }
    stats
}

#[async_trait]
impl UserStatsQuery for DieselUserStatsQuery {
    async fn stats_for_user(&self, user_id: &UserId) -> Result<UserStats, UserStatsQueryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<StatsRow> = pieces::table
            .filter(pieces::owner_id.eq(user_id.as_uuid()))
            .select((
                pieces::stage,
                pieces::priority,
                pieces::archived,
                pieces::starred,
            ))
            .load(&mut conn)
            .await
            .map_err(|error| UserStatsQueryError::query(error.to_string()))?;

        Ok(fold_rows(&rows))
    }
}
