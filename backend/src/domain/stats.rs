//! Aggregate statistics over one user's pieces.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::piece::Piece;
use super::stage::{Priority, Stage};

/// Piece counts per workflow stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StageCounts {
    /// Pieces currently in `ideas`.
    pub ideas: u64,
    /// Pieces currently in `throw`.
    pub throw: u64,
    /// Pieces currently in `trim`.
    pub trim: u64,
    /// Pieces currently in `bisque`.
    pub bisque: u64,
    /// Pieces currently in `glaze`.
    pub glaze: u64,
    /// Pieces currently in `finished`.
    pub finished: u64,
}

impl StageCounts {
    /// Mutable counter for one stage.
    pub fn slot(&mut self, stage: Stage) -> &mut u64 {
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

/// Piece counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriorityCounts {
    /// High-priority pieces.
    pub high: u64,
    /// Medium-priority pieces.
    pub medium: u64,
    /// Low-priority pieces.
    pub low: u64,
}

impl PriorityCounts {
    /// Mutable counter for one priority.
    pub fn slot(&mut self, priority: Priority) -> &mut u64 {
        match priority {
            Priority::High => &mut self.high,
            Priority::Medium => &mut self.medium,
            Priority::Low => &mut self.low,
        }
    }
}

/// Aggregate view of one user's pieces.
///
/// "Active" means neither archived nor finished; "completed" means in the
/// `finished` stage and not archived. Stage and priority breakdowns count
/// every piece, archived included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    /// Every piece owned by the user.
    pub total_pieces: u64,
    /// Unarchived pieces still in progress.
    pub active_pieces: u64,
    /// Unarchived finished pieces.
    pub completed_pieces: u64,
    /// Starred pieces.
    pub starred_pieces: u64,
    /// Archived pieces.
    pub archived_pieces: u64,
    /// Breakdown by current stage.
    pub pieces_by_stage: StageCounts,
    /// Breakdown by priority.
    pub pieces_by_priority: PriorityCounts,
}

impl UserStats {
    /// Compute stats from a slice of pieces (assumed to share one owner).
    pub fn from_pieces(pieces: &[Piece]) -> Self {
        let mut stats = Self::default();
        for piece in pieces {
            stats.total_pieces += 1;
            if piece.archived {
                stats.archived_pieces += 1;
            } else if piece.stage == Stage::Finished {
                stats.completed_pieces += 1;
            } else {
                stats.active_pieces += 1;
            }
            if piece.starred {
                stats.starred_pieces += 1;
            }
            *stats.pieces_by_stage.slot(piece.stage) += 1;
            *stats.pieces_by_priority.slot(piece.priority) += 1;
        }
        stats
    }
}
