//! Workflow vocabulary: production stages and piece priorities.
//!
//! A piece moves through a fixed pipeline of six stages. The set is closed;
//! both the `pieces.stage` column and the `stage_details.stage` column only
//! ever hold one of these literals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One of the six fixed workflow stages.
///
/// The ordering of [`Stage::ALL`] is the production order and drives both
/// stage-detail assembly and the per-stage stats breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Sketches and planning before any clay is touched.
    Ideas,
    /// Throwing on the wheel.
    Throw,
    /// Trimming the leather-hard piece.
    Trim,
    /// First (bisque) firing.
    Bisque,
    /// Glazing.
    Glaze,
    /// Final firing complete.
    Finished,
}

impl Stage {
    /// Every stage in production order.
    pub const ALL: [Stage; 6] = [
        Stage::Ideas,
        Stage::Throw,
        Stage::Trim,
        Stage::Bisque,
        Stage::Glaze,
        Stage::Finished,
    ];

    /// The wire and column literal for this stage.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Ideas => "ideas",
            Stage::Throw => "throw",
            Stage::Trim => "trim",
            Stage::Bisque => "bisque",
            Stage::Glaze => "glaze",
            Stage::Finished => "finished",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the six stage literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown stage: {value}")]
pub struct ParseStageError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ideas" => Ok(Stage::Ideas),
            "throw" => Ok(Stage::Throw),
            "trim" => Ok(Stage::Trim),
            "bisque" => Ok(Stage::Bisque),
            "glaze" => Ok(Stage::Glaze),
            "finished" => Ok(Stage::Finished),
            other => Err(ParseStageError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Scheduling priority of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Needs attention soon.
    High,
    /// Default urgency.
    Medium,
    /// Whenever there is wheel time.
    Low,
}

impl Priority {
    /// Every priority, highest first.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// The wire and column literal for this priority.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the three priority literals.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority: {value}")]
pub struct ParsePriorityError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ParsePriorityError {
                value: other.to_owned(),
            }),
        }
    }
}
