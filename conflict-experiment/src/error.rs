use std::fmt;
use std::path::PathBuf;

use conflict_core::KeyMappingError;
use conflict_timing::IntervalError;
use thiserror::Error;

/// Setup faults. Raised before any trial runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    KeyMapping(#[from] KeyMappingError),
    #[error(transparent)]
    Interval(#[from] IntervalError),
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{what} of {size} does not split evenly over a pool of {pool}")]
    Indivisible {
        what: &'static str,
        size: usize,
        pool: usize,
    },
    #[error("stimulus pool is unbalanced: {congruent} congruent vs {incongruent} incongruent")]
    UnbalancedPool { congruent: usize, incongruent: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    TestBlocks,
    AttentionChecks,
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueKind::TestBlocks => f.write_str("test block schedule"),
            QueueKind::AttentionChecks => f.write_str("attention check queue"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0} exhausted")]
    Exhausted(QueueKind),
    #[error("task already finished")]
    Finished,
}
