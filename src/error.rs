//! Error types
//!
//! Placement rejections are expected and recovered by retrying; a free-falling
//! ball ends the run.

use thiserror::Error;

/// Why a piece could not be appended to the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The last piece in the chain has no exit
    #[error("chain ends in a terminal piece")]
    DeadEnd,
    /// The previous piece exits downward but the candidate does not accept entry from the top
    #[error("candidate anchor cannot join a downward exit")]
    Incompatible,
    /// Another piece already occupies the candidate's cell
    #[error("cell already occupied (backtracked: {backtracked})")]
    Overlap { backtracked: bool },
    /// Another piece sits where the candidate would exit
    #[error("exit cell blocked (backtracked: {backtracked})")]
    ExitBlocked { backtracked: bool },
    /// Requested anchor does not exist on the piece
    #[error("piece has no anchor at index {index}")]
    NoAnchor { index: usize },
}

impl PlacementError {
    /// True if the rejection removed the last two pieces from the chain
    pub fn backtracked(&self) -> bool {
        matches!(
            self,
            PlacementError::Overlap { backtracked: true }
                | PlacementError::ExitBlocked { backtracked: true }
        )
    }
}

/// Fault raised while stepping the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    /// A ball left the footprint of every live piece
    #[error("ball {ball} is free falling")]
    FreeFall { ball: usize },
}

/// Why track generation stopped short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// No piece kinds to draw from
    #[error("no piece kinds allowed for generation")]
    NoCandidates,
    /// Every attempt was rejected
    #[error("gave up after {attempts} placement attempts")]
    Exhausted { attempts: u32 },
}

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
