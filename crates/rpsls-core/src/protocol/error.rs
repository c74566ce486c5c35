//! Errors from game actions.

use super::{GameState, PlayerId};
use crate::ledger::LedgerError;
use thiserror::Error;

/// Rejection of a game action. None of these alter the game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Action not allowed while game is {0}")]
    InvalidState(GameState),

    #[error("Stake mismatch: expected {expected}, got {actual}")]
    StakeMismatch { expected: u64, actual: u64 },

    #[error("Invalid move index {0}: expected 1..=5")]
    InvalidMove(u8),

    #[error("Player 1 cannot join their own game")]
    SelfPlay,

    #[error("Player {0} is not allowed to perform this action")]
    Unauthorized(PlayerId),

    #[error("Revealed move and salt do not match the commitment")]
    CommitmentMismatch,

    #[error("Timeout not elapsed: {remaining_secs}s remaining")]
    TimeoutNotElapsed { remaining_secs: i64 },

    #[error("Disbursement failed: {0}")]
    Ledger(#[from] LedgerError),
}

impl GameError {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            GameError::InvalidState(_) => "invalid_state",
            GameError::StakeMismatch { .. } => "stake_mismatch",
            GameError::InvalidMove(_) => "invalid_move",
            GameError::SelfPlay => "self_play",
            GameError::Unauthorized(_) => "unauthorized",
            GameError::CommitmentMismatch => "commitment_mismatch",
            GameError::TimeoutNotElapsed { .. } => "timeout_not_elapsed",
            GameError::Ledger(_) => "ledger",
        }
    }
}
