//! RPSLS Core Library
//!
//! This crate provides the commit-reveal primitives, move rules, game state
//! machine and payout logic for a two-player, stake-backed game of
//! Rock-Paper-Scissors-Lizard-Spock.

pub mod arena;
pub mod crypto;
pub mod games;
pub mod ledger;
pub mod protocol;

pub use arena::{Arena, ArenaError};
pub use crypto::{Commitment, Salt};
pub use games::{Move, MoveResolver};
pub use ledger::{InMemoryLedger, Ledger, LedgerError};
pub use protocol::{
    Game, GameClock, GameError, GameId, GameSnapshot, GameState, GameTerms, Outcome, Payout,
    PayoutEngine, PlayerId, Settlement, Transfer,
};
