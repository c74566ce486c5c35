//! Ledger abstraction receiving terminal disbursements.

mod memory;

pub use memory::InMemoryLedger;

use crate::protocol::{GameId, Payout};
use thiserror::Error;

/// Errors from applying a disbursement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Disbursement already applied for game {0}")]
    AlreadyDisbursed(GameId),

    #[error("Disbursement rejected: {0}")]
    Rejected(String),
}

/// Sink for the escrow released when a game settles.
///
/// Implementations:
/// - InMemoryLedger for tests and the arena service
/// - a wallet or chain adapter owned by the transport layer
///
/// `disburse` must apply every transfer of the payout or none of them. A
/// game does not settle unless `disburse` returns `Ok`.
pub trait Ledger: Send + Sync {
    fn disburse(&self, game: GameId, payout: &Payout) -> Result<(), LedgerError>;
}
