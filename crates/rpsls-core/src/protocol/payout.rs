//! Terminal disbursement of a game's escrow.

use super::{Outcome, PlayerId};
use crate::ledger::LedgerError;
use serde::{Deserialize, Serialize};

/// A single credit out of escrow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub recipient: PlayerId,
    pub amount: u64,
}

/// Every transfer implied by one terminal transition, applied as a unit
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub transfers: Vec<Transfer>,
}

impl Payout {
    fn single(recipient: PlayerId, amount: u64) -> Self {
        Self {
            transfers: vec![Transfer { recipient, amount }],
        }
    }

    /// Sum of all transfers
    pub fn total(&self) -> u64 {
        self.transfers
            .iter()
            .fold(0u64, |acc, t| acc.saturating_add(t.amount))
    }

    /// Amount credited to one player
    pub fn amount_for(&self, player: PlayerId) -> u64 {
        self.transfers
            .iter()
            .filter(|t| t.recipient == player)
            .map(|t| t.amount)
            .sum()
    }
}

/// Escrow of both stakes once player 2 has matched
pub(crate) fn matched_escrow(stake: u64) -> Result<u64, LedgerError> {
    stake.checked_mul(2).ok_or(LedgerError::Overflow)
}

/// Computes the split of a game's escrow for each terminal path.
pub struct PayoutEngine;

impl PayoutEngine {
    /// Split after a verified reveal. Both players contributed `stake`.
    pub fn after_reveal(
        player1: PlayerId,
        player2: PlayerId,
        stake: u64,
        outcome: Outcome,
    ) -> Result<Payout, LedgerError> {
        let escrow = matched_escrow(stake)?;
        Ok(match outcome {
            Outcome::Player1Wins => Payout::single(player1, escrow),
            Outcome::Player2Wins => Payout::single(player2, escrow),
            Outcome::Tie => Payout {
                transfers: vec![
                    Transfer {
                        recipient: player1,
                        amount: stake,
                    },
                    Transfer {
                        recipient: player2,
                        amount: stake,
                    },
                ],
            },
        })
    }

    /// Player 1 reclaims their stake from a game nobody joined.
    pub fn reclaim_unjoined(player1: PlayerId, stake: u64) -> Payout {
        Payout::single(player1, stake)
    }

    /// Player 2 takes the whole escrow after player 1 failed to reveal.
    pub fn forfeit_to_player2(player2: PlayerId, stake: u64) -> Result<Payout, LedgerError> {
        Ok(Payout::single(player2, matched_escrow(stake)?))
    }
}
