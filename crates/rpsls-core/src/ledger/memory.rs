//! In-memory ledger.

use super::{Ledger, LedgerError};
use crate::protocol::{GameId, Payout, PlayerId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Default)]
struct LedgerInner {
    /// Credited balance per player
    balances: HashMap<PlayerId, u64>,
    /// Applied payout per game
    disbursements: HashMap<GameId, Payout>,
}

/// Thread-safe ledger crediting player balances in memory
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    inner: Arc<Mutex<LedgerInner>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total credited to a player across all games
    pub fn balance(&self, player: PlayerId) -> u64 {
        self.lock().balances.get(&player).copied().unwrap_or(0)
    }

    /// The payout applied for a game, if it has settled
    pub fn disbursement(&self, game: GameId) -> Option<Payout> {
        self.lock().disbursements.get(&game).cloned()
    }

    /// Sum of every disbursement applied so far
    pub fn total_disbursed(&self) -> u64 {
        self.lock()
            .disbursements
            .values()
            .fold(0u64, |acc, p| acc.saturating_add(p.total()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Ledger for InMemoryLedger {
    fn disburse(&self, game: GameId, payout: &Payout) -> Result<(), LedgerError> {
        let mut inner = self.lock();
        if inner.disbursements.contains_key(&game) {
            return Err(LedgerError::AlreadyDisbursed(game));
        }

        // Stage every credit first so an overflow leaves balances untouched.
        let mut staged: HashMap<PlayerId, u64> = HashMap::new();
        for transfer in &payout.transfers {
            let current = match staged.get(&transfer.recipient) {
                Some(amount) => *amount,
                None => inner.balances.get(&transfer.recipient).copied().unwrap_or(0),
            };
            let updated = current
                .checked_add(transfer.amount)
                .ok_or(LedgerError::Overflow)?;
            staged.insert(transfer.recipient, updated);
        }

        inner.balances.extend(staged);
        inner.disbursements.insert(game, payout.clone());
        Ok(())
    }
}
