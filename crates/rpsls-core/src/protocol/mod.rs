//! Protocol types, game state machine and settlement.

mod clock;
mod error;
mod game;
mod payout;
mod snapshot;
mod types;

pub use clock::GameClock;
pub use error::GameError;
pub use game::{Challenger, Game, GameTerms, Settlement};
pub use payout::{Payout, PayoutEngine, Transfer};
pub use snapshot::GameSnapshot;
pub use types::{GameId, GameState, Outcome, PlayerId};
