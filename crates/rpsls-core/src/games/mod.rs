//! Move set and winner resolution.

mod rpsls;

pub use rpsls::{Move, MoveResolver};
