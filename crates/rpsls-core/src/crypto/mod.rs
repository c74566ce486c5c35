//! Cryptographic primitives for the commit-reveal scheme.
//!
//! Player 1 binds a move and a secret salt into a [`Commitment`] before any
//! opposing stake is locked, and later reveals both for verification.

mod commitment;

pub use commitment::{Commitment, Salt};
