//! Proof-of-Work
//!
//! Server-issued hash-prefix challenges: the client must find a nonce such
//! that `SHA-256("{challenge}:{nonce}")` in hex starts with `difficulty`
//! zero characters. At the shipped difficulty of 3 a solution takes about
//! 4096 hash attempts on average.

mod store;
mod verifier;


pub use store::{ChallengeStore, IssuedChallenge, PowChallenge};
pub use verifier::{solve, verify_solution};
