//! Proof-of-Work solution verification

use sha2::{Digest, Sha256};

/// Check a Proof-of-Work solution against the difficulty predicate.
///
/// Pure function: no side effects, no store access. Empty challenge or
/// nonce always fails.
pub fn verify_solution(challenge: &str, nonce: &str, difficulty: u32) -> bool {
    if challenge.is_empty() || nonce.is_empty() {
        return false;
    }
    let digest = Sha256::digest(format!("{challenge}:{nonce}").as_bytes());
    let hash = hex::encode(digest);
    let prefix_len = difficulty as usize;
    hash.len() >= prefix_len && hash.as_bytes()[..prefix_len].iter().all(|&b| b == b'0')
}

/// Brute-force a nonce satisfying the difficulty predicate.
///
/// Counterpart of the client-side solver; used by tests and tooling. With
/// the shipped difficulties this terminates quickly, the bound exists so a
/// misconfigured difficulty cannot spin forever.
pub fn solve(challenge: &str, difficulty: u32) -> Option<String> {
    const MAX_ATTEMPTS: u64 = 50_000_000;
    (0..MAX_ATTEMPTS)
        .map(|nonce| nonce.to_string())
        .find(|nonce| verify_solution(challenge, nonce, difficulty))
}
