//! 64-bit mixing function for rendezvous scores.
//!
//! A raw XOR of two 64-bit hashes preserves structural correlation between
//! keys and node identifiers (shared bit patterns bias which node wins), so
//! the combined seed is pushed through an xorshift step followed by a
//! multiplicative avalanche. The result of `mix64(key_hash ^ node_hash)`
//! behaves like an independent uniform draw per (key, node) pair, which is
//! what makes rendezvous selection both balanced and minimally disruptive.
//!
//! The shift amounts and multiplier below determine the output values, so
//! any port that needs to agree on selections across languages must use
//! exactly these constants.

/// Multiplier for the final avalanche step.
const MIX_MULTIPLIER: u64 = 2685821657736338717;

/// Scramble a combined 64-bit seed into a rendezvous score.
///
/// Pure and total: same input always produces the same output, and there is
/// no failure mode.
#[inline]
#[must_use]
pub const fn mix64(seed: u64) -> u64 {
    let mut x = seed;
    x ^= x >> 12;
    x ^= x << 25;
    x ^= x >> 27;
    x.wrapping_mul(MIX_MULTIPLIER)
}
