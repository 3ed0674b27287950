//! Built-in byte hashers for seeding rendezvous scores.
//!
//! The selector is parameterized by a caller-supplied `fn(&[u8]) -> u64`.
//! Any deterministic 64-bit hash with reasonable bit dispersion works;
//! cryptographic strength is not required. Two ready-made options live here
//! so most callers never write their own.

use std::hash::Hasher as _;

use fnv::FnvHasher;
use siphasher::sip::SipHasher13;

/// A deterministic byte-sequence hash producing a 64-bit seed.
///
/// Must be pure and total: the same input always yields the same output, and
/// it never fails. The selector hashes every node identifier exactly once at
/// insertion and every lookup key exactly once per call, then mixes the two
/// seeds together, so dispersion here directly affects load balance.
pub type KeyHasher = fn(&[u8]) -> u64;

/// FNV-1a, 64-bit.
///
/// The default choice: fast on short identifiers and well dispersed enough
/// for rendezvous scoring once the mixer has run.
#[must_use]
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hasher = FnvHasher::default();
    hasher.write(bytes);
    hasher.finish()
}

/// SipHash-1-3 with fixed zero keys.
///
/// Stronger dispersion on adversarial or highly structured identifiers than
/// FNV-1a. The keys are fixed so the function stays pure; callers needing a
/// secret keyed hash should close over their own keys instead.
#[must_use]
pub fn siphash13_64(bytes: &[u8]) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write(bytes);
    hasher.finish()
}
