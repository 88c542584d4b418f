//! Tempo property-based invariant tests
//!
//! Uses proptest to verify invariants of the proposer layer across:
//! - Accepted-chain monotonicity and fork masking
//! - Envelope codec round-trips and strict parsing
//! - Proposer-window determinism
//! - Gossip bookkeeping consistency

pub mod chain_invariants;
pub mod envelope_invariants;
pub mod scheduling_invariants;
pub mod tracker_invariants;
