//! Proposer window scheduling.
//!
//! For each (height, P-reference height) pair the windower derives a
//! deterministic, stake-weighted ordering of the validator set observed at
//! that P-reference height. A validator at position `k` in the ordering may
//! start proposing `k * WINDOW_DURATION` after the parent block's
//! timestamp; after every window has elapsed, nobody is gated.
//!
//! The ordering is drawn by weighted sampling without replacement. Each
//! draw's target is taken from SHA-256 of (chain source XOR height,
//! iteration), so every node computes the same ordering on every platform
//! without a runtime RNG.

use {
    crate::{
        error::Result,
        inner::ValidatorState,
    },
    solana_hash::Hash,
    solana_pubkey::Pubkey,
    std::time::Duration,
};

/// Width of one proposer's exclusive window.
pub const WINDOW_DURATION: Duration = Duration::from_secs(5);

/// Number of windows enforced at verification time.
pub const MAX_VERIFY_WINDOWS: u64 = 6;

/// Total delay after which verification gates no validator.
pub const MAX_VERIFY_DELAY: Duration = Duration::from_secs(MAX_VERIFY_WINDOWS * 5);

/// Number of windows consulted when building locally.
pub const MAX_BUILD_WINDOWS: u64 = 60;

/// Submission deadline: past this delay a block may be built unsigned.
pub const MAX_BUILD_DELAY: Duration = Duration::from_secs(MAX_BUILD_WINDOWS * 5);

/// Deterministic per-height proposer ordering.
#[derive(Debug, Clone)]
pub struct Windower {
    /// First 8 bytes of the chain id; decorrelates orderings across chains
    /// that share a validator set.
    chain_source: u64,
    subnet_id: Hash,
}

impl Windower {
    pub fn new(chain_id: &Hash, subnet_id: Hash) -> Self {
        let raw: [u8; 8] = chain_id.as_ref()[..8].try_into().expect("hash is 32 bytes");
        Self {
            chain_source: u64::from_le_bytes(raw),
            subnet_id,
        }
    }

    /// The first `max_windows` proposers for `height`, drawn from the
    /// validator set at `p_chain_height` by stake-weighted sampling without
    /// replacement. Identical inputs yield identical orderings on every
    /// node.
    pub fn proposers(
        &self,
        validator_state: &dyn ValidatorState,
        height: u64,
        p_chain_height: u64,
        max_windows: u64,
    ) -> Result<Vec<Pubkey>> {
        let set = validator_state.validator_set(p_chain_height, &self.subnet_id)?;

        // Canonical order: stake descending, pubkey ascending. The sampling
        // below is order-sensitive, so the walk must start from the same
        // sequence on every node.
        let mut validators: Vec<(Pubkey, u64)> =
            set.into_iter().filter(|(_, weight)| *weight > 0).collect();
        validators.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut remaining: u64 = validators
            .iter()
            .fold(0u64, |total, (_, weight)| total.saturating_add(*weight));
        let mut ordering = Vec::with_capacity(max_windows.min(validators.len() as u64) as usize);

        for slot in 0..max_windows {
            if validators.is_empty() || remaining == 0 {
                break;
            }
            let target = self.sample_target(height, slot) % remaining;
            let mut accumulated: u64 = 0;
            let mut picked = validators.len() - 1;
            for (i, (_, weight)) in validators.iter().enumerate() {
                accumulated = accumulated.saturating_add(*weight);
                if accumulated > target {
                    picked = i;
                    break;
                }
            }
            let (pubkey, weight) = validators.remove(picked);
            remaining = remaining.saturating_sub(weight);
            ordering.push(pubkey);
        }
        Ok(ordering)
    }

    /// Earliest delay after the parent timestamp at which `node_id` may
    /// propose at `height`. Validators outside the ordering wait for every
    /// scheduled window to elapse.
    pub fn delay(
        &self,
        validator_state: &dyn ValidatorState,
        height: u64,
        p_chain_height: u64,
        node_id: &Pubkey,
        max_windows: u64,
    ) -> Result<Duration> {
        let proposers = self.proposers(validator_state, height, p_chain_height, max_windows)?;
        let position = proposers
            .iter()
            .position(|p| p == node_id)
            .unwrap_or(proposers.len());
        Ok(WINDOW_DURATION * position as u32)
    }

    fn sample_target(&self, height: u64, slot: u64) -> u64 {
        let digest = solana_sha256_hasher::hashv(&[
            &(self.chain_source ^ height).to_le_bytes(),
            &slot.to_le_bytes(),
        ]);
        let raw: [u8; 8] = digest.as_ref()[..8].try_into().expect("hash is 32 bytes");
        u64::from_le_bytes(raw)
    }
}
