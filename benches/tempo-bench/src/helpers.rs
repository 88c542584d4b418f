//! Shared helpers for Tempo benchmarks.

use {solana_pubkey::Pubkey, tempo_proposer_vm::TestValidatorState};

/// A validator-state oracle serving `n` validators with equal weight.
pub fn equal_weight_state(n: usize) -> (TestValidatorState, Vec<Pubkey>) {
    let pubkeys: Vec<Pubkey> = (0..n).map(|_| Pubkey::new_unique()).collect();
    let state = TestValidatorState::new(1_000);
    state.set_default_validators(pubkeys.iter().map(|pk| (*pk, 1_000_000)).collect());
    (state, pubkeys)
}

/// A validator-state oracle with descending weights, so the early
/// validators dominate the schedule.
pub fn weighted_state(n: usize) -> (TestValidatorState, Vec<Pubkey>) {
    let pubkeys: Vec<Pubkey> = (0..n).map(|_| Pubkey::new_unique()).collect();
    let state = TestValidatorState::new(1_000);
    state.set_default_validators(
        pubkeys
            .iter()
            .enumerate()
            .map(|(i, pk)| {
                let weight = ((n.saturating_sub(i)) as u64).saturating_mul(1_000_000);
                (*pk, weight)
            })
            .collect(),
    );
    (state, pubkeys)
}
