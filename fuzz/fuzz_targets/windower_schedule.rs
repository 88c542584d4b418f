//! Fuzz the proposer-window scheduler with arbitrary validator sets.
//!
//! Goals:
//! - No panics or overflow on extreme weights.
//! - The ordering never repeats a validator and never exceeds the window
//!   count; every delay is a whole number of windows.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use solana_hash::Hash;
use solana_pubkey::Pubkey;
use tempo_proposer_vm::{TestValidatorState, Windower, MAX_VERIFY_WINDOWS, WINDOW_DURATION};

#[derive(Debug, Arbitrary)]
struct Input {
    weights: Vec<u64>,
    height: u64,
    p_chain_height: u64,
    chain_seed: [u8; 32],
    probe: u8,
}

fuzz_target!(|input: Input| {
    if input.weights.len() > 256 {
        return;
    }
    let validators: Vec<(Pubkey, u64)> = input
        .weights
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let mut bytes = [0u8; 32];
            bytes[0] = i as u8;
            bytes[1] = (i >> 8) as u8;
            (Pubkey::new_from_array(bytes), *w)
        })
        .collect();
    let state = TestValidatorState::new(u64::MAX);
    state.set_default_validators(validators.clone());

    let windower = Windower::new(&Hash::new_from_array(input.chain_seed), Hash::default());
    let Ok(ordering) = windower.proposers(
        &state,
        input.height,
        input.p_chain_height,
        MAX_VERIFY_WINDOWS,
    ) else {
        return;
    };
    assert!(ordering.len() <= MAX_VERIFY_WINDOWS as usize);
    let mut deduped = ordering.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), ordering.len());

    let probe = validators
        .get(input.probe as usize % validators.len().max(1))
        .map(|(pk, _)| *pk)
        .unwrap_or_default();
    let delay = windower
        .delay(
            &state,
            input.height,
            input.p_chain_height,
            &probe,
            MAX_VERIFY_WINDOWS,
        )
        .unwrap();
    assert_eq!(delay.as_secs() % WINDOW_DURATION.as_secs(), 0);
    assert!(delay.as_secs() <= ordering.len() as u64 * WINDOW_DURATION.as_secs());
});
