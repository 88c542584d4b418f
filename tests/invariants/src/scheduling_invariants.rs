//! Property-based tests for proposer-window scheduling.
//!
//! Properties tested:
//! 1. Determinism: the ordering at (height, P-reference height) is a pure
//!    function of its inputs.
//! 2. Uniqueness: no validator appears twice in an ordering.
//! 3. Delay bounds: every delay is a whole number of windows, at most
//!    `len(ordering) * WINDOW_DURATION`.

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        solana_hash::Hash,
        solana_pubkey::Pubkey,
        tempo_proposer_vm::{
            TestValidatorState, Windower, MAX_VERIFY_WINDOWS, WINDOW_DURATION,
        },
    };

    fn pubkey(index: u8) -> Pubkey {
        let mut bytes = [0u8; 32];
        bytes[0] = index;
        bytes[31] = 0xBB;
        Pubkey::new_from_array(bytes)
    }

    fn state_with(weights: &[u64]) -> TestValidatorState {
        let state = TestValidatorState::new(1_000);
        state.set_default_validators(
            weights
                .iter()
                .enumerate()
                .map(|(i, w)| (pubkey(i as u8), *w))
                .collect(),
        );
        state
    }

    proptest! {
        #[test]
        fn ordering_is_deterministic(
            weights in proptest::collection::vec(1..1_000u64, 1..24),
            height in any::<u64>(),
            p_chain_height in any::<u64>(),
            chain in any::<[u8; 32]>(),
        ) {
            let state = state_with(&weights);
            let windower = Windower::new(&Hash::new_from_array(chain), Hash::default());
            let a = windower
                .proposers(&state, height, p_chain_height, MAX_VERIFY_WINDOWS)
                .unwrap();
            let b = windower
                .proposers(&state, height, p_chain_height, MAX_VERIFY_WINDOWS)
                .unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn ordering_has_unique_validators(
            weights in proptest::collection::vec(1..1_000u64, 1..24),
            height in any::<u64>(),
        ) {
            let state = state_with(&weights);
            let windower = Windower::new(&Hash::default(), Hash::default());
            let ordering = windower
                .proposers(&state, height, 7, MAX_VERIFY_WINDOWS)
                .unwrap();
            prop_assert!(ordering.len() <= MAX_VERIFY_WINDOWS as usize);
            prop_assert!(ordering.len() <= weights.len());
            let mut deduped = ordering.clone();
            deduped.sort();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), ordering.len());
        }

        #[test]
        fn delay_is_whole_windows_and_bounded(
            weights in proptest::collection::vec(1..1_000u64, 1..24),
            height in any::<u64>(),
            node_index in 0..32u8,
        ) {
            let state = state_with(&weights);
            let windower = Windower::new(&Hash::default(), Hash::default());
            let ordering = windower
                .proposers(&state, height, 7, MAX_VERIFY_WINDOWS)
                .unwrap();
            let delay = windower
                .delay(&state, height, 7, &pubkey(node_index), MAX_VERIFY_WINDOWS)
                .unwrap();
            let window = WINDOW_DURATION.as_secs();
            prop_assert_eq!(delay.as_secs() % window, 0);
            prop_assert!(delay.as_secs() <= ordering.len() as u64 * window);
        }
    }
}
