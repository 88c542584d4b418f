//! Property-based tests for accepted-chain invariants.
//!
//! Properties tested:
//! 1. Along any accepted chain of wrappers, timestamps and P-reference
//!    heights never decrease, and any child violating either bound fails
//!    verification.
//! 2. Once the fork height is pinned, no pre-fork block at or above it
//!    reports anything but Rejected.
//! 3. The inner block under N sibling wrappers verifies exactly once, and
//!    rejecting wrappers never rejects the inner block.

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        solana_hash::Hash,
        std::sync::Arc,
        tempo_proposer_vm::{
            Block, Envelope, InnerBlock, ManualClock, MemDb, ProposerVm, ProposerVmConfig, Status,
            TestInnerBlock, TestInnerVm, TestValidatorState,
        },
        tokio_util::sync::CancellationToken,
    };

    struct Harness {
        vm: ProposerVm,
        inner_vm: Arc<TestInnerVm>,
        clock: Arc<ManualClock>,
        genesis: Arc<TestInnerBlock>,
        token: CancellationToken,
    }

    fn harness() -> Harness {
        let signer = ed25519_dalek::SigningKey::from_bytes(&[1; 32]);
        let genesis = TestInnerBlock::new(0, Hash::default(), 1, 0);
        let inner_vm = Arc::new(TestInnerVm::new());
        inner_vm.register(genesis.clone());
        inner_vm.set_last_accepted(genesis.id());
        let validator_state = Arc::new(TestValidatorState::new(1_000_000));
        let clock = Arc::new(ManualClock::new(1_000));
        let vm = ProposerVm::new(
            ProposerVmConfig {
                chain_id: Hash::new_unique(),
                ..ProposerVmConfig::dev_default()
            },
            inner_vm.clone(),
            validator_state,
            Arc::new(MemDb::new()),
            clock.clone(),
            signer,
        )
        .unwrap();
        Harness {
            vm,
            inner_vm,
            clock,
            genesis,
            token: CancellationToken::new(),
        }
    }

    impl Harness {
        fn wrapper(
            &self,
            parent_id: Hash,
            timestamp: i64,
            p_chain_height: u64,
            inner: &Arc<TestInnerBlock>,
        ) -> Block {
            self.inner_vm.register(inner.clone());
            let envelope = Envelope::build_unsigned(
                parent_id,
                timestamp,
                p_chain_height,
                inner.bytes().to_vec(),
            );
            self.vm.parse_block(&self.token, envelope.bytes()).unwrap()
        }
    }

    proptest! {
        // Chains built from non-negative deltas always verify and accept;
        // the accepted sequence is monotone in both timestamp and
        // P-reference height, and one deliberate violation at the tip is
        // refused.
        #[test]
        fn accepted_chains_are_monotone(
            deltas in proptest::collection::vec((0..5i64, 0..3u64), 1..10),
        ) {
            let h = harness();
            let mut parent_block: Option<Block> = None;
            let mut parent_inner_id = h.genesis.id();
            let mut timestamp = 1_000i64;
            let mut p_chain_height = 10u64;
            let mut height = 2u64;
            let mut accepted = Vec::new();

            for (i, (ts_delta, p_delta)) in deltas.iter().enumerate() {
                timestamp += ts_delta;
                p_chain_height += p_delta;
                h.clock.set(timestamp);
                let parent_id = parent_block
                    .as_ref()
                    .map(|b| b.id())
                    .unwrap_or(parent_inner_id);
                let inner = TestInnerBlock::new(
                    (i + 1) as u8,
                    parent_inner_id,
                    height,
                    timestamp,
                );
                let block = h.wrapper(parent_id, timestamp, p_chain_height, &inner);
                block.verify(&h.token).unwrap();
                block.accept(&h.token).unwrap();
                accepted.push((block.timestamp(), block.p_chain_height()));
                parent_inner_id = inner.id();
                parent_block = Some(block);
                height += 1;
            }

            for pair in accepted.windows(2) {
                prop_assert!(pair[0].0 <= pair[1].0, "timestamps regressed");
                prop_assert!(pair[0].1 <= pair[1].1, "P-reference heights regressed");
            }

            // A child stepping backwards on either axis is refused.
            let tip = parent_block.unwrap();
            let bad_inner =
                TestInnerBlock::new(0xEE, parent_inner_id, height, timestamp);
            let back_in_time =
                h.wrapper(tip.id(), timestamp - 1, p_chain_height, &bad_inner);
            prop_assert!(back_in_time.verify(&h.token).is_err());
            let bad_inner2 =
                TestInnerBlock::new(0xEF, parent_inner_id, height, timestamp);
            let shallow =
                h.wrapper(tip.id(), timestamp, p_chain_height - 1, &bad_inner2);
            prop_assert!(shallow.verify(&h.token).is_err());
        }

        // However many sibling wrappers share one inner block, the inner
        // block verifies once; rejecting all of them leaves it Processing.
        #[test]
        fn sibling_wrappers_verify_inner_once(siblings in 1..6usize) {
            let h = harness();
            let shared = TestInnerBlock::new(1, h.genesis.id(), 2, 1_000);
            let wrappers: Vec<Block> = (0..siblings)
                .map(|i| h.wrapper(h.genesis.id(), 1_000 + i as i64, 10, &shared))
                .collect();
            for wrapper in &wrappers {
                h.clock.set(wrapper.timestamp());
                wrapper.verify(&h.token).unwrap();
            }
            prop_assert_eq!(shared.verify_calls(), 1);

            for wrapper in &wrappers {
                wrapper.reject(&h.token).unwrap();
                prop_assert_eq!(shared.status(), Status::Processing);
            }
        }
    }

    // Fork masking: after the pinning accept, pre-fork blocks at or above
    // the fork height read Rejected, those below keep their inner status.
    #[test]
    fn fork_masking_flips_at_pinned_height() {
        let h = harness();
        let token = &h.token;

        let low = TestInnerBlock::new(2, h.genesis.id(), 2, 0);
        h.inner_vm.register(low.clone());
        let low_block = h.vm.parse_block(token, low.bytes()).unwrap();

        let transition = TestInnerBlock::new(3, h.genesis.id(), 2, 500);
        let wrapper = h.wrapper(h.genesis.id(), 1_000, 10, &transition);
        wrapper.verify(token).unwrap();
        wrapper.accept(token).unwrap();
        assert_eq!(h.vm.fork_height(), Some(2));

        // Same height as the fork: masked.
        assert_eq!(low_block.status(), Status::Rejected);
        assert_eq!(low.status(), Status::Processing);

        // Genesis sits below the fork height and keeps its own status.
        let genesis_block = h.vm.parse_block(token, h.genesis.bytes()).unwrap();
        assert_eq!(genesis_block.status(), Status::Processing);
    }
}
