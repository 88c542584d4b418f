//! Property-based tests for gossip bookkeeping.
//!
//! Properties tested:
//! 1. `get_unknown` never exceeds its limit and never returns a validator
//!    the peer was marked as knowing.
//! 2. Removing a validator clears it from every peer; re-adding under a
//!    fresh tx id starts uninformed everywhere.

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        solana_hash::Hash,
        solana_pubkey::Pubkey,
        tempo_net::{GossipTracker, ValidatorId},
    };

    fn pubkey(index: u8) -> Pubkey {
        let mut bytes = [0u8; 32];
        bytes[0] = index;
        bytes[31] = 0xCC;
        Pubkey::new_from_array(bytes)
    }

    fn tx_id(index: u8) -> Hash {
        let mut bytes = [0u8; 32];
        bytes[0] = index;
        bytes[31] = 0xDD;
        Hash::new_from_array(bytes)
    }

    proptest! {
        #[test]
        fn get_unknown_respects_limit_and_known(
            validator_count in 1..32u8,
            known in proptest::collection::vec(0..32u8, 0..16),
            limit in 1..40usize,
        ) {
            let tracker = GossipTracker::new();
            let peer = pubkey(0xFF);
            prop_assert!(tracker.start_tracking(peer));

            for i in 0..validator_count {
                let validator_id = ValidatorId {
                    node_id: pubkey(i),
                    tx_id: tx_id(i),
                };
                let added = tracker.add_validator(validator_id);
                prop_assert!(added);
            }
            let known_txs: Vec<Hash> = known.iter().map(|i| tx_id(*i)).collect();
            tracker.add_known(&peer, &known_txs).unwrap();

            let unknown = tracker.get_unknown(&peer, limit).unwrap();
            prop_assert!(unknown.len() <= limit);
            for validator in &unknown {
                prop_assert!(!known_txs.contains(&validator.tx_id));
            }
        }

        #[test]
        fn removal_clears_every_peer(
            peer_count in 1..8u8,
            target in 0..8u8,
        ) {
            let tracker = GossipTracker::new();
            let peers: Vec<Pubkey> =
                (0..peer_count).map(|i| pubkey(0x80 + i)).collect();
            for peer in &peers {
                tracker.start_tracking(*peer);
            }
            for i in 0..8u8 {
                tracker.add_validator(ValidatorId {
                    node_id: pubkey(i),
                    tx_id: tx_id(i),
                });
            }
            for peer in &peers {
                tracker.add_known(peer, &[tx_id(target)]).unwrap();
            }

            prop_assert!(tracker.remove_validator(&pubkey(target)));
            let reborn = ValidatorId {
                node_id: pubkey(target),
                tx_id: tx_id(0xF0),
            };
            prop_assert!(tracker.add_validator(reborn));
            for peer in &peers {
                let unknown = tracker.get_unknown(peer, 64).unwrap();
                prop_assert!(unknown.contains(&reborn));
            }
        }
    }
}
