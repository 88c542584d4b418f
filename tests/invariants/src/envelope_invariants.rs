//! Property-based tests for the envelope codec.
//!
//! Properties tested:
//! 1. Round-trip: parse(build(x)).bytes == build(x).bytes, for signed and
//!    unsigned envelopes, including the id.
//! 2. Strictness: no strict prefix of a valid encoding parses.
//! 3. Signatures: a signed round-trip keeps the proposer identity and
//!    verifies; flipping any payload bit breaks the signature.

#[cfg(test)]
mod tests {
    use {
        ed25519_dalek::SigningKey,
        proptest::prelude::*,
        solana_hash::Hash,
        solana_pubkey::Pubkey,
        tempo_proposer_vm::Envelope,
    };

    fn hash_from(bytes: [u8; 32]) -> Hash {
        Hash::new_from_array(bytes)
    }

    proptest! {
        #[test]
        fn unsigned_roundtrip(
            parent in any::<[u8; 32]>(),
            timestamp in any::<i64>(),
            p_chain_height in any::<u64>(),
            inner in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let env = Envelope::build_unsigned(
                hash_from(parent),
                timestamp,
                p_chain_height,
                inner.clone(),
            );
            let parsed = Envelope::parse(env.bytes()).unwrap();
            prop_assert_eq!(parsed.bytes(), env.bytes());
            prop_assert_eq!(parsed.id(), env.id());
            prop_assert_eq!(parsed.timestamp(), timestamp);
            prop_assert_eq!(parsed.p_chain_height(), p_chain_height);
            prop_assert_eq!(parsed.inner_bytes(), inner.as_slice());
            prop_assert!(!parsed.is_signed());
        }

        #[test]
        fn signed_roundtrip_verifies(
            parent in any::<[u8; 32]>(),
            timestamp in any::<i64>(),
            p_chain_height in any::<u64>(),
            inner in proptest::collection::vec(any::<u8>(), 0..256),
            seed in any::<[u8; 32]>(),
            chain in any::<[u8; 32]>(),
        ) {
            let signer = SigningKey::from_bytes(&seed);
            let chain_id = hash_from(chain);
            let env = Envelope::build_signed(
                hash_from(parent),
                timestamp,
                p_chain_height,
                inner,
                &signer,
                &chain_id,
            );
            let parsed = Envelope::parse(env.bytes()).unwrap();
            prop_assert_eq!(parsed.bytes(), env.bytes());
            prop_assert_eq!(
                parsed.proposer(),
                Some(Pubkey::new_from_array(signer.verifying_key().to_bytes()))
            );
            prop_assert!(parsed.verify_signature(true, &chain_id).is_ok());
        }

        #[test]
        fn no_strict_prefix_parses(
            timestamp in any::<i64>(),
            p_chain_height in any::<u64>(),
            inner in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let env = Envelope::build_unsigned(
                Hash::default(),
                timestamp,
                p_chain_height,
                inner,
            );
            for len in 0..env.bytes().len() {
                prop_assert!(Envelope::parse(&env.bytes()[..len]).is_err());
            }
        }

        #[test]
        fn bit_flip_breaks_signature(
            inner in proptest::collection::vec(any::<u8>(), 1..64),
            seed in any::<[u8; 32]>(),
            flip in any::<proptest::sample::Index>(),
        ) {
            let signer = SigningKey::from_bytes(&seed);
            let chain_id = Hash::default();
            let env = Envelope::build_signed(
                Hash::default(),
                1_000,
                5,
                inner,
                &signer,
                &chain_id,
            );
            let mut bytes = env.bytes().to_vec();
            let at = flip.index(bytes.len());
            bytes[at] ^= 0x01;
            // Either the tampered bytes no longer parse, or the signature
            // check catches the flip.
            if let Ok(parsed) = Envelope::parse(&bytes) {
                prop_assert!(parsed.verify_signature(true, &chain_id).is_err());
            }
        }
    }
}
