//! Fuzz the envelope codec with arbitrary byte strings.
//!
//! Goals:
//! - No panics on malformed input.
//! - Anything that parses re-serializes to the identical bytes (and the
//!   same id), so transport and persistence agree.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tempo_proposer_vm::Envelope;

fuzz_target!(|data: &[u8]| {
    if let Ok(envelope) = Envelope::parse(data) {
        assert_eq!(envelope.bytes(), data);
        let reparsed = Envelope::parse(envelope.bytes()).expect("canonical bytes reparse");
        assert_eq!(reparsed.id(), envelope.id());
        assert_eq!(reparsed.is_signed(), envelope.is_signed());
    }
});
