//! Property-based invariants for reply parsing, sequence encoding and
//! resolution.
//!
//! 1. Parsing never panics and never yields more fields than separators + 1.
//! 2. Well-formed replies parse back to the exact field list.
//! 3. Encoding either fails or produces bytes starting with ESC.
//! 4. Resolution is total and monotone in DA1 sixel reporting.

use proptest::prelude::*;
use termpix_core::probe::{DeviceAttributes, parse_response};
use termpix_core::resolve::{GraphicsTransport, resolve};
use termpix_core::sequences::{SequenceCapabilityOracle, TermInfo, TermSeq};

fn seq_strategy() -> impl Strategy<Value = TermSeq> {
    proptest::sample::select(TermSeq::ALL.to_vec())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Parsing is total
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn parse_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
        let fields = parse_response(&bytes);
        if bytes.len() < 4 {
            prop_assert!(fields.is_empty());
        } else {
            let separators = bytes[3..].iter().filter(|&&b| b == b';').count();
            prop_assert!(fields.len() <= separators + 1);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Well-formed DA1 replies parse exactly
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn well_formed_reply_parses_exactly(codes in proptest::collection::vec(any::<u32>(), 1..12)) {
        let body = codes.iter().map(u32::to_string).collect::<Vec<_>>().join(";");
        let reply = format!("\x1b[?{body}");
        prop_assert_eq!(parse_response(reply.as_bytes()), codes);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Encoding is all-or-nothing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn encode_is_all_or_nothing(
        seq in seq_strategy(),
        args in proptest::collection::vec(0u32..400, 0..7),
    ) {
        let info = TermInfo::with_seqs("all", TermSeq::ALL);
        match info.encode(seq, &args) {
            Ok(bytes) => {
                prop_assert_eq!(args.len(), seq.template().arity());
                prop_assert!(bytes.first() == Some(&0x1b) || bytes == b"\x07");
            }
            Err(_) => {}
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Resolution is total; DA1 code 4 only ever upgrades to sixel
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resolve_total_and_sixel_monotone(
        seqs in proptest::collection::vec(seq_strategy(), 0..20),
        mut codes in proptest::collection::vec(0u32..64, 0..8),
    ) {
        let info = TermInfo::with_seqs("random", &seqs);
        let without = resolve(&info, &DeviceAttributes::new(codes.clone()));
        codes.push(4);
        let with = resolve(&info, &DeviceAttributes::new(codes));

        prop_assert_eq!(without.color_model, with.color_model);
        if without.graphics_transport == GraphicsTransport::Symbols {
            prop_assert_eq!(with.graphics_transport, GraphicsTransport::Sixel);
        } else {
            prop_assert_eq!(without.graphics_transport, with.graphics_transport);
        }
    }
}
