#![no_main]

use arbitrary::Arbitrary;
use chtsv_decoder::decode_value;
use chtsv_types::{Escaping, TypeTag};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    type_name: &'a str,
    raw: bool,
    value: &'a [u8],
}

// Fuzz target: a single field decoded under an arbitrary declared type.
//
// Catches bugs in:
// - Array literal splitting (unbalanced quotes and brackets, escapes)
// - Big integer and float parsing
// - Nullable and LowCardinality unwrapping
fuzz_target!(|input: Input<'_>| {
    let tag = TypeTag::parse(input.type_name);
    let escaping = if input.raw {
        Escaping::Raw
    } else {
        Escaping::Standard
    };
    let _ = decode_value(input.value, Some(&tag), escaping);
});
