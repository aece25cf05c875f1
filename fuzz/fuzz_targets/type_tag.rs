#![no_main]

use chtsv_types::TypeTag;
use libfuzzer_sys::fuzz_target;

// Fuzz target: type name parsing.
//
// Parsing never fails; anything unrecognised becomes `Unsupported`.
//
// Catches bugs in:
// - Byte offsets that split a multi-byte character
// - Unbalanced parentheses and unterminated quoted timezones
// - Unbounded recursion on deeply nested wrappers
fuzz_target!(|name: &str| {
    let tag = TypeTag::parse(name);
    let _ = tag.to_string();
    let _ = tag.is_quoted_in_array();
});
