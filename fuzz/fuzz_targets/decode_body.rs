#![no_main]

use chtsv_decoder::TsvDecoder;
use chtsv_types::TsvFormat;
use libfuzzer_sys::fuzz_target;

// Fuzz target: whole-body decoding under every TabSeparated variant.
//
// Input format:
//   - First byte: variant selector (mod 6)
//   - Remaining bytes: the response body
//
// Catches bugs in:
// - Row classification around blank separator lines
// - Header rows with odd widths or unparsable type names
// - Value grammar panics on malformed numbers, dates and arrays
fuzz_target!(|data: &[u8]| {
    let Some((&selector, body)) = data.split_first() else {
        return;
    };

    let format = match selector % 6 {
        0 => TsvFormat::TAB_SEPARATED,
        1 => TsvFormat::TAB_SEPARATED_RAW,
        2 => TsvFormat::WITH_NAMES,
        3 => TsvFormat::WITH_NAMES_AND_TYPES,
        4 => TsvFormat::RAW_WITH_NAMES,
        _ => TsvFormat::RAW_WITH_NAMES_AND_TYPES,
    };

    let _ = TsvDecoder::decode(format, body);
});
