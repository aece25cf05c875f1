#![no_main]

use arbitrary::Arbitrary;
use chtsv_decoder::TsvDecoder;
use chtsv_types::TsvFormat;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    typed: bool,
    cuts: Vec<u16>,
    body: &'a [u8],
}

// Fuzz target: the same body fed whole and in arbitrary slices must
// produce the same outcome.
//
// Catches bugs in:
// - Terminator scanning that resumes from the wrong offset
// - Rows split across chunks being decoded twice or dropped
// - Classifier state leaking between regions
fuzz_target!(|input: Input<'_>| {
    let format = if input.typed {
        TsvFormat::WITH_NAMES_AND_TYPES
    } else {
        TsvFormat::WITH_NAMES
    };

    let mut cuts: Vec<usize> = input
        .cuts
        .iter()
        .map(|&c| usize::from(c) % (input.body.len() + 1))
        .collect();
    cuts.sort_unstable();

    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for cut in cuts {
        chunks.push(&input.body[start..cut]);
        start = cut;
    }
    chunks.push(&input.body[start..]);

    let whole = TsvDecoder::decode(format, input.body);
    let sliced = TsvDecoder::decode_chunks(format, chunks);

    match (whole, sliced) {
        // NaN never equals itself; compare the Debug rendering.
        (Ok(a), Ok(b)) => assert_eq!(format!("{a:?}"), format!("{b:?}")),
        (Err(_), Err(_)) => {}
        (a, b) => panic!("whole {a:?} vs sliced {b:?}"),
    }
});
