#![no_main]

use arbitrary::Arbitrary;
use chtsv_wire::{LineBuffer, RowSplitter, COLUMN_SEPARATOR, LINE_TERMINATOR};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    chunks: Vec<&'a [u8]>,
}

// Fuzz target: the byte layer on its own, fed arbitrary chunks.
//
// Checks:
// - Every region handed out by `feed` ends on a terminator
// - Regions plus the final tail reproduce the input exactly
// - Column spans stay inside their region, in order, and never cover a
//   separator or terminator byte
fuzz_target!(|input: Input<'_>| {
    let mut buffer = LineBuffer::new();
    let mut splitter = RowSplitter::new();
    let mut rebuilt = Vec::new();

    let check = |region: &[u8], splitter: &mut RowSplitter| {
        let mut prev_end = 0;
        for row in splitter.split(region) {
            assert!(!row.columns.is_empty());
            if row.blank {
                assert_eq!(row.columns.len(), 1);
                assert!(row.columns[0].is_empty());
            }
            for span in &row.columns {
                assert!(span.start >= prev_end && span.end <= region.len());
                assert!(!region[span.clone()]
                    .iter()
                    .any(|&b| b == COLUMN_SEPARATOR || b == LINE_TERMINATOR));
                prev_end = span.end;
            }
        }
    };

    for chunk in &input.chunks {
        if let Some(region) = buffer.feed(chunk).unwrap() {
            assert_eq!(region.last(), Some(&LINE_TERMINATOR));
            check(&region[..], &mut splitter);
            rebuilt.extend_from_slice(&region);
        }
    }
    if let Some(tail) = buffer.finish() {
        check(&tail[..], &mut splitter);
        rebuilt.extend_from_slice(&tail);
    }

    assert_eq!(rebuilt, input.chunks.concat());
    assert_eq!(buffer.buffered(), 0);
});
