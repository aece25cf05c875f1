use bytes::{Bytes, BytesMut};

use crate::error::WireError;

/// Byte that ends every row on the wire.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Incremental line buffer. Turns arbitrarily-chunked input into
/// regions that end exactly on a line boundary.
///
/// Network chunks never line up with rows. Each call to
/// [`feed`](Self::feed) appends the chunk and looks for the *last*
/// terminator in the bytes it has not examined yet. Everything up to and
/// including that terminator is split off and returned; the trailing
/// partial line stays behind for the next chunk.
///
/// ```text
///   feed("a\tb\nc\t")   → Some("a\tb\n")   buffer: "c\t"
///   feed("d")           → None             buffer: "c\td"
///   feed("\ne\tf\n")    → Some("c\td\ne\tf\n")  buffer: ""
/// ```
///
/// The `scanned` cursor records how many leading bytes of the buffer
/// are known to be terminator-free, so repeated small chunks cost
/// O(new bytes) each instead of rescanning the whole partial line.
///
/// Splitting uses [`BytesMut::split_to`], which hands the complete
/// region out without copying it.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: BytesMut,
    /// Prefix length of `buf` already searched for a terminator.
    scanned: usize,
    /// Maximum partial-line length in bytes. Zero disables the check.
    limit: usize,
}

impl LineBuffer {
    /// Create an unbounded line buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a line buffer that refuses to hold more than `limit`
    /// bytes of a single unterminated line. A `limit` of zero means
    /// unbounded.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Append a chunk and return the longest complete region, if any.
    ///
    /// Returns `Ok(None)` while no new terminator has arrived; the
    /// caller should keep feeding.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::LineTooLong`] when a limit is configured and
    /// the unterminated tail exceeds it.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Option<Bytes>, WireError> {
        self.buf.extend_from_slice(chunk);

        let region = last_terminator(&self.buf, self.scanned)
            .map(|end| self.buf.split_to(end + 1).freeze());

        // Whatever is left holds no terminator: either nothing matched, or
        // the match was the last one in the buffer.
        self.scanned = self.buf.len();
        self.check_limit()?;
        Ok(region)
    }

    /// Drain whatever partial line is left once the input has ended.
    ///
    /// Returns `None` when the buffer is empty.
    pub fn finish(&mut self) -> Option<Bytes> {
        self.scanned = 0;
        if self.buf.is_empty() {
            None
        } else {
            Some(self.buf.split().freeze())
        }
    }

    /// Number of bytes currently held back as an incomplete line.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    fn check_limit(&self) -> Result<(), WireError> {
        if self.limit > 0 && self.buf.len() > self.limit {
            return Err(WireError::LineTooLong {
                buffered: self.buf.len(),
                limit: self.limit,
            });
        }
        Ok(())
    }
}

/// Scan backward from the end of `buf` down to `floor` for the last
/// terminator.
///
/// Offset 0 is never reported: a terminator at the very origin of the
/// buffer is left for the next region (or for [`LineBuffer::finish`]).
fn last_terminator(buf: &[u8], floor: usize) -> Option<usize> {
    (floor.max(1)..buf.len())
        .rev()
        .find(|&i| buf[i] == LINE_TERMINATOR)
}
