/// Default read size for the async streaming decoder.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// Configuration for the decoders.
///
/// ```text
/// ┌────────────────────┬──────────────────────────────────────────────┐
/// │ Field              │ Purpose                                      │
/// ├────────────────────┼──────────────────────────────────────────────┤
/// │ max_buffered_bytes │ Cap on one unterminated line; 0 = unlimited  │
/// │ read_chunk_size    │ Bytes requested per read from the reader     │
/// └────────────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest partial line held while waiting for its terminator.
    ///
    /// Exceeding it fails the response with
    /// [`WireError::LineTooLong`](chtsv_wire::WireError::LineTooLong).
    pub max_buffered_bytes: usize,

    /// Size of the read buffer used by
    /// [`StreamingDecoder`](crate::StreamingDecoder). Has no effect on
    /// the push decoder, which takes whatever chunks it is given.
    pub read_chunk_size: usize,
}

impl Default for DecoderConfig {
    /// Unlimited line length, 64 KiB reads.
    fn default() -> Self {
        Self {
            max_buffered_bytes: 0,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}
