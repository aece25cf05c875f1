/// Errors raised while framing the raw byte stream into lines.
///
/// The framing layer never interprets column contents, so the only
/// failure it can report is a resource limit: a partial line that keeps
/// growing without ever reaching a terminator.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// More than `limit` bytes were buffered without a line terminator.
    ///
    /// Only raised when the buffer was built with a non-zero limit via
    /// [`LineBuffer::with_limit`](crate::LineBuffer::with_limit).
    #[error("line too long: {buffered} bytes buffered without a terminator (limit {limit})")]
    LineTooLong { buffered: usize, limit: usize },
}
