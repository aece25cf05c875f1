use chtsv_types::{TypeError, TypeTag};
use chtsv_wire::WireError;

/// Errors that can occur while decoding a TabSeparated response.
///
/// Every error is terminal for the response being decoded: once a value
/// fails, its row fails, and the whole response fails with it. Nothing
/// is retried or replaced by a default.
///
/// Error hierarchy:
///
/// ```text
///   DecodeError
///   ├── UnsupportedFormat          ← format name the decoder cannot handle
///   ├── UnsupportedType            ← column type with no decode rule
///   ├── InvalidValue               ← text not valid for its declared type
///   ├── ColumnCount                ← data row width differs from Names row
///   ├── ExtraRowCount              ← trailing aggregate rows not 0..=3
///   ├── UnsupportedEncoding        ← content encoding not removed upstream
///   ├── DecompressFailed           ← zstd stream error
///   ├── Wire(WireError)            ← from chtsv-wire line framing
///   ├── Type(TypeError)            ← from chtsv-types format parsing
///   └── Transport(std::io::Error)  ← from the underlying reader
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The transport selected a format outside the TabSeparated family.
    ///
    /// Raised before any byte is decoded. `JSON` also lands here when it
    /// reaches the row decoder; JSON bodies are handled by the client.
    #[error("unsupported format: {name}")]
    UnsupportedFormat { name: String },

    /// A column's declared type has no decode rule.
    #[error("unsupported type: {tag}")]
    UnsupportedType { tag: String },

    /// The value text does not parse as its declared type.
    #[error("invalid {tag} value: {text:?}")]
    InvalidValue { tag: String, text: String },

    /// A data row has a different number of columns than the Names row.
    #[error("row has {found} columns, expected {expected}")]
    ColumnCount { expected: usize, found: usize },

    /// The trailing aggregate section held a number of rows that is
    /// neither totals, extremes, nor both.
    #[error("unexpected number of extra rows: {count} (expected 0 to 3)")]
    ExtraRowCount { count: usize },

    /// The body still carries a content encoding this crate does not
    /// decode. gzip, br and deflate must be removed by the transport.
    #[error("unsupported content encoding: {encoding}")]
    UnsupportedEncoding { encoding: String },

    /// Zstd decompression failed.
    #[error("zstd decompression failed: {0}")]
    DecompressFailed(String),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Type(#[from] TypeError),

    /// An I/O error from the transport's body reader.
    #[error(transparent)]
    Transport(#[from] std::io::Error),
}

impl DecodeError {
    pub(crate) fn invalid(tag: &TypeTag, text: &[u8]) -> Self {
        Self::InvalidValue {
            tag: tag.to_string(),
            text: String::from_utf8_lossy(text).into_owned(),
        }
    }
}
