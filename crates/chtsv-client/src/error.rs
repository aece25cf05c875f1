use chtsv_decoder::DecodeError;

/// Errors surfaced by the client layer.
///
/// ```text
/// ┌───────────────────┬────────────────────────────────────────────────┐
/// │ Variant           │ Cause                                          │
/// ├───────────────────┼────────────────────────────────────────────────┤
/// │ Server            │ Non-2xx status; message is the response body   │
/// │ UnsupportedFormat │ Format header names no supported format        │
/// │ StreamingJson     │ Row streaming requested for a JSON response    │
/// │ Decode            │ Any failure while decoding the body            │
/// │ Json              │ JSON response body is not valid JSON           │
/// │ Io                │ Transport failed before a response existed     │
/// └───────────────────┴────────────────────────────────────────────────┘
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unsupported format: {name}")]
    UnsupportedFormat { name: String },

    #[error("JSON responses cannot be streamed row by row")]
    StreamingJson,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
