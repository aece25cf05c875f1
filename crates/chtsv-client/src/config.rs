use chtsv_decoder::DecoderConfig;
use chtsv_types::ResponseFormat;

/// Configuration for [`ResponseDecoder`](crate::ResponseDecoder) and
/// [`Client`](crate::Client).
///
/// ```text
/// ┌─────────────────┬──────────────────────────────────────────────────┐
/// │ Field           │ Purpose                                          │
/// ├─────────────────┼──────────────────────────────────────────────────┤
/// │ format_override │ Format to assume when no format header is sent   │
/// │ decoder         │ Line-length limit and read size for the decoder  │
/// └─────────────────┴──────────────────────────────────────────────────┘
/// ```
///
/// A format reported by the server always wins over `format_override`.
/// With neither, the body is decoded as plain `TabSeparated`, the
/// server's default output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub format_override: Option<ResponseFormat>,
    pub decoder: DecoderConfig,
}
