use serde::Serialize;

/// Header carrying the name of the output format the server chose.
pub const FORMAT_HEADER: &str = "X-ClickHouse-Format";

/// Header naming the body's content encoding.
pub const ENCODING_HEADER: &str = "Content-Encoding";

/// Status line and headers of a transport response, kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl ResponseMeta {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header named `name`, compared case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The format the server reports for the body, if any.
    #[must_use]
    pub fn format_name(&self) -> Option<&str> {
        self.header(FORMAT_HEADER)
    }

    #[must_use]
    pub fn content_encoding(&self) -> Option<&str> {
        self.header(ENCODING_HEADER)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A response handed over by the transport: metadata plus a body
/// reader that yields bytes in delivery order.
#[derive(Debug)]
pub struct Response<R> {
    pub meta: ResponseMeta,
    pub body: R,
}

impl<R> Response<R> {
    #[must_use]
    pub fn new(status: u16, body: R) -> Self {
        Self {
            meta: ResponseMeta::new(status),
            body,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta = self.meta.with_header(name, value);
        self
    }
}
