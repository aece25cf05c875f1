use std::future::Future;

use chtsv_decoder::{ContentFilter, StreamingDecoder};
use chtsv_types::{ResponseFormat, TsvFormat};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::response::{Response, ResponseMeta};
use crate::result::QueryOutput;
use crate::row_stream::RowStream;

/// The external transport: sends a query and returns the raw response.
///
/// Implementations own connection handling, credentials, retries and
/// any `gzip`/`br`/`deflate` decompression. They hand back the status,
/// the headers and a body reader; everything after that happens here.
///
/// ```text
///   query ──► Transport::execute ──► Response { status, headers, body }
///                                          │
///                                   ResponseDecoder
///                                    ├── collect() ──► QueryOutput
///                                    └── stream()  ──► RowStream
/// ```
pub trait Transport {
    type Body: AsyncRead + Unpin;

    /// Send `query` and return the response once its headers are in.
    ///
    /// # Errors
    ///
    /// Any I/O failure before a response exists.
    fn execute(
        &self,
        query: &str,
    ) -> impl Future<Output = std::io::Result<Response<Self::Body>>> + Send;
}

/// Turns transport responses into results.
///
/// Selects the format from the `X-ClickHouse-Format` header (falling back
/// to [`ClientConfig::format_override`], then to `TabSeparated`), sets up
/// the content filter from `Content-Encoding`, and runs the body through
/// the streaming decoder in one of two modes:
///
/// 1. **Materializing** ([`collect`](Self::collect)): every batch is
///    concatenated into one [`QueryResult`](crate::QueryResult).
/// 2. **Streaming** ([`stream`](Self::stream)): batches are handed to the
///    caller as they are decoded.
///
/// A non-2xx status never reaches the decoder; the body text becomes
/// [`ClientError::Server`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseDecoder {
    config: ClientConfig,
}

impl ResponseDecoder {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Format for a response with the given metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnsupportedFormat`] when the header names a
    /// format outside the TabSeparated family and `JSON`.
    pub fn resolve_format(&self, meta: &ResponseMeta) -> Result<ResponseFormat, ClientError> {
        match meta.format_name() {
            Some(name) => name.parse().map_err(|_| ClientError::UnsupportedFormat {
                name: name.to_string(),
            }),
            None => Ok(self
                .config
                .format_override
                .unwrap_or(ResponseFormat::Tsv(TsvFormat::default()))),
        }
    }

    /// Materialize a whole response.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Server`] for a non-2xx status.
    /// - [`ClientError::UnsupportedFormat`] for an unknown format header.
    /// - [`ClientError::Decode`] for any decoding failure; no partial
    ///   result is returned.
    /// - [`ClientError::Json`] for a malformed `JSON` body.
    pub async fn collect<R: AsyncRead + Unpin>(
        &self,
        response: Response<R>,
    ) -> Result<QueryOutput, ClientError> {
        let Response { meta, mut body } = response;
        if !meta.is_success() {
            return Err(server_error(meta.status, &mut body).await);
        }

        match self.select(&meta)? {
            ResponseFormat::Json => {
                let mut filter = ContentFilter::for_header(meta.content_encoding())?;
                let mut raw = Vec::new();
                body.read_to_end(&mut raw).await?;
                let mut bytes = filter.push(&raw)?.into_owned();
                bytes.extend(filter.finish()?);
                let document = serde_json::from_slice(&bytes)?;
                Ok(QueryOutput::Json {
                    document,
                    response: meta,
                })
            }
            ResponseFormat::Tsv(format) => {
                let stream = self.row_stream(format, meta, body)?;
                stream.into_result().await.map(QueryOutput::Tabular)
            }
        }
    }

    /// Start streaming rows from a response.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Server`] for a non-2xx status.
    /// - [`ClientError::UnsupportedFormat`] for an unknown format header.
    /// - [`ClientError::StreamingJson`] for a `JSON` body.
    /// - [`ClientError::Decode`] for an unsupported content encoding.
    ///   Decoding errors surface later, from the stream itself.
    pub async fn stream<R: AsyncRead + Unpin>(
        &self,
        response: Response<R>,
    ) -> Result<RowStream<R>, ClientError> {
        let Response { meta, mut body } = response;
        if !meta.is_success() {
            return Err(server_error(meta.status, &mut body).await);
        }

        match self.select(&meta)? {
            ResponseFormat::Json => Err(ClientError::StreamingJson),
            ResponseFormat::Tsv(format) => self.row_stream(format, meta, body),
        }
    }

    fn select(&self, meta: &ResponseMeta) -> Result<ResponseFormat, ClientError> {
        let format = self.resolve_format(meta)?;
        debug!(
            %format,
            status = meta.status,
            encoding = meta.content_encoding().unwrap_or("identity"),
            "selected response format"
        );
        Ok(format)
    }

    fn row_stream<R: AsyncRead + Unpin>(
        &self,
        format: TsvFormat,
        meta: ResponseMeta,
        body: R,
    ) -> Result<RowStream<R>, ClientError> {
        let filter = ContentFilter::for_header(meta.content_encoding())?;
        let decoder =
            StreamingDecoder::with_config(body, format, self.config.decoder).with_filter(filter);
        Ok(RowStream::new(decoder, meta))
    }
}

async fn server_error<R: AsyncRead + Unpin>(status: u16, body: &mut R) -> ClientError {
    let mut raw = Vec::new();
    if let Err(e) = body.read_to_end(&mut raw).await {
        return ClientError::Io(e);
    }
    ClientError::Server {
        status,
        message: String::from_utf8_lossy(&raw).trim_end().to_string(),
    }
}

/// Query client over a [`Transport`].
///
/// The two public operations:
///
/// ```text
///   query(sql)         ──►  QueryOutput   (everything in memory)
///   query_stream(sql)  ──►  RowStream     (rows as they arrive)
/// ```
pub struct Client<T> {
    transport: T,
    decoder: ResponseDecoder,
}

impl<T: Transport> Client<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    #[must_use]
    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            decoder: ResponseDecoder::new(config),
        }
    }

    /// Run `query` and materialize the whole result.
    ///
    /// # Errors
    ///
    /// [`ClientError::Io`] when the transport fails, otherwise as
    /// [`ResponseDecoder::collect`].
    pub async fn query(&self, query: &str) -> Result<QueryOutput, ClientError> {
        let response = self.transport.execute(query).await?;
        self.decoder.collect(response).await
    }

    /// Run `query` and stream its rows.
    ///
    /// # Errors
    ///
    /// [`ClientError::Io`] when the transport fails, otherwise as
    /// [`ResponseDecoder::stream`].
    pub async fn query_stream(&self, query: &str) -> Result<RowStream<T::Body>, ClientError> {
        let response = self.transport.execute(query).await?;
        self.decoder.stream(response).await
    }
}
