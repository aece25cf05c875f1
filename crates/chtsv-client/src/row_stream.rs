use std::collections::VecDeque;

use chtsv_decoder::{DecodedBody, DecoderEvent, StreamingDecoder};
use chtsv_types::{ColumnMeta, ExtraData, Extremes, Value};
use tokio::io::AsyncRead;

use crate::error::ClientError;
use crate::response::ResponseMeta;
use crate::result::QueryResult;

/// Live sequence of rows from one response.
///
/// Rows are handed out as soon as the decoder completes them. Column
/// metadata is available once the header rows have been read; totals
/// and extremes only once the stream is exhausted.
///
/// ```text
///   next() / next_batch()  ──►  rows, in source order
///   meta()                 ──►  after the header rows
///   totals() / extremes()  ──►  after next() returns None
/// ```
///
/// Dropping the stream early stops reading the body.
pub struct RowStream<R> {
    decoder: StreamingDecoder<R>,
    response: ResponseMeta,
    buffered: VecDeque<Value>,
    names: Option<Vec<String>>,
    types: Option<Vec<String>>,
    extra: Option<ExtraData>,
    finished: bool,
}

impl<R: AsyncRead + Unpin> RowStream<R> {
    pub(crate) fn new(decoder: StreamingDecoder<R>, response: ResponseMeta) -> Self {
        Self {
            decoder,
            response,
            buffered: VecDeque::new(),
            names: None,
            types: None,
            extra: None,
            finished: false,
        }
    }

    /// Next row, or `None` at end of stream.
    pub async fn next(&mut self) -> Option<Result<Value, ClientError>> {
        loop {
            if let Some(row) = self.buffered.pop_front() {
                return Some(Ok(row));
            }
            match self.next_batch().await? {
                Ok(rows) => self.buffered.extend(rows),
                Err(e) => return Some(Err(e)),
            }
        }
    }

    /// Next batch of rows as produced by the decoder, or `None` at end
    /// of stream. Batches are never empty.
    pub async fn next_batch(&mut self) -> Option<Result<Vec<Value>, ClientError>> {
        if !self.buffered.is_empty() {
            return Some(Ok(self.buffered.drain(..).collect()));
        }
        while !self.finished {
            match self.decoder.next().await {
                Some(Ok(DecoderEvent::Names(names))) => self.names = Some(names),
                Some(Ok(DecoderEvent::Types(types))) => self.types = Some(types),
                Some(Ok(DecoderEvent::Rows(rows))) => return Some(Ok(rows)),
                Some(Ok(DecoderEvent::Extra(extra))) => self.extra = Some(extra),
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
                None => self.finished = true,
            }
        }
        None
    }

    /// Column metadata seen so far. Empty until the Names row arrives,
    /// and always empty for layouts without names.
    #[must_use]
    pub fn meta(&self) -> Vec<ColumnMeta> {
        self.names
            .as_deref()
            .map(|names| ColumnMeta::zip(names, self.types.as_deref()))
            .unwrap_or_default()
    }

    /// Totals row; `None` until the stream is exhausted.
    #[must_use]
    pub fn totals(&self) -> Option<&Value> {
        self.extra.as_ref()?.totals.as_ref()
    }

    /// Extremes rows; `None` until the stream is exhausted.
    #[must_use]
    pub fn extremes(&self) -> Option<&Extremes> {
        self.extra.as_ref()?.extremes.as_ref()
    }

    #[must_use]
    pub fn response(&self) -> &ResponseMeta {
        &self.response
    }

    /// True once the end of the body (or an error) has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Drain the remaining rows into a materialized result.
    ///
    /// # Errors
    ///
    /// The first error the remaining body produces.
    pub async fn into_result(mut self) -> Result<QueryResult, ClientError> {
        let mut rows: Vec<Value> = self.buffered.drain(..).collect();
        while let Some(batch) = self.next_batch().await {
            rows.extend(batch?);
        }
        let body = DecodedBody {
            names: self.names.take(),
            types: self.types.take(),
            rows,
            extra: self.extra.take().unwrap_or_default(),
        };
        Ok(QueryResult::from_decoded(body, self.response))
    }
}
