use std::collections::VecDeque;

use chtsv_types::{ExtraData, TsvFormat, TypeTag, Value};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::DecoderConfig;
use crate::decompression::ContentFilter;
use crate::error::DecodeError;
use crate::incremental::ChunkDecoder;

/// Events emitted while decoding a response.
///
/// A stream yields the header events first (when the layout has them),
/// then row batches in byte order, and exactly one `Extra` event last:
///
/// ```text
///   Names(["id", "name"])          ← WithNames, WithNamesAndTypes
///   Types(["UInt32", "String"])    ← WithNamesAndTypes
///   Rows([...])
///   Rows([...])
///   ...
///   Extra { totals?, extremes? }   ← always, after the last batch
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum DecoderEvent {
  /// The Names row has been read.
  Names(Vec<String>),

  /// The Types row has been read.
  Types(Vec<String>),

  /// A batch of data rows, in source order.
  Rows(Vec<Value>),

  /// End of stream: the aggregate rows, if any.
  Extra(ExtraData),
}

/// Asynchronous streaming decoder over any `AsyncRead` body.
///
/// Reads `read_chunk_size` bytes at a time, runs them through the
/// content filter and the [`ChunkDecoder`], and hands the resulting
/// events out one by one. Backpressure is natural: nothing is read
/// until the caller awaits the next event. Dropping the decoder early
/// releases everything it holds.
///
/// # Example
///
/// ```rust,no_run
/// use chtsv_decoder::{DecoderEvent, StreamingDecoder};
/// use chtsv_types::TsvFormat;
/// use tokio::io::AsyncRead;
///
/// async fn count_rows(body: impl AsyncRead + Unpin) -> usize {
///     let mut stream = StreamingDecoder::new(body, TsvFormat::WITH_NAMES);
///     let mut count = 0;
///     while let Some(event) = stream.next().await.transpose().unwrap() {
///         if let DecoderEvent::Rows(rows) = event {
///             count += rows.len();
///         }
///     }
///     count
/// }
/// ```
pub struct StreamingDecoder<R> {
  reader: R,
  decoder: ChunkDecoder,
  filter: ContentFilter,
  state: StreamState,
  /// Events decoded from the last read but not yet handed out.
  pending: VecDeque<DecoderEvent>,
  /// Read buffer, reused across reads.
  buf: Vec<u8>,
}

/// ```text
///   Reading → Done
/// ```
///
/// `Done` is entered on end of body or on the first error. Pending
/// events are still drained after end of body, never after an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StreamState {
  Reading,
  Done,
}

impl<R: AsyncRead + Unpin> StreamingDecoder<R> {
  #[must_use]
  pub fn new(reader: R, format: TsvFormat) -> Self {
    Self::with_config(reader, format, DecoderConfig::default())
  }

  #[must_use]
  pub fn with_config(reader: R, format: TsvFormat, config: DecoderConfig) -> Self {
    Self {
      reader,
      decoder: ChunkDecoder::with_config(format, &config),
      filter: ContentFilter::identity(),
      state: StreamState::Reading,
      pending: VecDeque::new(),
      buf: vec![0; config.read_chunk_size.max(1)],
    }
  }

  /// Run the body through `filter` before decoding.
  #[must_use]
  pub fn with_filter(mut self, filter: ContentFilter) -> Self {
    self.filter = filter;
    self
  }

  /// Column names, once the Names row has been decoded.
  #[must_use]
  pub fn names(&self) -> Option<&[String]> {
    self.decoder.names()
  }

  /// Parsed column types, once the Types row has been decoded.
  #[must_use]
  pub fn types(&self) -> Option<&[TypeTag]> {
    self.decoder.types()
  }

  /// Read the next event.
  ///
  /// Returns `Some(Ok(event))` for each event, `None` once the `Extra`
  /// event has been handed out, or `Some(Err(_))` once on the first
  /// failure, after which the stream is exhausted.
  pub async fn next(&mut self) -> Option<Result<DecoderEvent, DecodeError>> {
    loop {
      if let Some(event) = self.pending.pop_front() {
        return Some(Ok(event));
      }
      if self.state == StreamState::Done {
        return None;
      }
      if let Err(e) = self.fill().await {
        self.state = StreamState::Done;
        self.pending.clear();
        return Some(Err(e));
      }
    }
  }

  /// Read once and decode whatever that completes.
  async fn fill(&mut self) -> Result<(), DecodeError> {
    let n = self.reader.read(&mut self.buf).await?;

    if n == 0 {
      self.state = StreamState::Done;
      let tail = self.filter.finish()?;
      if !tail.is_empty() {
        self.pending.extend(self.decoder.feed(&tail)?);
      }
      self.pending.extend(self.decoder.finish()?);
      return Ok(());
    }

    let bytes = self.filter.push(&self.buf[..n])?;
    if !bytes.is_empty() {
      self.pending.extend(self.decoder.feed(&bytes)?);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::pin::Pin;
  use std::task::{Context, Poll};
  use tokio::io::ReadBuf;

  /// Reader that hands out its data in fixed-size pieces.
  struct Trickle {
    data: Vec<u8>,
    pos: usize,
    step: usize,
  }

  impl AsyncRead for Trickle {
    fn poll_read(
      mut self: Pin<&mut Self>,
      _cx: &mut Context<'_>,
      buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
      let end = (self.pos + self.step).min(self.data.len()).min(self.pos + buf.remaining());
      let start = self.pos;
      buf.put_slice(&self.data[start..end]);
      self.pos = end;
      Poll::Ready(Ok(()))
    }
  }

  async fn collect<R: AsyncRead + Unpin>(
    mut stream: StreamingDecoder<R>,
  ) -> Result<Vec<DecoderEvent>, DecodeError> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
      events.push(event?);
    }
    Ok(events)
  }

  #[tokio::test]
  async fn streams_events_in_order() {
    let body = b"a\tb\nString\tUInt8\nx\t1\ny\t2\n".to_vec();
    let reader = Trickle { data: body, pos: 0, step: 3 };
    let events = collect(StreamingDecoder::new(reader, TsvFormat::WITH_NAMES_AND_TYPES))
      .await
      .unwrap();

    assert!(matches!(events.first(), Some(DecoderEvent::Names(_))));
    assert!(matches!(events.get(1), Some(DecoderEvent::Types(_))));
    assert!(matches!(events.last(), Some(DecoderEvent::Extra(_))));
    let rows: Vec<Value> = events
      .into_iter()
      .filter_map(|e| match e {
        DecoderEvent::Rows(rows) => Some(rows),
        _ => None,
      })
      .flatten()
      .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("b"), Some(&Value::Int(2)));
  }

  #[tokio::test]
  async fn small_read_buffer() {
    let config = DecoderConfig {
      read_chunk_size: 1,
      ..DecoderConfig::default()
    };
    let events = collect(StreamingDecoder::with_config(
      &b"1\t2\n3\t4"[..],
      TsvFormat::TAB_SEPARATED,
      config,
    ))
    .await
    .unwrap();
    let batches = events
      .iter()
      .filter(|e| matches!(e, DecoderEvent::Rows(_)))
      .count();
    assert_eq!(batches, 2);
  }

  #[tokio::test]
  async fn zstd_body() {
    let plain = b"n\n1\n2\n3\n".to_vec();
    let compressed = zstd::encode_all(&plain[..], 1).unwrap();
    let filter = ContentFilter::for_header(Some("zstd")).unwrap();
    let stream = StreamingDecoder::new(&compressed[..], TsvFormat::WITH_NAMES).with_filter(filter);
    let events = collect(stream).await.unwrap();
    let count: usize = events
      .iter()
      .map(|e| match e {
        DecoderEvent::Rows(rows) => rows.len(),
        _ => 0,
      })
      .sum();
    assert_eq!(count, 3);
  }

  #[tokio::test]
  async fn error_ends_the_stream() {
    let mut stream = StreamingDecoder::new(&b"n\nInt8\nx\n"[..], TsvFormat::WITH_NAMES_AND_TYPES);
    let mut saw_error = false;
    while let Some(event) = stream.next().await {
      if event.is_err() {
        saw_error = true;
      }
    }
    assert!(saw_error);
    assert!(stream.next().await.is_none());
  }

  #[tokio::test]
  async fn header_accessors() {
    let mut stream = StreamingDecoder::new(&b"id\nUInt8\n1\n"[..], TsvFormat::WITH_NAMES_AND_TYPES);
    while stream.next().await.is_some() {}
    assert_eq!(stream.names(), Some(&["id".to_string()][..]));
    assert_eq!(stream.types(), Some(&[TypeTag::UInt8][..]));
  }
}
