use chtsv_types::{ResponseFormat, TsvFormat, TypeTag, Value};
use chtsv_wire::{LineBuffer, RowSplitter};
use tracing::{debug, trace};

use crate::classifier::{resolve_extra, RowClassifier, RowKind};
use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::schema::{header_texts, Schema};
use crate::streaming::DecoderEvent;

/// Push decoder: chunks in, events out.
///
/// This is the synchronous core shared by every consumption path. It
/// composes the line buffer, the row splitter, the row classifier and
/// the value decoder:
///
/// ```text
///   chunk ─► LineBuffer ─► RowSplitter ─► RowClassifier ─┬─► Names / Types
///                                                          ├─► Rows (per region)
///                                                          └─► extra buffer
///   finish ─► flush tail ─► Extra(totals, extremes)
/// ```
///
/// Events come out in byte-stream order. `Names` and `Types` precede
/// every `Rows` batch, and exactly one `Extra` event is produced by
/// [`finish`](Self::finish), after the last batch. Chunk boundaries have
/// no effect on the decoded rows.
#[derive(Debug)]
pub struct ChunkDecoder {
    format: TsvFormat,
    lines: LineBuffer,
    splitter: RowSplitter,
    classifier: RowClassifier,
    schema: Schema,
    extra_rows: Vec<Value>,
    finished: bool,
}

impl ChunkDecoder {
    #[must_use]
    pub fn new(format: TsvFormat) -> Self {
        Self::with_config(format, &DecoderConfig::default())
    }

    #[must_use]
    pub fn with_config(format: TsvFormat, config: &DecoderConfig) -> Self {
        Self {
            format,
            lines: LineBuffer::with_limit(config.max_buffered_bytes),
            splitter: RowSplitter::new(),
            classifier: RowClassifier::new(format.layout),
            schema: Schema::new(),
            extra_rows: Vec::new(),
            finished: false,
        }
    }

    /// Build a decoder for a format name as reported by the server.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnsupportedFormat`] for `JSON` and for any
    /// name outside the TabSeparated family.
    pub fn from_format_name(name: &str, config: &DecoderConfig) -> Result<Self, DecodeError> {
        match name.parse::<ResponseFormat>() {
            Ok(ResponseFormat::Tsv(format)) => Ok(Self::with_config(format, config)),
            Ok(ResponseFormat::Json) | Err(_) => Err(DecodeError::UnsupportedFormat {
                name: name.to_string(),
            }),
        }
    }

    #[must_use]
    pub fn format(&self) -> TsvFormat {
        self.format
    }

    /// Column names, once the Names row has been decoded.
    #[must_use]
    pub fn names(&self) -> Option<&[String]> {
        self.schema.names()
    }

    /// Parsed column types, once the Types row has been decoded.
    #[must_use]
    pub fn types(&self) -> Option<&[TypeTag]> {
        self.schema.types()
    }

    /// True once [`finish`](Self::finish) has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one chunk and return the events it completed.
    ///
    /// Chunks fed after [`finish`](Self::finish) are ignored.
    ///
    /// # Errors
    ///
    /// Any value, row or framing error. The decoder must not be fed
    /// again after an error.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<DecoderEvent>, DecodeError> {
        let mut events = Vec::new();
        if self.finished {
            return Ok(events);
        }
        if let Some(region) = self.lines.feed(chunk)? {
            self.decode_region(&region, &mut events)?;
        }
        Ok(events)
    }

    /// Signal end of input.
    ///
    /// Decodes any unterminated tail as a final row, then resolves the
    /// extra rows and emits the `Extra` event. Calling it again returns
    /// no events.
    ///
    /// # Errors
    ///
    /// Any error from decoding the tail, or
    /// [`DecodeError::ExtraRowCount`].
    pub fn finish(&mut self) -> Result<Vec<DecoderEvent>, DecodeError> {
        let mut events = Vec::new();
        if self.finished {
            return Ok(events);
        }
        self.finished = true;

        if let Some(tail) = self.lines.finish() {
            self.decode_region(&tail, &mut events)?;
        }

        let extra = resolve_extra(std::mem::take(&mut self.extra_rows))?;
        debug!(
            totals = extra.totals.is_some(),
            extremes = extra.extremes.is_some(),
            "resolved extra rows"
        );
        events.push(DecoderEvent::Extra(extra));
        Ok(events)
    }

    fn decode_region(
        &mut self,
        region: &[u8],
        events: &mut Vec<DecoderEvent>,
    ) -> Result<(), DecodeError> {
        let escaping = self.format.escaping;
        let mut rows = Vec::new();

        for row in self.splitter.split(region) {
            match self.classifier.classify(row.blank) {
                RowKind::Names => {
                    let names = header_texts(region, &row.columns);
                    debug!(columns = names.len(), "discovered column names");
                    self.schema.set_names(names.clone());
                    events.push(DecoderEvent::Names(names));
                }
                RowKind::Types => {
                    let types = header_texts(region, &row.columns);
                    debug!(?types, "discovered column types");
                    self.schema.set_types(&types);
                    events.push(DecoderEvent::Types(types));
                }
                RowKind::Data => {
                    rows.push(self.schema.decode_row(region, &row.columns, escaping)?);
                }
                RowKind::Extra => {
                    if self.extra_rows.is_empty() {
                        debug!(data_rows = rows.len(), "entered extra section");
                    }
                    let value = self.schema.decode_row(region, &row.columns, escaping)?;
                    self.extra_rows.push(value);
                }
                RowKind::Empty | RowKind::Unknown => {}
            }
        }

        trace!(bytes = region.len(), rows = rows.len(), "decoded region");
        if !rows.is_empty() {
            events.push(DecoderEvent::Rows(rows));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chtsv_types::ExtraData;

    fn decode_all(format: TsvFormat, chunks: &[&[u8]]) -> Vec<DecoderEvent> {
        let mut decoder = ChunkDecoder::new(format);
        let mut events = Vec::new();
        for chunk in chunks {
            events.extend(decoder.feed(chunk).unwrap());
        }
        events.extend(decoder.finish().unwrap());
        events
    }

    fn all_rows(events: &[DecoderEvent]) -> Vec<Value> {
        events
            .iter()
            .filter_map(|e| match e {
                DecoderEvent::Rows(rows) => Some(rows.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn text_row(items: &[&str]) -> Value {
        Value::Array(items.iter().map(|s| Value::String((*s).into())).collect())
    }

    #[test]
    fn plain_rows_in_one_chunk() {
        let events = decode_all(TsvFormat::TAB_SEPARATED, &[b"1\ta\n2\tb\n"]);
        assert_eq!(
            all_rows(&events),
            vec![text_row(&["1", "a"]), text_row(&["2", "b"])]
        );
        assert!(matches!(events.last(), Some(DecoderEvent::Extra(e)) if e.is_empty()));
    }

    #[test]
    fn rows_split_across_chunks() {
        let events = decode_all(TsvFormat::TAB_SEPARATED, &[b"1\t", b"a\n2", b"\tb\n"]);
        assert_eq!(
            all_rows(&events),
            vec![text_row(&["1", "a"]), text_row(&["2", "b"])]
        );
    }

    #[test]
    fn names_and_types_come_first() {
        let body: &[u8] = b"id\tname\nUInt8\tString\n1\tx\n";
        let events = decode_all(TsvFormat::WITH_NAMES_AND_TYPES, &[body]);
        assert!(matches!(&events[0], DecoderEvent::Names(n) if n == &["id", "name"]));
        assert!(matches!(&events[1], DecoderEvent::Types(t) if t == &["UInt8", "String"]));
        let rows = all_rows(&events);
        assert_eq!(rows[0].get("id"), Some(&Value::Int(1)));
        assert_eq!(rows[0].get("name"), Some(&Value::String("x".into())));
    }

    #[test]
    fn unterminated_last_row_is_flushed() {
        let events = decode_all(TsvFormat::TAB_SEPARATED, &[b"1\ta\n2\tb"]);
        assert_eq!(all_rows(&events).len(), 2);
    }

    #[test]
    fn totals_and_extremes() {
        let body: &[u8] = b"k\tv\na\t1\nb\t2\n\n\t3\n\na\t1\nb\t2\n";
        let events = decode_all(TsvFormat::WITH_NAMES, &[body]);
        assert_eq!(all_rows(&events).len(), 2);
        let Some(DecoderEvent::Extra(ExtraData { totals, extremes })) = events.last() else {
            panic!("expected extra event last");
        };
        assert_eq!(
            totals.as_ref().and_then(|t| t.get("v")),
            Some(&Value::String("3".into()))
        );
        let extremes = extremes.as_ref().unwrap();
        assert_eq!(extremes.min.get("k"), Some(&Value::String("a".into())));
        assert_eq!(extremes.max.get("k"), Some(&Value::String("b".into())));
    }

    #[test]
    fn too_many_extra_rows() {
        let mut decoder = ChunkDecoder::new(TsvFormat::TAB_SEPARATED);
        decoder.feed(b"a\tb\n\n1\t1\n2\t2\n3\t3\n4\t4\n").unwrap();
        assert!(matches!(
            decoder.finish(),
            Err(DecodeError::ExtraRowCount { count: 4 })
        ));
    }

    #[test]
    fn finish_is_idempotent() {
        let mut decoder = ChunkDecoder::new(TsvFormat::TAB_SEPARATED);
        assert_eq!(decoder.finish().unwrap().len(), 1);
        assert!(decoder.finish().unwrap().is_empty());
        assert!(decoder.feed(b"x\n").unwrap().is_empty());
        assert!(decoder.is_finished());
    }

    #[test]
    fn format_names() {
        assert!(ChunkDecoder::from_format_name("TSVRaw", &DecoderConfig::default()).is_ok());
        for name in ["JSON", "CSV"] {
            assert!(matches!(
                ChunkDecoder::from_format_name(name, &DecoderConfig::default()),
                Err(DecodeError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn line_limit_is_enforced() {
        let config = DecoderConfig {
            max_buffered_bytes: 8,
            ..DecoderConfig::default()
        };
        let mut decoder = ChunkDecoder::with_config(TsvFormat::TAB_SEPARATED, &config);
        assert!(matches!(
            decoder.feed(b"0123456789"),
            Err(DecodeError::Wire(_))
        ));
    }

    #[test]
    fn failing_value_fails_the_feed() {
        let mut decoder = ChunkDecoder::new(TsvFormat::WITH_NAMES_AND_TYPES);
        let err = decoder.feed(b"n\nInt32\nabc\n").unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { .. }));
    }
}
