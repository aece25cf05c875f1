use chtsv_types::{ColumnMeta, ExtraData, TsvFormat, Value};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::incremental::ChunkDecoder;
use crate::streaming::DecoderEvent;

/// Everything decoded from one complete response body.
///
/// ```text
/// ┌─────────────────────────────────────────────────────────┐
/// │ DecodedBody                                             │
/// │   names: Option<Vec<String>>  ← WithNames layouts       │
/// │   types: Option<Vec<String>>  ← WithNamesAndTypes only  │
/// │   rows:  Vec<Value>           ← data rows, in order     │
/// │   extra: ExtraData            ← totals / extremes       │
/// └─────────────────────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedBody {
    pub names: Option<Vec<String>>,
    pub types: Option<Vec<String>>,
    pub rows: Vec<Value>,
    pub extra: ExtraData,
}

impl DecodedBody {
    /// Fold one decoder event into the body.
    pub fn apply(&mut self, event: DecoderEvent) {
        match event {
            DecoderEvent::Names(names) => self.names = Some(names),
            DecoderEvent::Types(types) => self.types = Some(types),
            DecoderEvent::Rows(mut rows) => self.rows.append(&mut rows),
            DecoderEvent::Extra(extra) => self.extra = extra,
        }
    }

    /// Column metadata: one entry per name, typed when a Types row was
    /// present. Empty for layouts without names.
    #[must_use]
    pub fn columns(&self) -> Vec<ColumnMeta> {
        self.names
            .as_deref()
            .map(|names| ColumnMeta::zip(names, self.types.as_deref()))
            .unwrap_or_default()
    }
}

/// Synchronous decoder for bodies already held in memory.
///
/// Equivalent to feeding the whole body to a [`ChunkDecoder`] as one
/// chunk and finishing it. Used where the body is already buffered:
/// captured responses, tests and benchmarks.
pub struct TsvDecoder;

impl TsvDecoder {
    /// Decode a complete body.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] the body triggers; no partial result is
    /// returned.
    pub fn decode(format: TsvFormat, body: &[u8]) -> Result<DecodedBody, DecodeError> {
        Self::decode_chunks(format, std::iter::once(body))
    }

    /// Decode a body delivered as a sequence of chunks.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`] the body triggers.
    pub fn decode_chunks<'a>(
        format: TsvFormat,
        chunks: impl IntoIterator<Item = &'a [u8]>,
    ) -> Result<DecodedBody, DecodeError> {
        let mut decoder = ChunkDecoder::with_config(format, &DecoderConfig::default());
        let mut body = DecodedBody::default();
        for chunk in chunks {
            for event in decoder.feed(chunk)? {
                body.apply(event);
            }
        }
        for event in decoder.finish()? {
            body.apply(event);
        }
        Ok(body)
    }
}
