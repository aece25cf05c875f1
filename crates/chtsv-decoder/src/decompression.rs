use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use zstd::stream::raw::{Decoder as ZstdDecoder, InBuffer, Operation, OutBuffer};

use crate::error::DecodeError;

/// Size of the scratch buffer the zstd filter decompresses into.
const ZSTD_SCRATCH: usize = 32 * 1024;

/// `Content-Encoding` values a response may carry.
///
/// Only `identity` and `zstd` are decoded here. The others are expected
/// to be removed by the transport before the body reaches the decoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContentEncoding {
    #[default]
    Identity,
    Zstd,
    Gzip,
    Brotli,
    Deflate,
}

impl ContentEncoding {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Zstd => "zstd",
            Self::Gzip => "gzip",
            Self::Brotli => "br",
            Self::Deflate => "deflate",
        }
    }
}

impl fmt::Display for ContentEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentEncoding {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "identity" => Ok(Self::Identity),
            "zstd" => Ok(Self::Zstd),
            "gzip" | "x-gzip" => Ok(Self::Gzip),
            "br" => Ok(Self::Brotli),
            "deflate" => Ok(Self::Deflate),
            other => Err(DecodeError::UnsupportedEncoding {
                encoding: other.to_string(),
            }),
        }
    }
}

/// Push-style byte filter between the transport and the line buffer.
///
/// ```text
///   transport chunk ──► ContentFilter::push ──► ChunkDecoder::feed
///   end of body     ──► ContentFilter::finish ──► ChunkDecoder::finish
/// ```
///
/// The zstd filter drives a raw streaming context through a fixed
/// scratch buffer; each push returns whatever output the frame has
/// produced so far, so compressed input never has to be held in full.
///
/// The context reports how many more input bytes the current frame
/// needs. A non-zero hint at [`finish`](Self::finish) means the body
/// ended mid-frame, which is reported as
/// [`DecodeError::DecompressFailed`] rather than a short result.
pub struct ContentFilter {
    kind: FilterKind,
}

enum FilterKind {
    Identity,
    Zstd(Box<ZstdState>),
}

struct ZstdState {
    context: ZstdDecoder<'static>,
    scratch: Vec<u8>,
    /// Last size hint from the context. Zero between frames.
    needed: usize,
}

impl ZstdState {
    fn new() -> Result<Self, DecodeError> {
        let context = ZstdDecoder::new().map_err(decompress_failed)?;
        Ok(Self {
            context,
            scratch: vec![0; ZSTD_SCRATCH],
            needed: 0,
        })
    }

    /// Run `input` through the context until it is consumed and the
    /// context has no more output buffered.
    ///
    /// An idle context is never run on empty input: between frames it
    /// would answer with the next frame header's size.
    fn run(&mut self, input: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut out = Vec::new();
        if input.is_empty() {
            return Ok(out);
        }
        let mut src = InBuffer::around(input);
        loop {
            let mut dst = OutBuffer::around(&mut self.scratch[..]);
            self.needed = self
                .context
                .run(&mut src, &mut dst)
                .map_err(decompress_failed)?;
            let written = dst.pos();
            out.extend_from_slice(&self.scratch[..written]);
            // A zero hint means the frame is decoded and fully flushed.
            if src.pos() == input.len() && (written < self.scratch.len() || self.needed == 0) {
                return Ok(out);
            }
        }
    }
}

fn decompress_failed(e: std::io::Error) -> DecodeError {
    DecodeError::DecompressFailed(e.to_string())
}

impl ContentFilter {
    /// A filter that passes bytes through unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            kind: FilterKind::Identity,
        }
    }

    /// Build the filter for `encoding`.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::UnsupportedEncoding`] for gzip, br and deflate.
    /// - [`DecodeError::DecompressFailed`] if the zstd context cannot be
    ///   created.
    pub fn new(encoding: ContentEncoding) -> Result<Self, DecodeError> {
        let kind = match encoding {
            ContentEncoding::Identity => FilterKind::Identity,
            ContentEncoding::Zstd => FilterKind::Zstd(Box::new(ZstdState::new()?)),
            ContentEncoding::Gzip | ContentEncoding::Brotli | ContentEncoding::Deflate => {
                return Err(DecodeError::UnsupportedEncoding {
                    encoding: encoding.to_string(),
                });
            }
        };
        Ok(Self { kind })
    }

    /// Build the filter named by a `Content-Encoding` header value.
    /// A missing header means identity.
    ///
    /// # Errors
    ///
    /// Same as [`ContentFilter::new`], plus
    /// [`DecodeError::UnsupportedEncoding`] for unknown names.
    pub fn for_header(value: Option<&str>) -> Result<Self, DecodeError> {
        match value {
            None => Ok(Self::identity()),
            Some(name) => Self::new(name.parse()?),
        }
    }

    /// Filter one chunk. May return an empty slice when the compressed
    /// input has not yet produced output.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::DecompressFailed`] on a corrupt zstd stream.
    pub fn push<'a>(&mut self, chunk: &'a [u8]) -> Result<Cow<'a, [u8]>, DecodeError> {
        match &mut self.kind {
            FilterKind::Identity => Ok(Cow::Borrowed(chunk)),
            FilterKind::Zstd(state) => state.run(chunk).map(Cow::Owned),
        }
    }

    /// Close the filter at end of body. Returns any output still held.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::DecompressFailed`] on a corrupt zstd stream
    /// or when the body ended before the last frame was complete.
    pub fn finish(&mut self) -> Result<Vec<u8>, DecodeError> {
        match &mut self.kind {
            FilterKind::Identity => Ok(Vec::new()),
            // `push` already drained every byte the context could produce.
            FilterKind::Zstd(state) if state.needed != 0 => {
                Err(DecodeError::DecompressFailed(format!(
                    "truncated zstd frame: {} more input bytes expected",
                    state.needed
                )))
            }
            FilterKind::Zstd(_) => Ok(Vec::new()),
        }
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Debug for ContentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            FilterKind::Identity => "identity",
            FilterKind::Zstd(_) => "zstd",
        };
        f.debug_struct("ContentFilter").field("kind", &name).finish()
    }
}
