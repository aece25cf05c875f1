#![warn(clippy::pedantic)]

pub mod classifier;
pub mod config;
pub mod decoder;
pub mod error;
pub mod incremental;
pub mod schema;
pub mod streaming;
pub mod value;

mod decompression;

pub use classifier::{RowClassifier, RowKind};
pub use config::DecoderConfig;
pub use decoder::{DecodedBody, TsvDecoder};
pub use decompression::{ContentEncoding, ContentFilter};
pub use error::DecodeError;
pub use incremental::ChunkDecoder;
pub use streaming::{DecoderEvent, StreamingDecoder};
pub use value::{decode_value, unescape};
