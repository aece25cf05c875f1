#![warn(clippy::pedantic)]

pub mod column;
pub mod error;
pub mod extra;
pub mod format;
pub mod type_tag;
pub mod value;

pub use column::ColumnMeta;
pub use error::TypeError;
pub use extra::{ExtraData, Extremes};
pub use format::{Escaping, Layout, ResponseFormat, TsvFormat};
pub use type_tag::TypeTag;
pub use value::Value;
