#![warn(clippy::pedantic)]

pub mod error;
pub mod line_buffer;
pub mod row_splitter;

pub use error::WireError;
pub use line_buffer::{LineBuffer, LINE_TERMINATOR};
pub use row_splitter::{ColumnSpan, RowSplitter, Rows, SplitRow, COLUMN_SEPARATOR};
