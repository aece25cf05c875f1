use std::ops::Range;

use crate::line_buffer::LINE_TERMINATOR;

/// Byte that separates columns within a row.
pub const COLUMN_SEPARATOR: u8 = b'\t';

/// Half-open byte range of one column inside a region. The terminator
/// and separator bytes are never included.
pub type ColumnSpan = Range<usize>;

/// One row located inside a complete region.
///
/// `columns` are offsets into the region the row was split from; no
/// bytes are copied at this stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitRow {
    pub columns: Vec<ColumnSpan>,
    /// True when the row is the format's blank separator line.
    pub blank: bool,
}

/// Splits complete regions into rows of column spans.
///
/// The splitter remembers the column count of the very first row it
/// ever sees. That count is what tells a blank separator line apart
/// from a legitimate single-column row holding an empty string:
///
/// ```text
///   expected_columns │ row            │ blank?
///  ──────────────────┼────────────────┼────────
///   2                │ ""  (1 empty)  │ yes
///   1                │ ""  (1 empty)  │ no, an empty value
///   2                │ "\t" (2 empty) │ no
/// ```
#[derive(Debug, Default)]
pub struct RowSplitter {
    /// Column count of the first row seen.
    expected_columns: Option<usize>,
}

impl RowSplitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over the rows of `region`.
    ///
    /// A region normally ends with a terminator; an unterminated tail
    /// (end of input) is still yielded as a final row.
    pub fn split<'a>(&'a mut self, region: &'a [u8]) -> Rows<'a> {
        Rows {
            splitter: self,
            region,
            pos: 0,
        }
    }

    fn is_blank_separator(&self, columns: &[ColumnSpan]) -> bool {
        columns.len() == 1
            && columns[0].is_empty()
            && self.expected_columns.is_some_and(|n| n >= 2)
    }
}

/// Iterator over the rows of one region. Created by [`RowSplitter::split`].
pub struct Rows<'a> {
    splitter: &'a mut RowSplitter,
    region: &'a [u8],
    pos: usize,
}

impl Iterator for Rows<'_> {
    type Item = SplitRow;

    fn next(&mut self) -> Option<SplitRow> {
        let len = self.region.len();
        if self.pos >= len {
            return None;
        }

        let mut columns = Vec::with_capacity(self.splitter.expected_columns.unwrap_or(1));
        let mut start = self.pos;
        let mut end = len;

        for i in self.pos..len {
            match self.region[i] {
                COLUMN_SEPARATOR => {
                    columns.push(start..i);
                    start = i + 1;
                }
                LINE_TERMINATOR => {
                    end = i;
                    break;
                }
                _ => {}
            }
        }

        columns.push(start..end);
        self.pos = end + 1;

        let splitter = &mut *self.splitter;
        if splitter.expected_columns.is_none() {
            splitter.expected_columns = Some(columns.len());
        }
        let blank = splitter.is_blank_separator(&columns);

        Some(SplitRow { columns, blank })
    }
}
