use chtsv_types::{Escaping, TypeTag, Value};
use chtsv_wire::ColumnSpan;

use crate::error::DecodeError;
use crate::value::decode_value;

/// Column names and types discovered from the header rows.
///
/// Each part is assigned at most once, when its row is classified. Until
/// names are known, rows decode to plain arrays of text; once names are
/// known, rows decode to maps keyed by column name, and once types are
/// known, every column goes through its typed decode rule.
#[derive(Debug, Default)]
pub struct Schema {
    names: Option<Vec<String>>,
    types: Option<Vec<TypeTag>>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_names(&mut self, names: Vec<String>) {
        self.names = Some(names);
    }

    /// Parse and store the Types row.
    pub fn set_types(&mut self, types: &[String]) {
        self.types = Some(types.iter().map(|t| TypeTag::parse(t)).collect());
    }

    #[must_use]
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    #[must_use]
    pub fn types(&self) -> Option<&[TypeTag]> {
        self.types.as_deref()
    }

    /// Decode one row whose columns are `columns` within `region`.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::ColumnCount`] when names are known and the row
    ///   has a different number of columns.
    /// - Any error from [`decode_value`] for an individual column.
    pub fn decode_row(
        &self,
        region: &[u8],
        columns: &[ColumnSpan],
        escaping: Escaping,
    ) -> Result<Value, DecodeError> {
        let tag = |i: usize| self.types.as_ref().and_then(|t| t.get(i));

        let Some(names) = &self.names else {
            return columns
                .iter()
                .enumerate()
                .map(|(i, span)| decode_value(&region[span.clone()], tag(i), escaping))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array);
        };

        if columns.len() != names.len() {
            return Err(DecodeError::ColumnCount {
                expected: names.len(),
                found: columns.len(),
            });
        }

        names
            .iter()
            .zip(columns)
            .enumerate()
            .map(|(i, (name, span))| {
                decode_value(&region[span.clone()], tag(i), escaping).map(|v| (name.clone(), v))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Map)
    }
}

/// Column texts of a header row, verbatim.
pub(crate) fn header_texts(region: &[u8], columns: &[ColumnSpan]) -> Vec<String> {
    columns
        .iter()
        .map(|span| String::from_utf8_lossy(&region[span.clone()]).into_owned())
        .collect()
}
