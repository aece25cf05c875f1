use chtsv_decoder::DecodedBody;
use chtsv_types::{ColumnMeta, Extremes, Value};
use serde::{Serialize, Serializer};

use crate::response::ResponseMeta;

/// A fully materialized query result.
///
/// Serializes to the same shape the server uses for its own `JSON`
/// format, minus statistics:
///
/// ```text
///   { "meta": [{ "name", "type"? }], "data": [...], "rows": n,
///     "totals"?: {...}, "extremes"?: { "min": {...}, "max": {...} } }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryResult {
    pub meta: Vec<ColumnMeta>,
    pub data: Vec<Value>,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extremes: Option<Extremes>,
    /// Transport metadata, passed through unchanged.
    #[serde(skip)]
    pub response: ResponseMeta,
}

impl QueryResult {
    #[must_use]
    pub fn from_decoded(body: DecodedBody, response: ResponseMeta) -> Self {
        let meta = body.columns();
        Self {
            meta,
            rows: body.rows.len(),
            data: body.rows,
            totals: body.extra.totals,
            extremes: body.extra.extremes,
            response,
        }
    }
}

/// Outcome of materializing a response.
///
/// TabSeparated bodies are decoded into a [`QueryResult`]; `JSON`
/// bodies bypass the row decoder and come back as the parsed document.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryOutput {
    Tabular(QueryResult),
    Json {
        document: serde_json::Value,
        response: ResponseMeta,
    },
}

impl QueryOutput {
    #[must_use]
    pub fn response(&self) -> &ResponseMeta {
        match self {
            Self::Tabular(result) => &result.response,
            Self::Json { response, .. } => response,
        }
    }

    /// The tabular result, if the body was TabSeparated.
    #[must_use]
    pub fn into_tabular(self) -> Option<QueryResult> {
        match self {
            Self::Tabular(result) => Some(result),
            Self::Json { .. } => None,
        }
    }
}

impl Serialize for QueryOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Tabular(result) => result.serialize(serializer),
            Self::Json { document, .. } => document.serialize(serializer),
        }
    }
}
