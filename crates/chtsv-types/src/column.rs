use serde::Serialize;

/// Name and (when the response carried a Types row) declared type of
/// one result column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ColumnMeta {
    /// Pair names with types positionally.
    ///
    /// `types` is `None` for layouts without a Types row; every entry
    /// then has no type. A Types row shorter than the Names row leaves
    /// the trailing columns untyped.
    #[must_use]
    pub fn zip(names: &[String], types: Option<&[String]>) -> Vec<Self> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Self {
                name: name.clone(),
                type_name: types.and_then(|t| t.get(i)).cloned(),
            })
            .collect()
    }
}
