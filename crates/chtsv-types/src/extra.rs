use serde::Serialize;

use crate::value::Value;

/// Minimum and maximum rows reported when extremes are enabled.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Extremes {
    pub min: Value,
    pub max: Value,
}

/// Aggregate rows found after the data section.
///
/// Built once, at end of stream, from the rows the classifier set
/// aside. The number of buffered rows decides their meaning:
///
/// ```text
/// ┌──────┬──────────────────────────────────────────┐
/// │ rows │ interpretation                           │
/// ├──────┼──────────────────────────────────────────┤
/// │ 0    │ nothing                                  │
/// │ 1    │ totals                                   │
/// │ 2    │ extremes { min, max }                    │
/// │ 3    │ totals, then extremes { min, max }       │
/// └──────┴──────────────────────────────────────────┘
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtraData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extremes: Option<Extremes>,
}

impl ExtraData {
    /// Interpret buffered extra rows by count.
    ///
    /// Returns `None` for any count other than 0 through 3; the caller
    /// reports that as a protocol violation.
    #[must_use]
    pub fn from_rows(rows: Vec<Value>) -> Option<Self> {
        let mut rows = rows.into_iter();
        let extra = match rows.len() {
            0 => Self::default(),
            1 => Self {
                totals: rows.next(),
                extremes: None,
            },
            2 => Self {
                totals: None,
                extremes: Extremes::from_pair(&mut rows),
            },
            3 => Self {
                totals: rows.next(),
                extremes: Extremes::from_pair(&mut rows),
            },
            _ => return None,
        };
        Some(extra)
    }

    /// True when neither totals nor extremes are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.totals.is_none() && self.extremes.is_none()
    }
}

impl Extremes {
    fn from_pair(rows: &mut impl Iterator<Item = Value>) -> Option<Self> {
        let min = rows.next()?;
        let max = rows.next()?;
        Some(Self { min, max })
    }
}
