use chtsv_types::{ExtraData, Layout, Value};

use crate::error::DecodeError;

/// Classification of one row of a TabSeparated response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    Unknown,
    Names,
    Types,
    Data,
    /// The blank separator line before an aggregate section.
    Empty,
    /// A totals or extremes row.
    Extra,
}

/// Row classification state machine.
///
/// Holds three rolling cursors: the kind of the row just handled
/// (`previous`), the kind the next row is expected to have (`current`),
/// and a queued expectation for the row after it (`next`). Only trailing
/// context is used; no row is ever looked ahead at.
///
/// Initial cursors by layout:
///
/// ```text
///   Plain              (Unknown, Data,  Data)
///   WithNames          (Unknown, Names, Data)
///   WithNamesAndTypes  (Unknown, Names, Types)
/// ```
///
/// After each row the cursors advance through [`successor`]:
///
/// ```text
/// ┌──────────────────────────────┬──────────────┬─────────────────────┐
/// │ previous                     │ this row     │ following row       │
/// ├──────────────────────────────┼──────────────┼─────────────────────┤
/// │ Data | Extra | Names | Types │ Empty        │ Extra               │
/// │ any                          │ Extra        │ Extra               │
/// │ any                          │ anything     │ queued, else Data   │
/// └──────────────────────────────┴──────────────┴─────────────────────┘
/// ```
///
/// So `data, "", totals, "", min, max` classifies as
/// `Data, Empty, Extra, Empty, Extra, Extra`.
#[derive(Debug)]
pub struct RowClassifier {
    previous: RowKind,
    current: RowKind,
    next: RowKind,
}

impl RowClassifier {
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        let (current, next) = match layout {
            Layout::Plain => (RowKind::Data, RowKind::Data),
            Layout::WithNames => (RowKind::Names, RowKind::Data),
            Layout::WithNamesAndTypes => (RowKind::Names, RowKind::Types),
        };
        Self {
            previous: RowKind::Unknown,
            current,
            next,
        }
    }

    /// Classify the next row and advance the cursors.
    ///
    /// `blank` is the row splitter's verdict on whether the row is the
    /// format's blank separator line.
    pub fn classify(&mut self, blank: bool) -> RowKind {
        let kind = if blank {
            RowKind::Empty
        } else {
            match self.current {
                RowKind::Names => RowKind::Names,
                RowKind::Types => RowKind::Types,
                RowKind::Extra => RowKind::Extra,
                _ => RowKind::Data,
            }
        };

        self.current = successor(self.previous, kind, self.next);
        self.previous = kind;
        self.next = RowKind::Unknown;
        kind
    }
}

/// Transition table. See [`RowClassifier`].
fn successor(previous: RowKind, kind: RowKind, queued: RowKind) -> RowKind {
    match (previous, kind) {
        (RowKind::Data | RowKind::Extra | RowKind::Names | RowKind::Types, RowKind::Empty)
        | (_, RowKind::Extra) => RowKind::Extra,
        _ => match queued {
            RowKind::Unknown => RowKind::Data,
            queued => queued,
        },
    }
}

/// Reinterpret the buffered Extra rows once the stream has ended.
///
/// # Errors
///
/// Returns [`DecodeError::ExtraRowCount`] for more than three rows.
pub fn resolve_extra(rows: Vec<Value>) -> Result<ExtraData, DecodeError> {
    let count = rows.len();
    ExtraData::from_rows(rows).ok_or(DecodeError::ExtraRowCount { count })
}
