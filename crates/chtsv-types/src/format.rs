use std::fmt;
use std::str::FromStr;

use crate::error::TypeError;

/// Which header rows precede the data section.
///
/// ```text
/// ┌───────────────────┬──────────────┬──────────────┐
/// │ Layout            │ Names row    │ Types row    │
/// ├───────────────────┼──────────────┼──────────────┤
/// │ Plain             │ no           │ no           │
/// │ WithNames         │ yes          │ no           │
/// │ WithNamesAndTypes │ yes          │ yes          │
/// └───────────────────┴──────────────┴──────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layout {
    Plain,
    WithNames,
    WithNamesAndTypes,
}

/// Whether string values on the wire carry backslash escapes.
///
/// The `Raw` variants write values verbatim; no unescaping is applied
/// to them on decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Escaping {
    #[default]
    Standard,
    Raw,
}

/// A member of the TabSeparated format family.
///
/// Fixed for the lifetime of one decoder. Parsed from the format name
/// the server reports, including the short `TSV` aliases:
///
/// ```text
/// TabSeparated                      TSV
/// TabSeparatedRaw                   TSVRaw
/// TabSeparatedWithNames             TSVWithNames
/// TabSeparatedWithNamesAndTypes     TSVWithNamesAndTypes
/// TabSeparatedRawWithNames          TSVRawWithNames
/// TabSeparatedRawWithNamesAndTypes  TSVRawWithNamesAndTypes
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TsvFormat {
    pub layout: Layout,
    pub escaping: Escaping,
}

impl TsvFormat {
    pub const TAB_SEPARATED: Self = Self::new(Layout::Plain, Escaping::Standard);
    pub const TAB_SEPARATED_RAW: Self = Self::new(Layout::Plain, Escaping::Raw);
    pub const WITH_NAMES: Self = Self::new(Layout::WithNames, Escaping::Standard);
    pub const WITH_NAMES_AND_TYPES: Self =
        Self::new(Layout::WithNamesAndTypes, Escaping::Standard);
    pub const RAW_WITH_NAMES: Self = Self::new(Layout::WithNames, Escaping::Raw);
    pub const RAW_WITH_NAMES_AND_TYPES: Self = Self::new(Layout::WithNamesAndTypes, Escaping::Raw);

    #[must_use]
    pub const fn new(layout: Layout, escaping: Escaping) -> Self {
        Self { layout, escaping }
    }

    /// True when the first row carries column names.
    #[must_use]
    pub fn has_names(self) -> bool {
        matches!(self.layout, Layout::WithNames | Layout::WithNamesAndTypes)
    }

    /// True when a types row follows the names row.
    #[must_use]
    pub fn has_types(self) -> bool {
        self.layout == Layout::WithNamesAndTypes
    }

    /// The server's long-form name for this variant.
    #[must_use]
    pub fn name(self) -> &'static str {
        match (self.layout, self.escaping) {
            (Layout::Plain, Escaping::Standard) => "TabSeparated",
            (Layout::Plain, Escaping::Raw) => "TabSeparatedRaw",
            (Layout::WithNames, Escaping::Standard) => "TabSeparatedWithNames",
            (Layout::WithNames, Escaping::Raw) => "TabSeparatedRawWithNames",
            (Layout::WithNamesAndTypes, Escaping::Standard) => "TabSeparatedWithNamesAndTypes",
            (Layout::WithNamesAndTypes, Escaping::Raw) => "TabSeparatedRawWithNamesAndTypes",
        }
    }
}

impl Default for TsvFormat {
    /// Plain `TabSeparated`, the server's default output format.
    fn default() -> Self {
        Self::TAB_SEPARATED
    }
}

impl fmt::Display for TsvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TsvFormat {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let suffix = name
            .strip_prefix("TabSeparated")
            .or_else(|| name.strip_prefix("TSV"))
            .ok_or_else(|| TypeError::UnknownFormat {
                name: name.to_string(),
            })?;

        let (escaping, rest) = match suffix.strip_prefix("Raw") {
            Some(rest) => (Escaping::Raw, rest),
            None => (Escaping::Standard, suffix),
        };

        let layout = match rest {
            "" => Layout::Plain,
            "WithNames" => Layout::WithNames,
            "WithNamesAndTypes" => Layout::WithNamesAndTypes,
            _ => {
                return Err(TypeError::UnknownFormat {
                    name: name.to_string(),
                });
            }
        };

        Ok(Self::new(layout, escaping))
    }
}

/// Format of a whole response body as selected by the transport.
///
/// `Json` bodies bypass the TabSeparated decoder and are parsed as a
/// single document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResponseFormat {
    Json,
    Tsv(TsvFormat),
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Tsv(format) => format.fmt(f),
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "JSON" {
            return Ok(Self::Json);
        }
        s.parse().map(Self::Tsv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_names() {
        assert_eq!(
            "TabSeparated".parse::<TsvFormat>().unwrap(),
            TsvFormat::TAB_SEPARATED
        );
        assert_eq!(
            "TabSeparatedRaw".parse::<TsvFormat>().unwrap(),
            TsvFormat::TAB_SEPARATED_RAW
        );
        assert_eq!(
            "TabSeparatedWithNames".parse::<TsvFormat>().unwrap(),
            TsvFormat::WITH_NAMES
        );
        assert_eq!(
            "TabSeparatedWithNamesAndTypes".parse::<TsvFormat>().unwrap(),
            TsvFormat::WITH_NAMES_AND_TYPES
        );
        assert_eq!(
            "TabSeparatedRawWithNamesAndTypes".parse::<TsvFormat>().unwrap(),
            TsvFormat::RAW_WITH_NAMES_AND_TYPES
        );
    }

    #[test]
    fn parses_tsv_aliases() {
        assert_eq!("TSV".parse::<TsvFormat>().unwrap(), TsvFormat::TAB_SEPARATED);
        assert_eq!(
            "TSVRaw".parse::<TsvFormat>().unwrap(),
            TsvFormat::TAB_SEPARATED_RAW
        );
        assert_eq!(
            "TSVWithNamesAndTypes".parse::<TsvFormat>().unwrap(),
            TsvFormat::WITH_NAMES_AND_TYPES
        );
        assert_eq!(
            "TSVRawWithNames".parse::<TsvFormat>().unwrap(),
            TsvFormat::RAW_WITH_NAMES
        );
    }

    #[test]
    fn rejects_other_formats() {
        for name in ["CSV", "JSONEachRow", "TabSeparatedWithTypes", "TSVRawRaw", ""] {
            assert!(
                matches!(
                    name.parse::<TsvFormat>(),
                    Err(TypeError::UnknownFormat { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn name_roundtrips() {
        for format in [
            TsvFormat::TAB_SEPARATED,
            TsvFormat::TAB_SEPARATED_RAW,
            TsvFormat::WITH_NAMES,
            TsvFormat::WITH_NAMES_AND_TYPES,
            TsvFormat::RAW_WITH_NAMES,
            TsvFormat::RAW_WITH_NAMES_AND_TYPES,
        ] {
            assert_eq!(format.name().parse::<TsvFormat>().unwrap(), format);
        }
    }

    #[test]
    fn response_format_recognizes_json() {
        assert_eq!(
            "JSON".parse::<ResponseFormat>().unwrap(),
            ResponseFormat::Json
        );
        assert_eq!(
            "TSVWithNames".parse::<ResponseFormat>().unwrap(),
            ResponseFormat::Tsv(TsvFormat::WITH_NAMES)
        );
    }

    #[test]
    fn layout_flags() {
        assert!(!TsvFormat::TAB_SEPARATED.has_names());
        assert!(TsvFormat::WITH_NAMES.has_names());
        assert!(!TsvFormat::WITH_NAMES.has_types());
        assert!(TsvFormat::RAW_WITH_NAMES_AND_TYPES.has_types());
    }
}
