use std::fmt;

/// A column type tag as reported in the Types row.
///
/// Tags are parsed once, when the Types row arrives, into this tree so
/// that wrapper nesting is fully resolved before any value bytes are
/// looked at:
///
/// ```text
///   "Array(Nullable(Int32))"
///        │
///        ▼
///   Array
///     └── Nullable
///           └── Int32
/// ```
///
/// Parsing never fails. A tag with no decode rule becomes
/// [`TypeTag::Unsupported`] carrying the original text, and it is the
/// value decoder that rejects it when a value of that column is
/// actually decoded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
    UInt32,
    Float32,
    Float64,
    Int64,
    Int128,
    Int256,
    UInt64,
    UInt128,
    UInt256,
    Bool,
    String,
    /// `FixedString(n)`. Decoded exactly like `String`.
    FixedString(usize),
    Date,
    DateTime {
        timezone: Option<String>,
    },
    DateTime64 {
        precision: u8,
        timezone: Option<String>,
    },
    Uuid,
    Ipv4,
    Ipv6,
    /// `JSON` or `Object('json')`: an embedded JSON document.
    Json,
    Nullable(Box<TypeTag>),
    Array(Box<TypeTag>),
    /// `LowCardinality(T)` is a storage detail; values decode as `T`.
    LowCardinality(Box<TypeTag>),
    /// Any tag with no decode rule, kept verbatim.
    Unsupported(String),
}

impl TypeTag {
    /// Parse a type tag. Never fails; see [`TypeTag::Unsupported`].
    #[must_use]
    pub fn parse(src: &str) -> Self {
        let mut parser = Parser::new(src);
        match parser.tag() {
            Some(tag) if parser.at_end() => tag,
            _ => Self::Unsupported(src.trim().to_string()),
        }
    }

    /// Native-width numeric scalars (decoded to `i64` or `f64`).
    #[must_use]
    pub fn is_native_number(&self) -> bool {
        matches!(
            self,
            Self::Int8
                | Self::Int16
                | Self::Int32
                | Self::UInt8
                | Self::UInt16
                | Self::UInt32
                | Self::Float32
                | Self::Float64
        )
    }

    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// Integers that may exceed 53 bits and are decoded as big integers.
    #[must_use]
    pub fn is_wide_integer(&self) -> bool {
        matches!(
            self,
            Self::Int64 | Self::Int128 | Self::Int256 | Self::UInt64 | Self::UInt128 | Self::UInt256
        )
    }

    /// Element types the server single-quotes inside an array literal.
    #[must_use]
    pub fn is_quoted_in_array(&self) -> bool {
        match self {
            Self::String
            | Self::FixedString(_)
            | Self::Date
            | Self::DateTime { .. }
            | Self::DateTime64 { .. }
            | Self::Uuid
            | Self::Ipv4
            | Self::Ipv6 => true,
            Self::Nullable(inner) | Self::LowCardinality(inner) => inner.is_quoted_in_array(),
            _ => false,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int8 => f.write_str("Int8"),
            Self::Int16 => f.write_str("Int16"),
            Self::Int32 => f.write_str("Int32"),
            Self::UInt8 => f.write_str("UInt8"),
            Self::UInt16 => f.write_str("UInt16"),
            Self::UInt32 => f.write_str("UInt32"),
            Self::Float32 => f.write_str("Float32"),
            Self::Float64 => f.write_str("Float64"),
            Self::Int64 => f.write_str("Int64"),
            Self::Int128 => f.write_str("Int128"),
            Self::Int256 => f.write_str("Int256"),
            Self::UInt64 => f.write_str("UInt64"),
            Self::UInt128 => f.write_str("UInt128"),
            Self::UInt256 => f.write_str("UInt256"),
            Self::Bool => f.write_str("Bool"),
            Self::String => f.write_str("String"),
            Self::FixedString(n) => write!(f, "FixedString({n})"),
            Self::Date => f.write_str("Date"),
            Self::DateTime { timezone: None } => f.write_str("DateTime"),
            Self::DateTime { timezone: Some(tz) } => write!(f, "DateTime('{tz}')"),
            Self::DateTime64 {
                precision,
                timezone: None,
            } => write!(f, "DateTime64({precision})"),
            Self::DateTime64 {
                precision,
                timezone: Some(tz),
            } => write!(f, "DateTime64({precision}, '{tz}')"),
            Self::Uuid => f.write_str("UUID"),
            Self::Ipv4 => f.write_str("IPv4"),
            Self::Ipv6 => f.write_str("IPv6"),
            Self::Json => f.write_str("JSON"),
            Self::Nullable(inner) => write!(f, "Nullable({inner})"),
            Self::Array(inner) => write!(f, "Array({inner})"),
            Self::LowCardinality(inner) => write!(f, "LowCardinality({inner})"),
            Self::Unsupported(text) => f.write_str(text),
        }
    }
}

// ── Recursive-descent parser ────────────────────────────────────────────
//
//   tag      := ident [ "(" args ")" ]
//   args     := tag                       (Nullable, Array, LowCardinality)
//             | number                    (FixedString)
//             | [ quoted ]                (DateTime)
//             | number [ "," quoted ]     (DateTime64)
//             | quoted                    (Object)
//
// Every helper returns `None` on mismatch; `TypeTag::parse` maps any
// `None` to `Unsupported`.

/// Wrapper nesting beyond this depth is reported as `Unsupported`.
const MAX_NESTING: usize = 32;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn at_end(&mut self) -> bool {
        self.skip_ws();
        self.pos == self.src.len()
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    fn eat(&mut self, c: char) -> Option<()> {
        if self.peek()? == c {
            self.pos += c.len_utf8();
            Some(())
        } else {
            None
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        self.pos += len;
        Some(&rest[..len])
    }

    fn number<T: std::str::FromStr>(&mut self) -> Option<T> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let value = rest[..len].parse().ok()?;
        self.pos += len;
        Some(value)
    }

    /// A single-quoted string literal with `\'` escapes.
    fn quoted(&mut self) -> Option<String> {
        self.eat('\'')?;
        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => {
                    let (_, escaped) = chars.next()?;
                    out.push(escaped);
                }
                '\'' => {
                    self.pos += i + 1;
                    return Some(out);
                }
                other => out.push(other),
            }
        }
        None
    }

    /// Consume a parenthesized argument list without interpreting it.
    fn skip_balanced(&mut self) -> Option<()> {
        self.eat('(')?;
        let mut depth = 1usize;
        let mut in_quote = false;
        let mut escaped = false;
        for (i, c) in self.rest().char_indices() {
            if in_quote {
                match (escaped, c) {
                    (true, _) => escaped = false,
                    (false, '\\') => escaped = true,
                    (false, '\'') => in_quote = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '\'' => in_quote = true,
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += i + 1;
                        return Some(());
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn wrapped(&mut self) -> Option<Box<TypeTag>> {
        if self.depth >= MAX_NESTING {
            return None;
        }
        self.depth += 1;
        self.eat('(')?;
        let inner = self.tag()?;
        self.eat(')')?;
        self.depth -= 1;
        Some(Box::new(inner))
    }

    fn tag(&mut self) -> Option<TypeTag> {
        self.skip_ws();
        let start = self.pos;
        let name = self.ident()?;

        let tag = match name {
            "Int8" => TypeTag::Int8,
            "Int16" => TypeTag::Int16,
            "Int32" => TypeTag::Int32,
            "UInt8" => TypeTag::UInt8,
            "UInt16" => TypeTag::UInt16,
            "UInt32" => TypeTag::UInt32,
            "Float32" => TypeTag::Float32,
            "Float64" => TypeTag::Float64,
            "Int64" => TypeTag::Int64,
            "Int128" => TypeTag::Int128,
            "Int256" => TypeTag::Int256,
            "UInt64" => TypeTag::UInt64,
            "UInt128" => TypeTag::UInt128,
            "UInt256" => TypeTag::UInt256,
            "Bool" => TypeTag::Bool,
            "String" => TypeTag::String,
            "Date" => TypeTag::Date,
            "UUID" => TypeTag::Uuid,
            "IPv4" => TypeTag::Ipv4,
            "IPv6" => TypeTag::Ipv6,
            "JSON" => TypeTag::Json,
            "Nullable" => TypeTag::Nullable(self.wrapped()?),
            "Array" => TypeTag::Array(self.wrapped()?),
            "LowCardinality" => TypeTag::LowCardinality(self.wrapped()?),
            "FixedString" => {
                self.eat('(')?;
                let n = self.number()?;
                self.eat(')')?;
                TypeTag::FixedString(n)
            }
            "DateTime" => {
                let timezone = if self.peek() == Some('(') {
                    self.eat('(')?;
                    let tz = self.quoted()?;
                    self.eat(')')?;
                    Some(tz)
                } else {
                    None
                };
                TypeTag::DateTime { timezone }
            }
            "DateTime64" => {
                self.eat('(')?;
                let precision = self.number()?;
                let timezone = if self.peek() == Some(',') {
                    self.eat(',')?;
                    Some(self.quoted()?)
                } else {
                    None
                };
                self.eat(')')?;
                TypeTag::DateTime64 {
                    precision,
                    timezone,
                }
            }
            "Object" => {
                self.eat('(')?;
                let kind = self.quoted()?;
                self.eat(')')?;
                if kind.eq_ignore_ascii_case("json") {
                    TypeTag::Json
                } else {
                    TypeTag::Unsupported(self.src[start..self.pos].to_string())
                }
            }
            _ => {
                if self.peek() == Some('(') {
                    self.skip_balanced()?;
                }
                TypeTag::Unsupported(self.src[start..self.pos].to_string())
            }
        };

        Some(tag)
    }
}
