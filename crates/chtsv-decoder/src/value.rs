use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use chtsv_types::value::DATETIME_FORMAT;
use chtsv_types::{Escaping, TypeTag, Value};
use num_bigint::BigInt;

use crate::error::DecodeError;

/// The two-byte literal for a null column value.
const NULL_LITERAL: &[u8] = b"\\N";

/// Null inside an array literal.
const ARRAY_NULL_LITERAL: &[u8] = b"NULL";

/// Decode one column value.
///
/// Without a type tag the bytes come back as text, untouched: escape
/// processing only happens for `String`-like columns and for quoted
/// array elements.
///
/// ```text
/// ┌──────────────────────────────┬─────────────────────────────────────┐
/// │ Tag                          │ Result                              │
/// ├──────────────────────────────┼─────────────────────────────────────┤
/// │ (none)                       │ String, verbatim                    │
/// │ Int8..Int32, UInt8..UInt32   │ Int, or Float for inf/-inf/nan      │
/// │ Float32, Float64             │ Float                               │
/// │ Int64..Int256, UInt64..      │ BigInt                              │
/// │ Bool                         │ Bool (true only for "true")         │
/// │ String, FixedString(n)       │ String, partially unescaped         │
/// │ Date, DateTime, DateTime64   │ DateTime                            │
/// │ UUID, IPv4, IPv6             │ String                              │
/// │ JSON                         │ parsed document                     │
/// │ Nullable(T)                  │ Null for \N, else T                 │
/// │ Array(T)                     │ Array                               │
/// │ LowCardinality(T)            │ T                                   │
/// └──────────────────────────────┴─────────────────────────────────────┘
/// ```
///
/// # Errors
///
/// - [`DecodeError::UnsupportedType`] for tags with no decode rule.
/// - [`DecodeError::InvalidValue`] when the text does not parse as the
///   declared type.
pub fn decode_value(
    raw: &[u8],
    tag: Option<&TypeTag>,
    escaping: Escaping,
) -> Result<Value, DecodeError> {
    match tag {
        None => Ok(Value::String(text(raw))),
        Some(tag) => decode_typed(raw, tag, escaping),
    }
}

/// Partial backslash unescape.
///
/// Only `\\`, `\'` and `\n` are translated. Every other byte, including
/// any other backslash sequence, passes through unchanged.
#[must_use]
pub fn unescape(raw: &[u8]) -> String {
    if !raw.contains(&b'\\') {
        return text(raw);
    }

    let mut out = Vec::with_capacity(raw.len());
    let mut bytes = raw.iter().copied();
    while let Some(b) = bytes.next() {
        if b != b'\\' {
            out.push(b);
            continue;
        }
        match bytes.next() {
            Some(b'\\') => out.push(b'\\'),
            Some(b'\'') => out.push(b'\''),
            Some(b'n') => out.push(b'\n'),
            Some(other) => out.extend_from_slice(&[b'\\', other]),
            None => out.push(b'\\'),
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn text(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn utf8<'a>(raw: &'a [u8], tag: &TypeTag) -> Result<&'a str, DecodeError> {
    std::str::from_utf8(raw).map_err(|_| DecodeError::invalid(tag, raw))
}

fn decode_typed(raw: &[u8], tag: &TypeTag, escaping: Escaping) -> Result<Value, DecodeError> {
    match tag {
        TypeTag::Nullable(inner) => {
            if raw == NULL_LITERAL {
                Ok(Value::Null)
            } else {
                decode_typed(raw, inner, escaping)
            }
        }
        TypeTag::LowCardinality(inner) => decode_typed(raw, inner, escaping),
        TypeTag::String | TypeTag::FixedString(_) => Ok(Value::String(match escaping {
            Escaping::Standard => unescape(raw),
            Escaping::Raw => text(raw),
        })),
        TypeTag::Bool => Ok(Value::Bool(raw == b"true")),
        TypeTag::Json => serde_json::from_slice::<serde_json::Value>(raw)
            .map(Value::from)
            .map_err(|_| DecodeError::invalid(tag, raw)),
        TypeTag::Date => {
            let date = NaiveDate::parse_from_str(utf8(raw, tag)?, "%Y-%m-%d")
                .map_err(|_| DecodeError::invalid(tag, raw))?;
            Ok(Value::DateTime(date.and_time(NaiveTime::MIN)))
        }
        TypeTag::DateTime { .. } | TypeTag::DateTime64 { .. } => {
            parse_datetime(utf8(raw, tag)?)
                .map(Value::DateTime)
                .ok_or_else(|| DecodeError::invalid(tag, raw))
        }
        TypeTag::Uuid => Ok(Value::String(text(raw))),
        TypeTag::Ipv4 => {
            let s = utf8(raw, tag)?;
            s.parse::<Ipv4Addr>()
                .map(|_| Value::String(s.to_string()))
                .map_err(|_| DecodeError::invalid(tag, raw))
        }
        TypeTag::Ipv6 => {
            let s = utf8(raw, tag)?;
            s.parse::<Ipv6Addr>()
                .map(|_| Value::String(s.to_string()))
                .map_err(|_| DecodeError::invalid(tag, raw))
        }
        TypeTag::Array(inner) => decode_array(raw, tag, inner),
        TypeTag::Unsupported(name) => Err(DecodeError::UnsupportedType { tag: name.clone() }),
        t if t.is_wide_integer() => BigInt::parse_bytes(raw, 10)
            .map(Value::BigInt)
            .ok_or_else(|| DecodeError::invalid(tag, raw)),
        t if t.is_native_number() => decode_number(raw, t),
        other => Err(DecodeError::UnsupportedType {
            tag: other.to_string(),
        }),
    }
}

fn decode_number(raw: &[u8], tag: &TypeTag) -> Result<Value, DecodeError> {
    match raw {
        b"inf" | b"+inf" => return Ok(Value::Float(f64::INFINITY)),
        b"-inf" => return Ok(Value::Float(f64::NEG_INFINITY)),
        b"nan" | b"-nan" => return Ok(Value::Float(f64::NAN)),
        _ => {}
    }
    let s = utf8(raw, tag)?;
    if tag.is_float() {
        s.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| DecodeError::invalid(tag, raw))
    } else {
        s.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| DecodeError::invalid(tag, raw))
    }
}

/// Server wall-clock text first, then RFC 3339, then unix seconds.
fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        return Some(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.naive_utc());
    }
    s.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|ts| ts.naive_utc())
}

// ── Array literals ─────────────────────────────────────────────────────

/// Decode `[e1,e2,...]`.
///
/// Quoted element kinds (strings, dates, UUIDs, addresses) are
/// single-quoted with `\'` escapes inside; quoted elements are always
/// run through [`unescape`], whatever the response escaping. Nested
/// arrays are split at bracket depth zero.
fn decode_array(raw: &[u8], tag: &TypeTag, inner: &TypeTag) -> Result<Value, DecodeError> {
    let body = raw
        .strip_prefix(b"[")
        .and_then(|r| r.strip_suffix(b"]"))
        .ok_or_else(|| DecodeError::invalid(tag, raw))?;

    if body.is_empty() {
        return Ok(Value::Array(Vec::new()));
    }

    split_elements(body)
        .ok_or_else(|| DecodeError::invalid(tag, raw))?
        .into_iter()
        .map(|element| decode_element(element, inner))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn decode_element(element: &[u8], tag: &TypeTag) -> Result<Value, DecodeError> {
    match tag {
        TypeTag::Nullable(inner) => {
            if element == ARRAY_NULL_LITERAL {
                Ok(Value::Null)
            } else {
                decode_element(element, inner)
            }
        }
        TypeTag::LowCardinality(inner) => decode_element(element, inner),
        TypeTag::Array(inner) => decode_array(element, tag, inner),
        t if t.is_quoted_in_array() => {
            let quoted = element
                .strip_prefix(b"'")
                .and_then(|e| e.strip_suffix(b"'"))
                .ok_or_else(|| DecodeError::invalid(t, element))?;
            let unquoted = unescape(quoted);
            decode_typed(unquoted.as_bytes(), t, Escaping::Raw)
        }
        t if t.is_native_number() || t.is_wide_integer() || *t == TypeTag::Bool => {
            decode_typed(element, t, Escaping::Raw)
        }
        other => Err(DecodeError::UnsupportedType {
            tag: format!("Array({other})"),
        }),
    }
}

/// Split an array body on commas that are outside quotes and outside
/// nested brackets.
///
/// A quote preceded by a backslash does not close the element. Returns
/// `None` when quotes or brackets are unbalanced.
fn split_elements(body: &[u8]) -> Option<Vec<&[u8]>> {
    let mut elements = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut escaped = false;

    for (i, &b) in body.iter().enumerate() {
        if in_quote {
            match (escaped, b) {
                (true, _) => escaped = false,
                (false, b'\\') => escaped = true,
                (false, b'\'') => in_quote = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'\'' => in_quote = true,
            b'[' => depth += 1,
            b']' => depth = depth.checked_sub(1)?,
            b',' if depth == 0 => {
                elements.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }

    if in_quote || depth != 0 {
        return None;
    }
    elements.push(&body[start..]);
    Some(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str, tag: &str) -> Result<Value, DecodeError> {
        decode_value(raw.as_bytes(), Some(&TypeTag::parse(tag)), Escaping::Standard)
    }

    fn strings(items: &[&str]) -> Value {
        Value::Array(items.iter().map(|s| Value::String((*s).into())).collect())
    }

    fn ints(items: &[i64]) -> Value {
        Value::Array(items.iter().copied().map(Value::Int).collect())
    }

    // ── Scalars ─────────────────────────────────────────────────────────

    #[test]
    fn untyped_is_verbatim_text() {
        let value = decode_value(b"a\\nb", None, Escaping::Standard).unwrap();
        assert_eq!(value, Value::String("a\\nb".into()));
        assert_eq!(
            decode_value(b"nan", None, Escaping::Standard).unwrap(),
            Value::String("nan".into())
        );
    }

    #[test]
    fn small_integers_are_native() {
        assert_eq!(decode("1", "Int8").unwrap(), Value::Int(1));
        assert_eq!(decode("-1", "Int8").unwrap(), Value::Int(-1));
        assert_eq!(decode("4294967295", "UInt32").unwrap(), Value::Int(4_294_967_295));
    }

    #[test]
    fn wide_integers_are_exact() {
        for tag in ["Int64", "UInt64", "Int128", "UInt128", "Int256", "UInt256"] {
            assert_eq!(decode("1", tag).unwrap(), Value::BigInt(BigInt::from(1)));
        }
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let Value::BigInt(n) = decode(max, "UInt256").unwrap() else {
            panic!("expected big integer");
        };
        assert_eq!(n.to_string(), max);
    }

    #[test]
    fn special_floats() {
        assert!(decode("nan", "Float64").unwrap().as_f64().unwrap().is_nan());
        assert_eq!(decode("inf", "Float32").unwrap(), Value::Float(f64::INFINITY));
        assert_eq!(
            decode("-inf", "Float64").unwrap(),
            Value::Float(f64::NEG_INFINITY)
        );
        assert_eq!(decode("0.25", "Float32").unwrap(), Value::Float(0.25));
    }

    #[test]
    fn bool_is_true_only_for_true() {
        assert_eq!(decode("true", "Bool").unwrap(), Value::Bool(true));
        assert_eq!(decode("false", "Bool").unwrap(), Value::Bool(false));
        assert_eq!(decode("1", "Bool").unwrap(), Value::Bool(false));
    }

    #[test]
    fn string_partial_unescape() {
        assert_eq!(
            decode(r"a\\b\'c\nd\te", "String").unwrap(),
            Value::String("a\\b'c\nd\\te".into())
        );
    }

    #[test]
    fn raw_escaping_keeps_backslashes() {
        let value = decode_value(br"a\nb", Some(&TypeTag::String), Escaping::Raw).unwrap();
        assert_eq!(value, Value::String(r"a\nb".into()));
    }

    #[test]
    fn nullable() {
        assert_eq!(decode(r"\N", "Nullable(String)").unwrap(), Value::Null);
        assert_eq!(
            decode("x", "Nullable(String)").unwrap(),
            Value::String("x".into())
        );
        assert_eq!(decode("7", "Nullable(Int32)").unwrap(), Value::Int(7));
    }

    #[test]
    fn datetime_forms() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 6)
            .unwrap()
            .and_hms_opt(7, 8, 9)
            .unwrap();
        assert_eq!(
            decode("2023-05-06 07:08:09", "DateTime").unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            decode("2023-05-06T07:08:09Z", "DateTime('UTC')").unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            decode("1683356889", "DateTime").unwrap(),
            Value::DateTime(expected)
        );
        let Value::DateTime(precise) = decode("2023-05-06 07:08:09.123", "DateTime64(3)").unwrap()
        else {
            panic!("expected timestamp");
        };
        assert_eq!(precise.and_utc().timestamp_subsec_millis(), 123);
    }

    #[test]
    fn date_is_midnight() {
        let expected = NaiveDate::from_ymd_opt(2020, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(decode("2020-02-29", "Date").unwrap(), Value::DateTime(expected));
    }

    #[test]
    fn json_column() {
        let value = decode(r#"{"a":[1,2],"b":"x"}"#, "JSON").unwrap();
        assert_eq!(value.get("a"), Some(&ints(&[1, 2])));
        assert_eq!(value.get("b"), Some(&Value::String("x".into())));
    }

    #[test]
    fn addresses_are_validated() {
        assert_eq!(
            decode("10.0.0.1", "IPv4").unwrap(),
            Value::String("10.0.0.1".into())
        );
        assert_eq!(decode("::1", "IPv6").unwrap(), Value::String("::1".into()));
        assert!(matches!(
            decode("300.0.0.1", "IPv4"),
            Err(DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn low_cardinality_is_transparent() {
        assert_eq!(
            decode("x", "LowCardinality(String)").unwrap(),
            Value::String("x".into())
        );
    }

    #[test]
    fn invalid_numbers_fail() {
        let err = decode("abc", "Int32").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::InvalidValue { ref tag, ref text } if tag == "Int32" && text == "abc"
        ));
        assert!(decode("x1", "UInt64").is_err());
    }

    #[test]
    fn unsupported_type_fails() {
        let err = decode("1.50", "Decimal(10, 2)").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedType { ref tag } if tag == "Decimal(10, 2)"));
    }

    // ── Arrays ──────────────────────────────────────────────────────────

    #[test]
    fn empty_array() {
        assert_eq!(decode("[]", "Array(Int8)").unwrap(), Value::Array(Vec::new()));
    }

    #[test]
    fn numeric_arrays() {
        assert_eq!(decode("[1,2,3]", "Array(UInt32)").unwrap(), ints(&[1, 2, 3]));
        let Value::Array(wide) = decode("[1,2,3]", "Array(Int128)").unwrap() else {
            panic!("expected array");
        };
        assert_eq!(wide[2], Value::BigInt(BigInt::from(3)));
        assert_eq!(
            decode("[1.2,2.3]", "Array(Float32)").unwrap(),
            Value::Array(vec![Value::Float(1.2), Value::Float(2.3)])
        );
        assert_eq!(
            decode("[true,false]", "Array(Bool)").unwrap(),
            Value::Array(vec![Value::Bool(true), Value::Bool(false)])
        );
    }

    #[test]
    fn string_array_with_escapes() {
        assert_eq!(
            decode(r"['a','b\nb','c,c','d\'d']", "Array(String)").unwrap(),
            strings(&["a", "b\nb", "c,c", "d'd"])
        );
        assert_eq!(
            decode(r"['7\'8',',]9']", "Array(String)").unwrap(),
            strings(&["7'8", ",]9"])
        );
    }

    #[test]
    fn datetime_array_accepts_iso_text() {
        let Value::Array(items) = decode("['2024-03-01T10:20:30.456Z']", "Array(DateTime)").unwrap()
        else {
            panic!("expected array");
        };
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Value::DateTime(_)));
    }

    #[test]
    fn nested_and_nullable_arrays() {
        assert_eq!(
            decode("[[1,2],[],[3]]", "Array(Array(Int32))").unwrap(),
            Value::Array(vec![ints(&[1, 2]), ints(&[]), ints(&[3])])
        );
        assert_eq!(
            decode("[1,NULL,3]", "Array(Nullable(Int32))").unwrap(),
            Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)])
        );
        assert_eq!(
            decode("['a',NULL]", "Array(Nullable(String))").unwrap(),
            Value::Array(vec![Value::String("a".into()), Value::Null])
        );
    }

    #[test]
    fn malformed_arrays_fail() {
        assert!(decode("1,2", "Array(Int8)").is_err());
        assert!(decode("['a]", "Array(String)").is_err());
        assert!(decode("[a]", "Array(String)").is_err());
    }

    #[test]
    fn unsupported_array_element() {
        let err = decode("[{}]", "Array(JSON)").unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedType { ref tag } if tag == "Array(JSON)"));
    }
}
