use chrono::NaiveDateTime;
use num_bigint::BigInt;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Textual timestamp layout used by the server and by serialization.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One decoded value.
///
/// A data row is itself a `Value`: an [`Array`](Value::Array) of column
/// values when the response carries no names, or a [`Map`](Value::Map)
/// of column name to value when it does. The map keeps column order.
///
/// Native numbers and big integers are distinct kinds. Wide integer
/// columns (`Int64` and up) always decode to [`BigInt`](Value::BigInt)
/// so no precision is lost to a floating representation.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    BigInt(BigInt),
    String(String),
    DateTime(NaiveDateTime),
    Array(Vec<Value>),
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Look up a column of a [`Map`](Value::Map) row by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries.iter().find(|(k, _)| k == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Integer view of `Int` and of `BigInt` values that fit in `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::BigInt(n) => i64::try_from(n).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    /// Convert an embedded JSON document. Integers that do not fit in
    /// `i64` become big integers rather than floats.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::BigInt(BigInt::from(u))
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(x) if x.is_nan() => serializer.serialize_str("nan"),
            Self::Float(x) if x.is_infinite() => {
                serializer.serialize_str(if *x > 0.0 { "inf" } else { "-inf" })
            }
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::BigInt(n) => serializer.collect_str(n),
            Self::String(s) => serializer.serialize_str(s),
            Self::DateTime(ts) => serializer.collect_str(&ts.format(DATETIME_FORMAT)),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}
