use serde_json::{Map, Value};
use crate::codec::JsonCodec;

/// Outcome of reading an item.
///
/// `Rejected` and `Null` are deliberately separate: the first is what an empty
/// name or an expired entry yields, the second is what a backend answers for a key
/// that was never written (or that holds the JSON literal `null`).
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Rejected,
    Null,
    Text(String),
    /// A decoded JSON object or array.
    Structured(Value),
}

impl Lookup {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Lookup::Rejected)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Lookup::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Lookup::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            Lookup::Structured(v) => v.as_object(),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Rejected => None,
            Lookup::Null => Some(Value::Null),
            Lookup::Text(s) => Some(Value::String(s)),
            Lookup::Structured(v) => Some(v),
        }
    }
}

/// Turns a caller's value into the string that is stored.
///
/// Strings are stored verbatim, numbers and booleans as their text. Everything
/// else needs the codec; without one the value cannot be stored and `None` is
/// returned.
pub(crate) fn to_stored(value: &Value, codec: Option<&dyn JsonCodec>) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => {
            let codec = codec?;
            match codec.encode(value) {
                Ok(encoded) => Some(encoded),
                Err(e) => {
                    log::warn!("storage: cannot encode value: {e}");
                    None
                }
            }
        }
    }
}

/// Interprets a raw stored string.
///
/// Only objects and arrays replace the raw string; a decoded scalar such as the
/// number behind `"5"` is dropped and the raw text is returned instead.
pub(crate) fn from_stored(raw: Option<String>, codec: Option<&dyn JsonCodec>) -> Lookup {
    let Some(raw) = raw else {
        return Lookup::Null;
    };
    let Some(codec) = codec else {
        return Lookup::Text(raw);
    };
    match codec.decode(&raw) {
        Ok(Value::Null) => Lookup::Null,
        Ok(v @ (Value::Object(_) | Value::Array(_))) => Lookup::Structured(v),
        Ok(_) | Err(_) => Lookup::Text(raw),
    }
}
