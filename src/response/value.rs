//! Return values produced at the engine boundary.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine as _;
use serde_json::{Number, Value};

/// Key of a DAG-JSON link or bytes object
const DAG_JSON_KEY: &str = "/";

/// Tagged output of a function run
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    String(String),
    Number(Number),
    Sequence(Vec<Value>),
    Binary(Vec<u8>),
    /// Booleans, null and objects that are not DAG-JSON bytes
    Other(Value),
}

impl ReturnValue {
    /// Classify a JSON output reported by the engine.
    ///
    /// Byte outputs arrive as DAG-JSON `{"/": {"bytes": "<base64>"}}`.
    pub fn from_engine_output(out: Value) -> Self {
        match out {
            Value::String(s) => ReturnValue::String(s),
            Value::Number(n) => ReturnValue::Number(n),
            Value::Array(items) => ReturnValue::Sequence(items),
            Value::Object(obj) => match decode_dag_json_bytes(&obj) {
                Some(bytes) => ReturnValue::Binary(bytes),
                None => ReturnValue::Other(Value::Object(obj)),
            },
            other => ReturnValue::Other(other),
        }
    }

    /// Discriminator reported in batch results
    pub fn kind(&self) -> &'static str {
        match self {
            ReturnValue::String(_) => "string",
            ReturnValue::Number(_) => "number",
            ReturnValue::Sequence(_) => "sequence",
            ReturnValue::Binary(_) => "binary",
            ReturnValue::Other(_) => "other",
        }
    }
}

impl From<Value> for ReturnValue {
    fn from(out: Value) -> Self {
        Self::from_engine_output(out)
    }
}

impl From<Vec<u8>> for ReturnValue {
    fn from(bytes: Vec<u8>) -> Self {
        ReturnValue::Binary(bytes)
    }
}

fn decode_dag_json_bytes(obj: &serde_json::Map<String, Value>) -> Option<Vec<u8>> {
    if obj.len() != 1 {
        return None;
    }
    let encoded = obj.get(DAG_JSON_KEY)?.get("bytes")?.as_str()?;

    STANDARD_NO_PAD
        .decode(encoded)
        .or_else(|_| STANDARD.decode(encoded))
        .ok()
}

/// Text rendering of a number; integral values carry no fractional part
pub struct DisplayNumber<'a>(pub &'a Number);

impl fmt::Display for DisplayNumber<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", integral(self.0))
    }
}

/// `n` as an integer when it is a float with no fractional part that an
/// `f64` represents exactly
pub fn integral(n: &Number) -> Number {
    match n.as_f64() {
        Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 => {
            Number::from(v as i64)
        }
        _ => n.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classifies_json_shapes() {
        assert_eq!(
            ReturnValue::from_engine_output(json!("hi")),
            ReturnValue::String("hi".into())
        );
        assert_eq!(ReturnValue::from_engine_output(json!(5)).kind(), "number");
        assert_eq!(ReturnValue::from_engine_output(json!([1])).kind(), "sequence");
        assert_eq!(ReturnValue::from_engine_output(json!(true)).kind(), "other");
        assert_eq!(ReturnValue::from_engine_output(json!({ "a": 1 })).kind(), "other");
    }

    #[test]
    fn test_decodes_dag_json_bytes() {
        let padded = ReturnValue::from_engine_output(json!({ "/": { "bytes": "aGVsbG8=" } }));
        let unpadded = ReturnValue::from_engine_output(json!({ "/": { "bytes": "aGVsbG8" } }));

        assert_eq!(padded, ReturnValue::Binary(b"hello".to_vec()));
        assert_eq!(unpadded, ReturnValue::Binary(b"hello".to_vec()));
    }

    #[test]
    fn test_link_is_not_bytes() {
        let link = json!({ "/": "bafyreia" });
        assert_eq!(
            ReturnValue::from_engine_output(link.clone()),
            ReturnValue::Other(link)
        );
    }

    #[test]
    fn test_integral_float_prints_without_fraction() {
        let five = Number::from_f64(5.0).unwrap();
        let half = Number::from_f64(2.5).unwrap();

        assert_eq!(DisplayNumber(&five).to_string(), "5");
        assert_eq!(DisplayNumber(&half).to_string(), "2.5");
        assert_eq!(DisplayNumber(&Number::from(-7)).to_string(), "-7");
    }

    #[test]
    fn test_integral_floats_become_integers() {
        let three = Number::from_f64(3.0).unwrap();
        let half = Number::from_f64(0.5).unwrap();

        assert!(integral(&three).is_i64());
        assert_eq!(integral(&three), Number::from(3));
        assert_eq!(integral(&half), half);
    }
}
