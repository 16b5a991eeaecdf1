//! Tagged parameter values.
//!
//! Stage parameters are dynamically typed at the API boundary: a value is a
//! float, a piece of text (waveform and filter-type labels), or a bool. The
//! serde representation is untagged so the preset wire format can use plain
//! JSON numbers, strings, and booleans.

use serde::{Deserialize, Serialize};

/// A tagged parameter value.
///
/// Setting a parameter with the wrong variant fails with a type-mismatch
/// error; the declared type of each parameter never changes over a stage's
/// lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Numeric value (frequencies, amplitudes, times, ...).
    Float(f64),
    /// Textual value (waveform and filter-type labels).
    Text(String),
    /// Boolean value.
    Bool(bool),
}

impl ParamValue {
    /// Returns the float payload, or `None` for text/bool values.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, or `None` for float/bool values.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the bool payload, or `None` for float/text values.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Name of the contained type, for error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Float(_) => "float",
            ParamValue::Text(_) => "text",
            ParamValue::Bool(_) => "bool",
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Text(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        assert_eq!(ParamValue::Float(1.5).as_float(), Some(1.5));
        assert_eq!(ParamValue::Float(1.5).as_text(), None);
        assert_eq!(ParamValue::from("sine").as_text(), Some("sine"));
        assert_eq!(ParamValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ParamValue::Bool(true).as_float(), None);
    }

    #[test]
    fn type_names() {
        assert_eq!(ParamValue::Float(0.0).type_name(), "float");
        assert_eq!(ParamValue::from("x").type_name(), "text");
        assert_eq!(ParamValue::Bool(false).type_name(), "bool");
    }

    #[test]
    fn untagged_json_round_trip() {
        let values = vec![
            ParamValue::Float(440.0),
            ParamValue::from("triangle"),
            ParamValue::Bool(true),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[440.0,"triangle",true]"#);
        let back: Vec<ParamValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }
}
