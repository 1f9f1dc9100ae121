//! String-encoded JSON fields
//!
//! Every value on the TTM wire is a JSON string holding a decimal number.
//! Reading rejects native JSON numbers; writing always produces strings.

use std::fmt::Display;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{ConvError, ConvResult};

/// View over one JSON object, remembering its path for error messages
pub(crate) struct Fields<'a> {
    obj: &'a Map<String, Value>,
    path: Option<String>,
}

impl<'a> Fields<'a> {
    pub(crate) fn root(value: &'a Value) -> ConvResult<Self> {
        match value {
            Value::Object(obj) => Ok(Self { obj, path: None }),
            other => Err(ConvError::InvalidJson(format!(
                "expected object, got {}",
                kind_of(other)
            ))),
        }
    }

    fn qualified(&self, name: &str) -> String {
        match &self.path {
            Some(prefix) => format!("{}.{}", prefix, name),
            None => name.to_string(),
        }
    }

    pub(crate) fn has(&self, name: &str) -> bool {
        self.obj.contains_key(name)
    }

    /// Raw string value of a required field
    pub(crate) fn text(&self, name: &str) -> ConvResult<&'a str> {
        match self.obj.get(name) {
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(ConvError::InvalidField {
                field: self.qualified(name),
                value: other.to_string(),
            }),
            None => Err(ConvError::MissingField(self.qualified(name))),
        }
    }

    /// Parse a required field from its decimal string form
    pub(crate) fn parse<T: FromStr>(&self, name: &str) -> ConvResult<T> {
        let raw = self.text(name)?;
        raw.parse().map_err(|_| ConvError::InvalidField {
            field: self.qualified(name),
            value: raw.to_string(),
        })
    }

    /// Nested object field
    pub(crate) fn child(&self, name: &str) -> ConvResult<Fields<'a>> {
        match self.obj.get(name) {
            Some(Value::Object(obj)) => Ok(Fields {
                obj,
                path: Some(self.qualified(name)),
            }),
            Some(other) => Err(ConvError::InvalidField {
                field: self.qualified(name),
                value: other.to_string(),
            }),
            None => Err(ConvError::MissingField(self.qualified(name))),
        }
    }
}

/// Encode any displayable value as a JSON string
pub(crate) fn text<T: Display>(value: T) -> Value {
    Value::String(value.to_string())
}

/// Encode a float as the shorter of its plain and exponent forms
///
/// Both forms are the shortest digits that parse back to the same value;
/// plain `Display` alone spells out every zero of very large or small values.
pub(crate) fn float(value: f64) -> Value {
    let plain = value.to_string();
    let exp = format!("{:e}", value);
    Value::String(if exp.len() < plain.len() { exp } else { plain })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
