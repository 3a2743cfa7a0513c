use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::bind::{self, BindError, Bindable};

/// One decoded element value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FormValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FormValue::Text(_) => "string",
            FormValue::Int(_) => "integer",
            FormValue::Float(_) => "float",
            FormValue::Bool(_) => "bool",
        }
    }

    /// The JSON shape a client would send back for this value.
    pub fn to_value(&self) -> Value {
        match self {
            FormValue::Text(text) => Value::String(text.clone()),
            FormValue::Int(number) => Value::from(*number),
            FormValue::Float(number) => Value::from(*number),
            FormValue::Bool(flag) => Value::Bool(*flag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResponseError {
    #[error("no value submitted for '{key}'")]
    Missing { key: String },
    #[error("value for '{key}' is {found}, not {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Decoded values of one successful custom form submission, keyed by element
/// key. Built by the form during decode and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Response {
    values: BTreeMap<String, FormValue>,
}

impl Response {
    pub(crate) fn new(values: BTreeMap<String, FormValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn string(&self, key: &str) -> Result<&str, ResponseError> {
        match self.lookup(key)? {
            FormValue::Text(text) => Ok(text),
            other => Err(wrong_type(key, "string", other)),
        }
    }

    /// Dropdown and step slider indices. Slider values are floats and are not
    /// widened here.
    pub fn integer(&self, key: &str) -> Result<i64, ResponseError> {
        match self.lookup(key)? {
            FormValue::Int(number) => Ok(*number),
            other => Err(wrong_type(key, "integer", other)),
        }
    }

    pub fn float(&self, key: &str) -> Result<f64, ResponseError> {
        match self.lookup(key)? {
            FormValue::Float(number) => Ok(*number),
            other => Err(wrong_type(key, "float", other)),
        }
    }

    pub fn bool(&self, key: &str) -> Result<bool, ResponseError> {
        match self.lookup(key)? {
            FormValue::Bool(flag) => Ok(*flag),
            other => Err(wrong_type(key, "bool", other)),
        }
    }

    /// Copy values into the tagged fields of `destination`.
    pub fn bind<T: Bindable + ?Sized>(&self, destination: &mut T) -> Result<(), BindError> {
        bind::bind(self, destination)
    }

    pub fn to_value(&self) -> Value {
        let map = self
            .values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_value()))
            .collect::<Map<_, _>>();
        Value::Object(map)
    }

    fn lookup(&self, key: &str) -> Result<&FormValue, ResponseError> {
        self.values.get(key).ok_or_else(|| ResponseError::Missing {
            key: key.to_string(),
        })
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &FormValue) -> ResponseError {
    ResponseError::WrongType {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

impl FromIterator<(String, FormValue)> for Response {
    fn from_iter<I: IntoIterator<Item = (String, FormValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Response {
        Response::from_iter([
            ("name".to_string(), FormValue::Text("Pig".into())),
            ("age".to_string(), FormValue::Float(10.0)),
            ("color".to_string(), FormValue::Int(2)),
            ("something".to_string(), FormValue::Bool(true)),
        ])
    }

    #[test]
    fn typed_accessors_return_matching_values() {
        let response = sample();
        assert_eq!(response.string("name").unwrap(), "Pig");
        assert_eq!(response.float("age").unwrap(), 10.0);
        assert_eq!(response.integer("color").unwrap(), 2);
        assert!(response.bool("something").unwrap());
    }

    #[test]
    fn accessors_do_not_widen_numbers() {
        let response = sample();
        assert_eq!(
            response.integer("age").unwrap_err(),
            ResponseError::WrongType {
                key: "age".into(),
                expected: "integer",
                found: "float",
            }
        );
        assert!(response.float("color").is_err());
    }

    #[test]
    fn missing_key_is_reported() {
        let response = sample();
        assert_eq!(
            response.string("nickname").unwrap_err(),
            ResponseError::Missing {
                key: "nickname".into()
            }
        );
    }

    #[test]
    fn to_value_produces_plain_json_object() {
        let value = sample().to_value();
        assert_eq!(value["name"], "Pig");
        assert_eq!(value["color"], 2);
        assert_eq!(value["something"], true);
    }
}
