use serde_json::{Number, Value};

use crate::form::FormError;

/// A reply delivered by the transport, already classified.
///
/// Closing a form on the remote side arrives either as no data at all or as a
/// JSON `null`; both become [`Payload::Cancelled`]. Anything else is kept as the
/// decoded JSON value so containers can match on it exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Cancelled,
    Reply(Value),
}

impl Payload {
    /// Classify raw wire bytes. Malformed JSON (including invalid UTF-8) is a
    /// shape error.
    pub fn from_bytes(data: Option<&[u8]>) -> Result<Self, FormError> {
        let Some(data) = data else {
            return Ok(Payload::Cancelled);
        };
        let value: Value = serde_json::from_slice(data).map_err(FormError::Malformed)?;
        Ok(Self::from_value(value))
    }

    /// Same as [`Payload::from_bytes`] for transports that hand over text.
    pub fn from_text(data: Option<&str>) -> Result<Self, FormError> {
        Self::from_bytes(data.map(str::as_bytes))
    }

    pub fn from_value(value: Value) -> Self {
        if value.is_null() {
            Payload::Cancelled
        } else {
            Payload::Reply(value)
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Payload::Cancelled)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

/// Short name of a JSON value's type, used in error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Integral value of a JSON number used as an index. `-0` parses as a float
/// but still names index zero; any other fractional form does not.
pub(crate) fn as_index(number: &Number) -> Option<i128> {
    if let Some(index) = number.as_i64() {
        return Some(i128::from(index));
    }
    if let Some(index) = number.as_u64() {
        return Some(i128::from(index));
    }
    match number.as_f64() {
        Some(value) if value == 0.0 && value.is_sign_negative() => Some(0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_data_is_cancellation() {
        assert_eq!(Payload::from_bytes(None).unwrap(), Payload::Cancelled);
    }

    #[test]
    fn null_with_trailing_newline_is_cancellation() {
        let payload = Payload::from_text(Some("null\n")).unwrap();
        assert!(payload.is_cancelled());
    }

    #[test]
    fn reply_keeps_integer_precision() {
        let payload = Payload::from_text(Some("9007199254740993")).unwrap();
        match payload {
            Payload::Reply(Value::Number(number)) => {
                assert_eq!(number.as_i64(), Some(9_007_199_254_740_993));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = Payload::from_text(Some("[1, 2")).unwrap_err();
        assert!(matches!(err, FormError::Malformed(_)));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = Payload::from_bytes(Some(b"[\"\xff\"]")).unwrap_err();
        assert!(matches!(err, FormError::Malformed(_)));
    }

    #[test]
    fn value_kind_distinguishes_integers_from_floats() {
        assert_eq!(value_kind(&json!(1)), "integer");
        assert_eq!(value_kind(&json!(1.5)), "float");
        assert_eq!(value_kind(&json!("x")), "string");
    }

    #[test]
    fn negative_zero_is_index_zero() {
        let Payload::Reply(Value::Number(number)) = Payload::from_text(Some("-0")).unwrap() else {
            panic!("expected a number");
        };
        assert_eq!(as_index(&number), Some(0));

        let Value::Number(fraction) = json!(0.5) else {
            unreachable!()
        };
        assert_eq!(as_index(&fraction), None);
        let Value::Number(huge) = json!(u64::MAX) else {
            unreachable!()
        };
        assert_eq!(as_index(&huge), Some(i128::from(u64::MAX)));
    }
}
