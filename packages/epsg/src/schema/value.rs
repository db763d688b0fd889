//! Loosely typed input values and their coercion to declared field types.
//!
//! Field setters take a [`Value`] so that callers (and the loader, which
//! only ever sees text) can hand over whatever representation they have.
//! Coercion is strict: anything that does not fit the declared type is a
//! [`EpsgError::TypeCoercion`].

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{EpsgError, Result};

/// Date format accepted for text dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// An untyped field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Value {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Text(text) => format!("'{text}'"),
            Self::Integer(value) => format!("integer {value}"),
            Self::Float(value) => format!("float {value}"),
            Self::Date(date) => format!("date {date}"),
            Self::DateTime(datetime) => format!("datetime {datetime}"),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::DateTime(datetime)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

fn mismatch(identifier: &str, field: &str, expected: &'static str, found: &Value) -> EpsgError {
    EpsgError::TypeCoercion {
        identifier: identifier.to_string(),
        field: field.to_string(),
        expected,
        found: found.describe(),
    }
}

/// Coerce to an optional calendar date.
///
/// Accepts a date, a datetime (its date part), a `YYYY-MM-DD` string or null.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use epsg_registry::schema::{coerce_date, Value};
///
/// let date = coerce_date("urn:x", "realizationEpoch", Value::from("1936-01-01")).unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(1936, 1, 1));
/// assert!(coerce_date("urn:x", "realizationEpoch", Value::from(99)).is_err());
/// ```
pub fn coerce_date(identifier: &str, field: &str, value: Value) -> Result<Option<NaiveDate>> {
    match value {
        Value::Null => Ok(None),
        Value::Date(date) => Ok(Some(date)),
        Value::DateTime(datetime) => Ok(Some(datetime.date())),
        Value::Text(ref text) => parse_date(text)
            .map(Some)
            .ok_or_else(|| mismatch(identifier, field, "a YYYY-MM-DD date", &value)),
        other => Err(mismatch(identifier, field, "a YYYY-MM-DD date", &other)),
    }
}

/// Coerce to a float. Numeric-literal strings are parsed; null is rejected.
pub fn coerce_float(identifier: &str, field: &str, value: Value) -> Result<f64> {
    coerce_optional_float(identifier, field, value)?.ok_or_else(|| EpsgError::TypeCoercion {
        identifier: identifier.to_string(),
        field: field.to_string(),
        expected: "a floating point number",
        found: "null".to_string(),
    })
}

/// Coerce to an optional float. Null maps to `None`.
pub fn coerce_optional_float(identifier: &str, field: &str, value: Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Float(number) if number.is_finite() => Ok(Some(number)),
        #[allow(clippy::cast_precision_loss)]
        Value::Integer(number) => Ok(Some(number as f64)),
        Value::Text(ref text) => parse_float(text)
            .map(Some)
            .ok_or_else(|| mismatch(identifier, field, "a floating point number", &value)),
        other => Err(mismatch(identifier, field, "a floating point number", &other)),
    }
}

/// Parse a finite numeric literal, surrounding whitespace allowed.
///
/// `NaN` and infinities are rejected: they cannot be stored as JSON numbers.
#[must_use]
pub fn parse_float(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

/// Parse a strict `YYYY-MM-DD` date.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    // chrono accepts unpadded fields; the export never uses them
    if text.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const URN: &str = "urn:ogc:def:datum:EPSG::6277";

    fn epoch() -> NaiveDate {
        NaiveDate::from_ymd_opt(1936, 1, 1).unwrap()
    }

    #[test]
    fn test_date_coercion_accepts_equivalent_inputs() {
        let from_text = coerce_date(URN, "realizationEpoch", "1936-01-01".into()).unwrap();
        let from_date = coerce_date(URN, "realizationEpoch", epoch().into()).unwrap();
        let midnight = epoch().and_hms_opt(0, 0, 0).unwrap();
        let from_datetime = coerce_date(URN, "realizationEpoch", midnight.into()).unwrap();

        assert_eq!(from_text, Some(epoch()));
        assert_eq!(from_date, Some(epoch()));
        assert_eq!(from_datetime, Some(epoch()));
    }

    #[test]
    fn test_date_coercion_null() {
        assert_eq!(coerce_date(URN, "realizationEpoch", Value::Null).unwrap(), None);
        assert_eq!(
            coerce_date(URN, "realizationEpoch", Option::<NaiveDate>::None.into()).unwrap(),
            None
        );
    }

    #[test]
    fn test_date_coercion_rejects_integer() {
        let err = coerce_date(URN, "realizationEpoch", 99.into()).unwrap_err();
        match err {
            EpsgError::TypeCoercion { field, found, .. } => {
                assert_eq!(field, "realizationEpoch");
                assert_eq!(found, "integer 99");
            }
            other => panic!("expected TypeCoercion, got {other:?}"),
        }
    }

    #[test]
    fn test_date_coercion_rejects_other_formats() {
        assert!(coerce_date(URN, "realizationEpoch", "01/01/1936".into()).is_err());
        assert!(coerce_date(URN, "realizationEpoch", "1936-1-1".into()).is_err());
        assert!(coerce_date(URN, "realizationEpoch", "1936".into()).is_err());
        assert!(coerce_date(URN, "realizationEpoch", 1936.0.into()).is_err());
    }

    #[test]
    fn test_float_coercion() {
        assert_eq!(coerce_float(URN, "x", "6377563.396".into()).unwrap(), 6_377_563.396);
        assert_eq!(coerce_float(URN, "x", " -8.73 ".into()).unwrap(), -8.73);
        assert_eq!(coerce_float(URN, "x", 0.into()).unwrap(), 0.0);
        assert_eq!(coerce_float(URN, "x", 2.5.into()).unwrap(), 2.5);
    }

    #[test]
    fn test_float_coercion_rejects_non_numeric() {
        assert!(coerce_float(URN, "x", "abc".into()).unwrap_err().is_integrity_error());
        assert!(coerce_float(URN, "x", Value::Null).is_err());
        assert!(coerce_float(URN, "x", epoch().into()).is_err());
    }

    #[test]
    fn test_float_coercion_rejects_non_finite() {
        for text in ["NaN", "inf", "-infinity"] {
            let err = coerce_float(URN, "greenwichLongitude", text.into()).unwrap_err();
            assert!(matches!(err, EpsgError::TypeCoercion { .. }), "{text}");
        }
        assert!(coerce_optional_float(URN, "x", f64::NAN.into()).is_err());
        assert!(coerce_optional_float(URN, "x", f64::INFINITY.into()).is_err());
        assert_eq!(parse_float("1e3"), Some(1000.0));
        assert_eq!(parse_float("inf"), None);
    }

    #[test]
    fn test_optional_float_coercion() {
        assert_eq!(coerce_optional_float(URN, "x", Value::Null).unwrap(), None);
        assert_eq!(
            coerce_optional_float(URN, "x", "299.3249646".into()).unwrap(),
            Some(299.324_964_6)
        );
    }
}
