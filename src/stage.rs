//! Processing stages composed into a field's pipeline.
//!
//! A field kind is an ordered list of stages. Each stage receives the value
//! produced by the previous one and either passes a (possibly converted)
//! value on or rejects it. Conversion always runs before the constraint
//! that depends on it:
//!
//! ```text
//! integer, float:  Coerce -> RangeLimit
//! string:          Coerce -> LengthLimit
//! boolean:         Coerce
//! list:            EachElement -> LengthLimit
//! ```

use std::fmt;

use crate::error::{ConfigurationError, ValidationError};
use crate::value::Value;

/// One step of a field pipeline.
///
/// Stages are immutable and shared between every invocation of the form
/// that declares them, so they must not keep per-request state.
///
/// # Examples
///
/// ```
/// use form_core::{Form, IntField, RequestAdapter, Source, Stage, ValidationError,
///     ValidationErrorKind, Value};
///
/// #[derive(Debug)]
/// struct Even;
///
/// impl Stage for Even {
///     fn apply(&self, field: &str, value: Value) -> Result<Value, ValidationError> {
///         match value.as_int() {
///             Some(n) if n % 2 != 0 => Err(ValidationError::new(
///                 field,
///                 ValidationErrorKind::Custom,
///                 format!("{field} must be even"),
///             )),
///             _ => Ok(value),
///         }
///     }
/// }
///
/// let form = Form::builder("Pairs")
///     .field("n", IntField::new().source(Source::Query).with_stage(Even))
///     .build()
///     .unwrap();
///
/// let request = RequestAdapter::default().with_query_string("n=3");
/// let err = form.bind(&request).get::<i64>("n").unwrap_err();
/// assert_eq!(err.to_string(), "n must be even");
/// ```
pub trait Stage: fmt::Debug + Send + Sync {
    /// Processes `value` for the field labelled `field`.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming `field` when the value is rejected.
    fn apply(&self, field: &str, value: Value) -> Result<Value, ValidationError>;
}

/// Scalar target types of the coercion stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    /// `i64`
    Integer,
    /// `f64`
    Float,
    /// UTF-8 text
    String,
    /// `true` / `false`
    Boolean,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Integer => write!(f, "integer"),
            ScalarType::Float => write!(f, "float"),
            ScalarType::String => write!(f, "string"),
            ScalarType::Boolean => write!(f, "boolean"),
        }
    }
}

/// Converts the incoming value to a scalar type.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Coerce(pub(crate) ScalarType);

impl Stage for Coerce {
    fn apply(&self, field: &str, value: Value) -> Result<Value, ValidationError> {
        let converted = match self.0 {
            ScalarType::Integer => to_integer(value),
            ScalarType::Float => to_float(value),
            ScalarType::String => to_text(value),
            ScalarType::Boolean => to_boolean(value),
        };
        converted.ok_or_else(|| ValidationError::conversion(field, self.0))
    }
}

// Largest magnitudes that survive an f64 -> i64 truncation.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn to_integer(value: Value) -> Option<Value> {
    match value {
        Value::Int(n) => Some(Value::Int(n)),
        Value::Str(s) => s.trim().parse::<i64>().ok().map(Value::Int),
        Value::Float(x) if x.is_finite() && x >= I64_LOWER && x < I64_UPPER => {
            Some(Value::Int(x.trunc() as i64))
        }
        Value::Bool(b) => Some(Value::Int(i64::from(b))),
        _ => None,
    }
}

fn to_float(value: Value) -> Option<Value> {
    match value {
        Value::Float(x) => Some(Value::Float(x)),
        Value::Int(n) => Some(Value::Float(n as f64)),
        Value::Str(s) => s.trim().parse::<f64>().ok().map(Value::Float),
        Value::Bool(b) => Some(Value::Float(if b { 1.0 } else { 0.0 })),
        _ => None,
    }
}

fn to_text(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Str(s) => Some(Value::Str(s)),
        // Whole floats keep their fraction: `1.0`, not `1`.
        Value::Float(x) if x.is_finite() && x.fract() == 0.0 => {
            Some(Value::Str(format!("{x:.1}")))
        }
        other => Some(Value::Str(other.to_string())),
    }
}

fn to_boolean(value: Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::Bool(b)),
        Value::Int(0) => Some(Value::Bool(false)),
        Value::Int(1) => Some(Value::Bool(true)),
        Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(Value::Bool(true)),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

/// Bounds the length of strings (in characters) and lists (in items).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LengthLimit {
    pub(crate) min: Option<usize>,
    pub(crate) max: Option<usize>,
}

impl LengthLimit {
    pub(crate) fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub(crate) fn check_bounds(&self, field: &str) -> Result<(), ConfigurationError> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(ConfigurationError::InvertedBounds {
                field: field.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl Stage for LengthLimit {
    fn apply(&self, field: &str, value: Value) -> Result<Value, ValidationError> {
        let len = match &value {
            Value::Str(s) => s.chars().count(),
            Value::List(items) => items.len(),
            _ => return Ok(value),
        };
        if let Some(max) = self.max {
            if len > max {
                return Err(ValidationError::max_length(field, max, len));
            }
        }
        if let Some(min) = self.min {
            if len < min {
                return Err(ValidationError::min_length(field, min, len));
            }
        }
        Ok(value)
    }
}

/// Numbers a [`RangeLimit`] can bound.
pub(crate) trait Bounded: Copy + PartialOrd + fmt::Display + fmt::Debug + Send + Sync {
    fn extract(value: &Value) -> Option<Self>;

    fn is_finite(&self) -> bool {
        true
    }
}

impl Bounded for i64 {
    fn extract(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl Bounded for f64 {
    fn extract(value: &Value) -> Option<Self> {
        value.as_float()
    }

    fn is_finite(&self) -> bool {
        f64::is_finite(*self)
    }
}

/// Bounds a number from above and/or below.
///
/// Bounds are inclusive unless marked otherwise: with an inclusive `max` the
/// value is rejected when `value > max`, with an exclusive one when
/// `value >= max`; `min` mirrors this.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RangeLimit<T> {
    pub(crate) min: Option<T>,
    pub(crate) max: Option<T>,
    pub(crate) inclusive_min: bool,
    pub(crate) inclusive_max: bool,
}

impl<T> Default for RangeLimit<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            inclusive_min: true,
            inclusive_max: true,
        }
    }
}

impl<T: Bounded> RangeLimit<T> {
    pub(crate) fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub(crate) fn check_bounds(&self, field: &str) -> Result<(), ConfigurationError> {
        for bound in self.min.iter().chain(self.max.iter()) {
            if !bound.is_finite() {
                return Err(ConfigurationError::NonFiniteBound {
                    field: field.to_string(),
                    bound: bound.to_string(),
                });
            }
        }
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Err(ConfigurationError::InvertedBounds {
                field: field.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl<T: Bounded> Stage for RangeLimit<T> {
    fn apply(&self, field: &str, value: Value) -> Result<Value, ValidationError> {
        let Some(number) = T::extract(&value) else {
            return Ok(value);
        };
        if let Some(max) = self.max {
            let invalid = if self.inclusive_max { number > max } else { number >= max };
            if invalid {
                return Err(ValidationError::max_value(field, max, number));
            }
        }
        if let Some(min) = self.min {
            let invalid = if self.inclusive_min { number < min } else { number <= min };
            if invalid {
                return Err(ValidationError::min_value(field, min, number));
            }
        }
        Ok(value)
    }
}
