use std::fmt;

use thiserror::Error;

use crate::source::Source;

/// Errors that can occur while declaring or resolving a form.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A field or form declaration is invalid
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The request carried several values for a single-valued field
    #[error(transparent)]
    Ambiguous(#[from] AmbiguousFieldError),
    /// A field value failed a required, conversion or constraint check
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The current-form accessor was used incorrectly
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl Error {
    /// Returns the validation error, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// An invalid declaration, reported before any invocation runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The request source name is not one of `query`, `body` or `json`
    #[error("request source `{0}` is not valid")]
    InvalidSource(String),
    /// A field was registered without a name
    #[error("form `{form}` declares a field with an empty name")]
    EmptyFieldName {
        /// Form being declared
        form: String,
    },
    /// The same field name was declared twice in one form
    #[error("form `{form}` declares field `{field}` more than once")]
    DuplicateField {
        /// Form being declared
        form: String,
        /// Field declared twice
        field: String,
    },
    /// A minimum bound is greater than the matching maximum bound
    #[error("field `{field}` has min {min} greater than max {max}")]
    InvertedBounds {
        /// Field being declared
        field: String,
        /// Lower bound as written
        min: String,
        /// Upper bound as written
        max: String,
    },
    /// A float bound is NaN or infinite
    #[error("field `{field}` has a non-finite bound {bound}")]
    NonFiniteBound {
        /// Field being declared
        field: String,
        /// Offending bound as written
        bound: String,
    },
}

/// Several raw values were found for a field that accepts exactly one.
///
/// Multi-valued parameters are not supported directly; declare a list
/// field and send the values comma separated instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "multi values form field {field} is not supported \
     ({count} values in {origin}); use a list field"
)]
pub struct AmbiguousFieldError {
    field: String,
    origin: Source,
    count: usize,
}

impl AmbiguousFieldError {
    pub(crate) fn new(field: impl Into<String>, origin: Source, count: usize) -> Self {
        Self {
            field: field.into(),
            origin,
            count,
        }
    }

    /// Returns the name of the ambiguous field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the source the values were read from.
    pub fn origin(&self) -> Source {
        self.origin
    }

    /// Returns how many values were found.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// A field value was rejected during resolution.
///
/// The message always names the field and the violated rule. Elements of
/// list fields are labelled `name[index]`.
///
/// # Examples
///
/// ```
/// use form_core::{ValidationError, ValidationErrorKind};
///
/// let error = ValidationError::required("age");
/// assert_eq!(error.kind(), ValidationErrorKind::Required);
/// assert_eq!(error.to_string(), "age is required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    field: String,
    kind: ValidationErrorKind,
    message: String,
}

impl ValidationError {
    /// Creates a validation error with a custom message.
    ///
    /// Intended for caller-supplied stages.
    pub fn new(
        field: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    /// The field is required but no value was sent.
    pub fn required(field: &str) -> Self {
        Self::new(field, ValidationErrorKind::Required, format!("{field} is required"))
    }

    /// The raw value cannot be represented as `target`.
    pub fn conversion(field: &str, target: impl fmt::Display) -> Self {
        Self::new(
            field,
            ValidationErrorKind::Conversion,
            format!("{field} cannot be converted to {target}"),
        )
    }

    pub(crate) fn max_length(field: &str, limit: usize, actual: usize) -> Self {
        Self::new(
            field,
            ValidationErrorKind::MaxLength,
            format!("{field} is limited to max length {limit} but actually is {actual}"),
        )
    }

    pub(crate) fn min_length(field: &str, limit: usize, actual: usize) -> Self {
        Self::new(
            field,
            ValidationErrorKind::MinLength,
            format!("{field} is limited to min length {limit} but actually is {actual}"),
        )
    }

    pub(crate) fn max_value(
        field: &str,
        limit: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self::new(
            field,
            ValidationErrorKind::MaxValue,
            format!("{field} is limited to max value {limit} but actually is {actual}"),
        )
    }

    pub(crate) fn min_value(
        field: &str,
        limit: impl fmt::Display,
        actual: impl fmt::Display,
    ) -> Self {
        Self::new(
            field,
            ValidationErrorKind::MinValue,
            format!("{field} is limited to min value {limit} but actually is {actual}"),
        )
    }

    /// Returns the label of the rejected field (`name` or `name[index]`).
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns the violated rule.
    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The rule a [`ValidationError`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Required field is absent or empty.
    Required,
    /// Value cannot be converted to the declared type.
    Conversion,
    /// Value is longer than `max_length`.
    MaxLength,
    /// Value is shorter than `min_length`.
    MinLength,
    /// Value is above the upper bound.
    MaxValue,
    /// Value is below the lower bound.
    MinValue,
    /// Rejected by a caller-supplied stage.
    Custom,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Conversion => write!(f, "conversion"),
            Self::MaxLength => write!(f, "max length"),
            Self::MinLength => write!(f, "min length"),
            Self::MaxValue => write!(f, "max value"),
            Self::MinValue => write!(f, "min value"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Misuse of the current-form accessor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// No request scope is active on this task or thread
    #[error("working outside of a request scope")]
    NoRequestScope,
    /// A request scope is active but no wrapped handler is running
    #[error("no form is bound to the current invocation")]
    NoActiveForm,
    /// The accessor was called from inside a field's own resolution
    #[error("form accessed while one of its fields is resolving")]
    Reentrant,
    /// The active form has no field with this name
    #[error("form `{form}` has no field `{field}`")]
    UnknownField {
        /// Active form
        form: String,
        /// Requested field
        field: String,
    },
    /// The resolved value is not of the requested Rust type
    #[error("field `{field}` holds {found}, expected {expected}")]
    TypeMismatch {
        /// Requested field
        field: String,
        /// Requested type
        expected: &'static str,
        /// Kind of the resolved value
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_field_and_rule() {
        assert_eq!(
            ValidationError::conversion("a", "integer").to_string(),
            "a cannot be converted to integer"
        );
        assert_eq!(
            ValidationError::max_length("b", 4, 5).to_string(),
            "b is limited to max length 4 but actually is 5"
        );
        assert_eq!(
            ValidationError::min_value("s", 5, 4).to_string(),
            "s is limited to min value 5 but actually is 4"
        );
    }

    #[test]
    fn top_level_error_is_transparent() {
        let err: Error = ValidationError::required("x").into();
        assert_eq!(err.to_string(), "x is required");
        assert_eq!(err.as_validation().map(|v| v.kind()), Some(ValidationErrorKind::Required));

        let err: Error = AmbiguousFieldError::new("x", Source::Query, 2).into();
        assert!(err.to_string().contains("multi values form field x"));
        assert!(err.as_validation().is_none());
    }

    #[test]
    fn kind_display() {
        assert_eq!(ValidationErrorKind::MaxValue.to_string(), "max value");
    }
}
