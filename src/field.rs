//! Field declarations and the resolve algorithm.

use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigurationError, Error, ValidationError};
use crate::source::{self, Source};
use crate::stage::{Coerce, LengthLimit, RangeLimit, ScalarType, Stage};
use crate::value::Value;
use crate::web::RequestData;

/// The kind of a declared field, which fixes its pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Raw value passed through unchanged
    Raw,
    /// `i64` with optional range bounds
    Integer,
    /// `f64` with optional range bounds
    Float,
    /// Text with optional length bounds
    String,
    /// Boolean
    Boolean,
    /// Comma separated list validated element by element
    List,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Raw => write!(f, "raw"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::String => write!(f, "string"),
            FieldKind::Boolean => write!(f, "boolean"),
            FieldKind::List => write!(f, "list"),
        }
    }
}

/// An immutable, named field declaration.
///
/// A `Field` is created once, when its form is declared, and shared
/// read-only by every invocation of that form. It exposes no setters;
/// resolved values live in the invocation that produced them, never here.
///
/// Fields are built from the kind-specific builders ([`IntField`],
/// [`StringField`], ...) and named when registered on a form.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    source: Source,
    required: bool,
    default: Value,
    description: String,
    kind: FieldKind,
    stages: Vec<Arc<dyn Stage>>,
}

impl Field {
    /// Returns the field name used for payload lookup and access.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the source the field reads from.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Returns whether absence is an error.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the value used when an optional field is absent.
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Returns the free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Resolves the field against one request.
    ///
    /// Reads the raw value from the declared source. An absent or empty raw
    /// yields the default for optional fields and an error for required
    /// ones; anything else runs through the pipeline.
    ///
    /// # Errors
    ///
    /// - `Error::Ambiguous` if the source holds several values for the name
    /// - `Error::Validation` if the field is required and absent, or the
    ///   pipeline rejects the value
    pub fn resolve(&self, request: &dyn RequestData) -> Result<Value, Error> {
        let raw = source::read(request, self.source, &self.name)?;

        match raw {
            Some(raw) if !raw.peek().is_blank() => {
                Ok(self.run(&self.name, Value::from(raw.into_inner()))?)
            }
            _ if self.required => Err(ValidationError::required(&self.name).into()),
            _ => {
                tracing::trace!(
                    field = %self.name,
                    source = %self.source,
                    "field absent, using default"
                );
                Ok(self.default.clone())
            }
        }
    }

    /// Runs the pipeline on a value, without any absence handling.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` raised by a stage.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_core::{IntField, Value};
    ///
    /// let field = IntField::new().max_value(10).build().unwrap();
    /// assert_eq!(field.process("7"), Ok(Value::Int(7)));
    /// assert!(field.process("11").is_err());
    /// ```
    pub fn process(&self, raw: impl Into<Value>) -> Result<Value, ValidationError> {
        self.run(&self.name, raw.into())
    }

    /// Runs the pipeline, labelling errors with `label`.
    pub(crate) fn run(&self, label: &str, value: Value) -> Result<Value, ValidationError> {
        self.stages
            .iter()
            .try_fold(value, |value, stage| stage.apply(label, value))
    }
}

/// Options shared by every field builder.
#[derive(Debug, Clone)]
pub(crate) struct Common {
    pub(crate) source: Result<Source, ConfigurationError>,
    pub(crate) required: bool,
    pub(crate) default: Value,
    pub(crate) description: String,
    pub(crate) extra: Vec<Arc<dyn Stage>>,
}

impl Default for Common {
    fn default() -> Self {
        Self {
            source: Ok(Source::default()),
            required: true,
            default: Value::Null,
            description: String::new(),
            extra: Vec::new(),
        }
    }
}

impl Common {
    pub(crate) fn finish(
        self,
        name: &str,
        kind: FieldKind,
        mut stages: Vec<Arc<dyn Stage>>,
    ) -> Result<Field, ConfigurationError> {
        let source = self.source?;
        stages.extend(self.extra);
        Ok(Field {
            name: name.to_string(),
            source,
            required: self.required,
            default: self.default,
            description: self.description,
            kind,
            stages,
        })
    }
}

/// A field builder that can be registered under a name.
///
/// Registration happens once, at form declaration. The name given here is
/// the payload key and the accessor name.
pub trait DeclareField {
    /// Validates the options and produces the named field.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` for an invalid source or bounds.
    fn declare(self, name: &str) -> Result<Field, ConfigurationError>;
}

impl DeclareField for Field {
    fn declare(mut self, name: &str) -> Result<Field, ConfigurationError> {
        self.name = name.to_string();
        Ok(self)
    }
}

macro_rules! common_options {
    ($builder:ident) => {
        impl $builder {
            /// Sets the request source.
            pub fn source(mut self, source: $crate::source::Source) -> Self {
                self.common.source = Ok(source);
                self
            }

            /// Sets the request source by name (`query`/`args`, `body`/`form`, `json`).
            ///
            /// An unknown name is reported when the field is declared.
            pub fn source_named(mut self, name: &str) -> Self {
                self.common.source = name.parse();
                self
            }

            /// Sets whether absence is an error. Fields are required by default.
            pub fn required(mut self, required: bool) -> Self {
                self.common.required = required;
                self
            }

            /// Sets the value used when an optional field is absent.
            pub fn default(mut self, value: impl Into<$crate::value::Value>) -> Self {
                self.common.default = value.into();
                self
            }

            /// Sets the free-text description.
            pub fn description(mut self, description: impl Into<String>) -> Self {
                self.common.description = description.into();
                self
            }

            /// Appends a caller-supplied stage after the built-in ones.
            pub fn with_stage(mut self, stage: impl $crate::stage::Stage + 'static) -> Self {
                self.common.extra.push(::std::sync::Arc::new(stage));
                self
            }

            /// Builds an unnamed field, for use outside a form or as a list element.
            ///
            /// # Errors
            ///
            /// Returns a `ConfigurationError` for an invalid source or bounds.
            pub fn build(
                self,
            ) -> Result<$crate::field::Field, $crate::error::ConfigurationError> {
                $crate::field::DeclareField::declare(self, "")
            }
        }
    };
}

pub(crate) use common_options;

/// A field that passes the raw value through unchanged.
#[derive(Debug, Clone, Default)]
pub struct RawField {
    common: Common,
}

impl RawField {
    /// Creates a raw field reading from JSON.
    pub fn new() -> Self {
        <Self as Default>::default()
    }
}

common_options!(RawField);

impl DeclareField for RawField {
    fn declare(self, name: &str) -> Result<Field, ConfigurationError> {
        self.common.finish(name, FieldKind::Raw, Vec::new())
    }
}

macro_rules! numeric_field {
    ($builder:ident, $ty:ty, $kind:expr, $scalar:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default)]
        pub struct $builder {
            common: Common,
            range: RangeLimit<$ty>,
        }

        impl $builder {
            /// Creates the field reading from JSON, unbounded.
            pub fn new() -> Self {
                <Self as Default>::default()
            }

            /// Sets the lower bound (inclusive unless changed).
            pub fn min_value(mut self, min: $ty) -> Self {
                self.range.min = Some(min);
                self
            }

            /// Sets the upper bound (inclusive unless changed).
            pub fn max_value(mut self, max: $ty) -> Self {
                self.range.max = Some(max);
                self
            }

            /// Sets whether a value equal to the lower bound passes.
            pub fn inclusive_min(mut self, inclusive: bool) -> Self {
                self.range.inclusive_min = inclusive;
                self
            }

            /// Sets whether a value equal to the upper bound passes.
            pub fn inclusive_max(mut self, inclusive: bool) -> Self {
                self.range.inclusive_max = inclusive;
                self
            }
        }

        common_options!($builder);

        impl DeclareField for $builder {
            fn declare(self, name: &str) -> Result<Field, ConfigurationError> {
                self.range.check_bounds(name)?;
                let mut stages: Vec<Arc<dyn Stage>> = vec![Arc::new(Coerce($scalar))];
                if !self.range.is_unbounded() {
                    stages.push(Arc::new(self.range));
                }
                self.common.finish(name, $kind, stages)
            }
        }
    };
}

numeric_field!(
    IntField,
    i64,
    FieldKind::Integer,
    ScalarType::Integer,
    "An integer field with optional range bounds."
);

numeric_field!(
    FloatField,
    f64,
    FieldKind::Float,
    ScalarType::Float,
    "A float field with optional range bounds."
);

/// A string field with optional length bounds, counted in characters.
#[derive(Debug, Clone, Default)]
pub struct StringField {
    common: Common,
    length: LengthLimit,
}

impl StringField {
    /// Creates a string field reading from JSON, unbounded.
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Sets the minimum length.
    pub fn min_length(mut self, min: usize) -> Self {
        self.length.min = Some(min);
        self
    }

    /// Sets the maximum length.
    pub fn max_length(mut self, max: usize) -> Self {
        self.length.max = Some(max);
        self
    }
}

common_options!(StringField);

impl DeclareField for StringField {
    fn declare(self, name: &str) -> Result<Field, ConfigurationError> {
        self.length.check_bounds(name)?;
        let mut stages: Vec<Arc<dyn Stage>> = vec![Arc::new(Coerce(ScalarType::String))];
        if !self.length.is_unbounded() {
            stages.push(Arc::new(self.length));
        }
        self.common.finish(name, FieldKind::String, stages)
    }
}

/// A boolean field.
#[derive(Debug, Clone, Default)]
pub struct BoolField {
    common: Common,
}

impl BoolField {
    /// Creates a boolean field reading from JSON.
    pub fn new() -> Self {
        <Self as Default>::default()
    }
}

common_options!(BoolField);

impl DeclareField for BoolField {
    fn declare(self, name: &str) -> Result<Field, ConfigurationError> {
        let stages: Vec<Arc<dyn Stage>> = vec![Arc::new(Coerce(ScalarType::Boolean))];
        self.common.finish(name, FieldKind::Boolean, stages)
    }
}

/// Builds a default field of a scalar type reading from `source`.
pub(crate) fn scalar_field(
    scalar: ScalarType,
    source: Result<Source, ConfigurationError>,
    name: &str,
) -> Result<Field, ConfigurationError> {
    let source = source?;
    match scalar {
        ScalarType::Integer => IntField::new().source(source).declare(name),
        ScalarType::Float => FloatField::new().source(source).declare(name),
        ScalarType::String => StringField::new().source(source).declare(name),
        ScalarType::Boolean => BoolField::new().source(source).declare(name),
    }
}
