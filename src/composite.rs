//! List fields: one raw string, split and validated element by element.

use std::sync::Arc;

use crate::error::{ConfigurationError, ValidationError};
use crate::field::{
    BoolField, Common, DeclareField, Field, FieldKind, FloatField, IntField, RawField, StringField,
    common_options, scalar_field,
};
use crate::stage::{LengthLimit, ScalarType, Stage};
use crate::value::Value;

/// Separator between list elements in a text raw.
pub const DELIMITER: char = ',';

/// The element definition of a [`ListField`].
///
/// Either an existing field whose constraints are shared by every list that
/// uses it, or a scalar type instantiated fresh for each list declaration
/// with the list's own source. Built through its `From` conversions.
///
/// An element builder with invalid options fails the list's declaration:
///
/// ```
/// use form_core::{ConfigurationError, IntField, ListField};
///
/// let err = ListField::new(IntField::new().min_value(3).max_value(1)).build().unwrap_err();
/// assert!(matches!(err, ConfigurationError::InvertedBounds { .. }));
/// ```
///
/// The definition is opaque:
///
/// ```compile_fail
/// use form_core::{ConfigurationError, ElementField};
///
/// let _ = ElementField::Invalid(ConfigurationError::InvalidSource("x".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct ElementField(Element);

#[derive(Debug, Clone)]
enum Element {
    Shared(Arc<Field>),
    Kind(ScalarType),
    Invalid(ConfigurationError),
}

impl From<Arc<Field>> for ElementField {
    fn from(field: Arc<Field>) -> Self {
        ElementField(Element::Shared(field))
    }
}

impl From<Field> for ElementField {
    fn from(field: Field) -> Self {
        ElementField(Element::Shared(Arc::new(field)))
    }
}

impl From<ScalarType> for ElementField {
    fn from(kind: ScalarType) -> Self {
        ElementField(Element::Kind(kind))
    }
}

macro_rules! element_from_builder {
    ($($builder:ident),*) => {
        $(
            impl From<$builder> for ElementField {
                fn from(builder: $builder) -> Self {
                    match builder.build() {
                        Ok(field) => ElementField(Element::Shared(Arc::new(field))),
                        Err(err) => ElementField(Element::Invalid(err)),
                    }
                }
            }
        )*
    };
}

element_from_builder!(RawField, IntField, FloatField, StringField, BoolField);

/// A field whose raw value is a comma separated list.
///
/// Each element runs through the element field's pipeline only; required
/// and default handling apply to the list as a whole. A JSON array raw is
/// accepted as already split.
///
/// # Examples
///
/// ```
/// use form_core::{ListField, ScalarType, Value};
///
/// let field = ListField::new(ScalarType::Integer).build().unwrap();
/// assert_eq!(field.process("1,2,3"), Ok(Value::from(vec![1, 2, 3])));
///
/// let err = field.process("1,x,3").unwrap_err();
/// assert_eq!(err.field(), "[1]");
/// ```
#[derive(Debug, Clone)]
pub struct ListField {
    common: Common,
    element: ElementField,
    items: LengthLimit,
}

impl ListField {
    /// Creates a list field reading from JSON.
    pub fn new(element: impl Into<ElementField>) -> Self {
        Self {
            common: Common::default(),
            element: element.into(),
            items: LengthLimit::default(),
        }
    }

    /// Sets the minimum number of elements.
    pub fn min_items(mut self, min: usize) -> Self {
        self.items.min = Some(min);
        self
    }

    /// Sets the maximum number of elements.
    pub fn max_items(mut self, max: usize) -> Self {
        self.items.max = Some(max);
        self
    }
}

common_options!(ListField);

impl DeclareField for ListField {
    fn declare(self, name: &str) -> Result<Field, ConfigurationError> {
        self.items.check_bounds(name)?;
        let element = match self.element.0 {
            Element::Shared(field) => field,
            Element::Kind(kind) => {
                Arc::new(scalar_field(kind, self.common.source.clone(), name)?)
            }
            Element::Invalid(err) => return Err(err),
        };

        let mut stages: Vec<Arc<dyn Stage>> = vec![Arc::new(EachElement { element })];
        if !self.items.is_unbounded() {
            stages.push(Arc::new(self.items));
        }
        self.common.finish(name, FieldKind::List, stages)
    }
}

/// Splits the value and runs every element through the element field.
#[derive(Debug)]
struct EachElement {
    element: Arc<Field>,
}

impl Stage for EachElement {
    fn apply(&self, field: &str, value: Value) -> Result<Value, ValidationError> {
        let items = match value {
            Value::Str(text) => text
                .split(DELIMITER)
                .map(|part| Value::Str(part.to_string()))
                .collect(),
            Value::List(items) => items,
            _ => return Err(ValidationError::conversion(field, "list")),
        };

        items
            .into_iter()
            .enumerate()
            .map(|(index, item)| self.element.run(&format!("{field}[{index}]"), item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }
}
