//! Declarative request-field validation for web handlers.
//!
//! A [`Form`] is an ordered set of named [`Field`]s. Each field declares
//! where its raw value comes from ([`Source`]), whether it is required, a
//! default, and the checks it must pass. Wrapping a handler with a form
//! makes those fields available through [`current`] while the handler runs:
//! values are read, converted and validated on first access, then cached
//! for the rest of that invocation only.
//!
//! # Core Types
//!
//! - [`Form`] / [`FormBuilder`]: declaration, inheritance and handler wrapping
//! - [`IntField`], [`FloatField`], [`StringField`], [`BoolField`], [`RawField`],
//!   [`ListField`]: field builders, each fixing an ordered pipeline of stages
//! - [`Stage`]: one coercion or check step; implement it for custom rules
//! - [`CurrentForm`]: accessor for the form bound to the running handler
//! - [`BoundForm`]: the same resolution, bound explicitly to one request
//! - [`RequestData`] / [`RequestAdapter`]: the boundary to the web framework
//!
//! # Examples
//!
//! ```
//! use form_core::{Error, Form, IntField, RequestAdapter, Source, current, request_scope};
//!
//! let form = Form::builder("SizeForm")
//!     .field("s", IntField::new().source(Source::Query).min_value(5).max_value(10))
//!     .build()
//!     .expect("valid declaration");
//!
//! let handler = form.wrap(|_: ()| current().get::<i64>("s"));
//!
//! let ok = RequestAdapter::new("req-1".to_string()).with_query_string("s=7");
//! assert_eq!(request_scope(ok, || handler(())), Ok(7));
//!
//! let too_big = RequestAdapter::new("req-2".to_string()).with_query_string("s=11");
//! let err = request_scope(too_big, || handler(())).unwrap_err();
//! assert_eq!(err.to_string(), "s is limited to max value 10 but actually is 11");
//! assert!(matches!(err, Error::Validation(_)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod composite;
mod context;
mod error;
mod field;
mod form;
mod logging;
mod source;
mod stage;
mod tainted;
mod value;
pub mod web;

#[cfg(test)]
mod test_utils;

pub use composite::{DELIMITER, ElementField, ListField};
pub use context::{CurrentForm, current, request_scope, request_scope_async};
pub use error::{
    AmbiguousFieldError, ConfigurationError, ContextError, Error, ValidationError,
    ValidationErrorKind,
};
pub use field::{
    BoolField, DeclareField, Field, FieldKind, FloatField, IntField, RawField, StringField,
};
pub use form::{Activated, BoundForm, Form, FormBuilder};
pub use source::Source;
pub use stage::{ScalarType, Stage};
pub use tainted::Tainted;
pub use value::{FromValue, RawValue, Value};
pub use web::{RequestAdapter, RequestData};
