//! Forms: ordered, named field sets bound to handler invocations.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::context::{self, Binding};
use crate::error::{ConfigurationError, ContextError, Error};
use crate::field::{DeclareField, Field};
use crate::logging::ResolutionLog;
use crate::value::{FromValue, Value};
use crate::web::RequestData;

/// An ordered set of uniquely named fields.
///
/// A form is declared once and shared by every invocation of the handler
/// it wraps. Field values are resolved lazily: nothing is read or validated
/// until a handler asks for a field, and a field that is never asked for is
/// never validated for that invocation.
///
/// # Examples
///
/// ```
/// use form_core::{FloatField, Form, IntField, RequestAdapter, Source, StringField, current,
///     request_scope};
///
/// let form = Form::builder("BasicForm")
///     .field("a", IntField::new().source(Source::Query))
///     .field("b", StringField::new().source(Source::Query))
///     .field("c", StringField::new().source(Source::Query).required(false).default("default"))
///     .field("d", FloatField::new().source(Source::Query))
///     .build()
///     .expect("valid declaration");
///
/// let index = form.wrap(|_: ()| -> Result<String, form_core::Error> {
///     let form = current();
///     let a: i64 = form.get("a")?;
///     let b: String = form.get("b")?;
///     let c: String = form.get("c")?;
///     let d: f64 = form.get("d")?;
///     Ok(format!("{a} {b} {c} {d}"))
/// });
///
/// let request = RequestAdapter::new("req-1".to_string()).with_query_string("a=10&b=hello&d=12.5");
/// let body = request_scope(request, || index(())).unwrap();
/// assert_eq!(body, "10 hello default 12.5");
/// ```
#[derive(Debug)]
pub struct Form {
    name: String,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl Form {
    /// Starts declaring a form.
    pub fn builder(name: impl Into<String>) -> FormBuilder {
        FormBuilder::new(name.into())
    }

    /// Returns the form name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the field declared under `name`.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Returns the field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(Field::name)
    }

    /// Binds the form to one request without the ambient invocation context.
    pub fn bind<'a>(&'a self, request: &'a dyn RequestData) -> BoundForm<'a> {
        BoundForm {
            form: self,
            request,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Wraps a synchronous handler.
    ///
    /// The returned handler takes the same argument and returns the same
    /// value. Each call binds this form to the current request scope with a
    /// fresh value cache, runs the handler, then restores whatever binding
    /// was active before (so nested wrapped handlers compose).
    ///
    /// Handlers with several arguments take them as a tuple.
    pub fn wrap<A, R, F>(self: &Arc<Self>, handler: F) -> impl Fn(A) -> R
    where
        F: Fn(A) -> R,
    {
        let form = Arc::clone(self);
        move |args| {
            let mut binding = Some(Binding::new(&form));
            let _entered = context::enter(&mut binding);
            handler(args)
        }
    }

    /// Wraps an asynchronous handler.
    ///
    /// The returned future owns its binding. It is moved into the request
    /// scope only while the future is being polled, so wrapped futures polled
    /// together in one task (`join!`, `select!`) never see each other's form.
    pub fn wrap_async<A, Fut, F>(self: &Arc<Self>, handler: F) -> impl Fn(A) -> Activated<Fut>
    where
        F: Fn(A) -> Fut,
        Fut: Future,
    {
        let form = Arc::clone(self);
        move |args| Activated {
            inner: Box::pin(handler(args)),
            binding: Some(Binding::new(&form)),
        }
    }

    /// Resolves `name` against `request`, memoised in `cache`.
    pub(crate) fn resolve_cached(
        &self,
        request: &dyn RequestData,
        cache: &mut HashMap<String, Value>,
        name: &str,
    ) -> Result<Value, Error> {
        let log = ResolutionLog::new(&self.name, request.request_id());
        if let Some(value) = cache.get(name) {
            log.cached(name);
            return Ok(value.clone());
        }

        let field = self.field(name).ok_or_else(|| ContextError::UnknownField {
            form: self.name.clone(),
            field: name.to_string(),
        })?;

        match field.resolve(request) {
            Ok(value) => {
                log.resolved(field, &value);
                cache.insert(name.to_string(), value.clone());
                Ok(value)
            }
            Err(err) => {
                log.rejected(name, &err);
                Err(err)
            }
        }
    }

    /// Resolves every field, collecting all failures.
    pub(crate) fn validate_cached(
        &self,
        request: &dyn RequestData,
        cache: &mut HashMap<String, Value>,
    ) -> Result<(), Vec<Error>> {
        let errors: Vec<Error> = self
            .fields
            .iter()
            .filter_map(|field| self.resolve_cached(request, cache, field.name()).err())
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Converts a resolved value into the requested Rust type.
pub(crate) fn typed<T: FromValue>(field: &str, value: Value) -> Result<T, Error> {
    T::from_value(value).map_err(|found| {
        ContextError::TypeMismatch {
            field: field.to_string(),
            expected: T::EXPECTED,
            found: found.kind_name(),
        }
        .into()
    })
}

/// Declares a [`Form`].
///
/// Every field is named by the key it is registered under. Registration
/// happens exactly once per field, here, before the form can be invoked.
#[derive(Debug)]
pub struct FormBuilder {
    name: String,
    fields: Vec<Field>,
    declared: HashSet<String>,
    error: Option<ConfigurationError>,
}

impl FormBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            fields: Vec::new(),
            declared: HashSet::new(),
            error: None,
        }
    }

    /// Registers a field under `name`.
    ///
    /// A field with the same name inherited through [`extend`](Self::extend)
    /// is overridden in place.
    pub fn field(mut self, name: &str, field: impl DeclareField) -> Self {
        if self.error.is_some() {
            return self;
        }
        if name.is_empty() {
            self.error = Some(ConfigurationError::EmptyFieldName {
                form: self.name.clone(),
            });
            return self;
        }
        if !self.declared.insert(name.to_string()) {
            self.error = Some(ConfigurationError::DuplicateField {
                form: self.name.clone(),
                field: name.to_string(),
            });
            return self;
        }

        match field.declare(name) {
            Ok(field) => match self.fields.iter().position(|f| f.name() == name) {
                Some(i) => self.fields[i] = field,
                None => self.fields.push(field),
            },
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Inherits every field of `parent`, in its order.
    ///
    /// Fields already present (declared here or inherited earlier) win.
    pub fn extend(mut self, parent: &Form) -> Self {
        for field in parent.fields() {
            if !self.fields.iter().any(|f| f.name() == field.name()) {
                self.fields.push(field.clone());
            }
        }
        self
    }

    /// Finishes the declaration.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigurationError` found among the registered
    /// fields: an invalid source, inverted bounds, an empty or duplicate name.
    pub fn build(self) -> Result<Arc<Form>, ConfigurationError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let index = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name().to_string(), i))
            .collect();

        tracing::debug!(form = %self.name, fields = self.fields.len(), "form declared");

        Ok(Arc::new(Form {
            name: self.name,
            fields: self.fields,
            index,
        }))
    }
}

/// A form bound to one request, with its own value cache.
///
/// This is the explicitly threaded alternative to [`current`](crate::current):
/// the same lazy, memoised resolution, owned by the caller.
///
/// # Examples
///
/// ```
/// use form_core::{Form, IntField, RequestAdapter, Source};
///
/// let form = Form::builder("SizeForm")
///     .field("s", IntField::new().source(Source::Query).min_value(5).max_value(10))
///     .build()
///     .unwrap();
///
/// let request = RequestAdapter::default().with_query_string("s=5");
/// let bound = form.bind(&request);
/// assert_eq!(bound.get::<i64>("s").unwrap(), 5);
/// ```
pub struct BoundForm<'a> {
    form: &'a Form,
    request: &'a dyn RequestData,
    cache: RefCell<HashMap<String, Value>>,
}

impl<'a> BoundForm<'a> {
    /// Returns the bound form.
    pub fn form(&self) -> &'a Form {
        self.form
    }

    /// Resolves a field, or returns the value resolved earlier.
    ///
    /// # Errors
    ///
    /// Returns `Error::Context` for an unknown field, otherwise any
    /// resolution error of the field.
    pub fn value(&self, name: &str) -> Result<Value, Error> {
        let mut cache = self.cache.borrow_mut();
        self.form.resolve_cached(self.request, &mut cache, name)
    }

    /// Resolves a field and converts it to `T`.
    ///
    /// # Errors
    ///
    /// As [`value`](Self::value), plus `ContextError::TypeMismatch` when the
    /// value is not a `T`.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, Error> {
        typed(name, self.value(name)?)
    }

    /// Resolves every field now and reports all failures.
    ///
    /// # Errors
    ///
    /// Returns one error per failing field, in declaration order.
    pub fn validate(&self) -> Result<(), Vec<Error>> {
        let mut cache = self.cache.borrow_mut();
        self.form.validate_cached(self.request, &mut cache)
    }
}

/// Future returned by handlers wrapped with [`Form::wrap_async`].
#[must_use = "futures do nothing unless polled"]
pub struct Activated<Fut> {
    inner: Pin<Box<Fut>>,
    binding: Option<Binding>,
}

impl<Fut: Future> Future for Activated<Fut> {
    type Output = Fut::Output;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        // Bound for this poll only; the binding and its cache come back here
        // before returning.
        let _entered = context::enter(&mut this.binding);
        this.inner.as_mut().poll(cx)
    }
}
