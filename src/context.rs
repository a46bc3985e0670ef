//! Invocation context: which form, and which resolved values, belong to the
//! request currently being handled.
//!
//! The context lives in a `tokio` task-local, so it is visible only to code
//! running inside the request scope that created it. Concurrent requests,
//! whether on separate tasks or separate threads, each see their own.
//!
//! ```text
//! request_scope(request, ..)        creates the context (no form yet)
//!   wrapped handler starts          binds its form with an empty cache
//!     current().get("a")            resolves "a" once, caches it
//!   wrapped handler returns         restores the previous binding
//! scope ends                        context and cache are discarded
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::task_local;

use crate::error::{ContextError, Error};
use crate::form::{Form, typed};
use crate::value::{FromValue, Value};
use crate::web::RequestData;

task_local! {
    static INVOCATION: RefCell<Invocation>;
}

struct Invocation {
    request: Arc<dyn RequestData + Send + Sync>,
    binding: Option<Binding>,
}

/// The form bound to one wrapped-handler call, with that call's cache.
///
/// Owned by the call between polls and moved into the task-local only while
/// the call is running.
pub(crate) struct Binding {
    form: Arc<Form>,
    cache: HashMap<String, Value>,
}

impl Binding {
    pub(crate) fn new(form: &Arc<Form>) -> Self {
        Self {
            form: Arc::clone(form),
            cache: HashMap::new(),
        }
    }

    fn resolve(&mut self, request: &dyn RequestData, name: &str) -> Result<Value, Error> {
        let Binding { form, cache } = self;
        form.resolve_cached(request, cache, name)
    }
}

/// Runs `f` inside a request scope for `request`.
///
/// This is what the dispatch layer calls around a (synchronous) handler.
/// The scope is discarded when `f` returns.
///
/// # Examples
///
/// ```
/// use form_core::{RequestAdapter, current, request_scope};
///
/// let request = RequestAdapter::new("req-1".to_string());
/// let bound = request_scope(request, || current().is_bound());
/// assert!(!bound);
/// ```
pub fn request_scope<R>(
    request: impl RequestData + Send + Sync + 'static,
    f: impl FnOnce() -> R,
) -> R {
    INVOCATION.sync_scope(RefCell::new(Invocation::new(request)), f)
}

/// Runs `future` inside a request scope for `request`.
///
/// The scope travels with the future across `.await` points and threads.
pub async fn request_scope_async<F: Future>(
    request: impl RequestData + Send + Sync + 'static,
    future: F,
) -> F::Output {
    INVOCATION
        .scope(RefCell::new(Invocation::new(request)), future)
        .await
}

impl Invocation {
    fn new(request: impl RequestData + Send + Sync + 'static) -> Self {
        Self {
            request: Arc::new(request),
            binding: None,
        }
    }
}

/// A binding moved into the current request scope until dropped.
///
/// On drop the binding (with everything it cached) goes back to its owner
/// and the binding that was active before is restored.
pub(crate) struct Entered<'a> {
    slot: &'a mut Option<Binding>,
    previous: Option<Binding>,
    in_scope: bool,
}

/// Moves the binding held in `slot` into the current request scope.
///
/// Outside a request scope the binding stays in `slot` and the caller still
/// runs; field access then fails with `ContextError::NoRequestScope`.
pub(crate) fn enter(slot: &mut Option<Binding>) -> Entered<'_> {
    let mut incoming = slot.take();
    let name = incoming
        .as_ref()
        .map(|binding| binding.form.name().to_string())
        .unwrap_or_default();

    let swapped = INVOCATION.try_with(|cell| match cell.try_borrow_mut() {
        Ok(mut invocation) => Some(std::mem::replace(&mut invocation.binding, incoming.take())),
        Err(_) => None,
    });

    match swapped {
        Ok(Some(previous)) => {
            tracing::trace!(form = %name, nested = previous.is_some(), "form bound to invocation");
            Entered {
                slot,
                previous,
                in_scope: true,
            }
        }
        Ok(None) => {
            tracing::warn!(form = %name, "wrapped handler called while a field is resolving");
            *slot = incoming;
            Entered {
                slot,
                previous: None,
                in_scope: false,
            }
        }
        Err(_) => {
            tracing::warn!(form = %name, "wrapped handler called outside a request scope");
            *slot = incoming;
            Entered {
                slot,
                previous: None,
                in_scope: false,
            }
        }
    }
}

impl Drop for Entered<'_> {
    fn drop(&mut self) {
        if !self.in_scope {
            return;
        }
        let previous = self.previous.take();
        let slot = &mut *self.slot;
        // The scope may already be gone if a future outlived it.
        let _ = INVOCATION.try_with(|cell| {
            if let Ok(mut invocation) = cell.try_borrow_mut() {
                *slot = std::mem::replace(&mut invocation.binding, previous);
            }
        });
    }
}

fn with_binding<R>(
    f: impl FnOnce(&dyn RequestData, &mut Binding) -> Result<R, Error>,
) -> Result<R, Error> {
    let result = INVOCATION.try_with(|cell| {
        let mut invocation = cell
            .try_borrow_mut()
            .map_err(|_| ContextError::Reentrant)?;
        let Invocation { request, binding } = &mut *invocation;
        let binding = binding.as_mut().ok_or(ContextError::NoActiveForm)?;
        f(&**request, binding)
    });
    match result {
        Ok(result) => result,
        Err(_) => Err(ContextError::NoRequestScope.into()),
    }
}

/// Handle on the form bound to the current invocation.
///
/// Obtained with [`current`]. Field values are resolved on first access
/// per invocation and cached for the rest of it; the cache is never shared
/// with other invocations of the same form.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentForm {
    _private: (),
}

/// Returns the accessor for the form bound to the current invocation.
///
/// # Examples
///
/// ```
/// use form_core::{ContextError, Error, current};
///
/// // Outside any request scope:
/// assert_eq!(current().value("a"), Err(Error::Context(ContextError::NoRequestScope)));
/// ```
pub fn current() -> CurrentForm {
    CurrentForm { _private: () }
}

impl CurrentForm {
    /// Resolves a field of the current form and converts it to `T`.
    ///
    /// # Errors
    ///
    /// - `ContextError::NoRequestScope` / `NoActiveForm` when called outside
    ///   a wrapped handler
    /// - `ContextError::UnknownField` when the form has no such field
    /// - `ContextError::TypeMismatch` when the value is not a `T`
    /// - any ambiguity or validation error of the field
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, Error> {
        typed(name, self.value(name)?)
    }

    /// Resolves a field of the current form.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), without the type check.
    pub fn value(&self, name: &str) -> Result<Value, Error> {
        with_binding(|request, binding| binding.resolve(request, name))
    }

    /// Returns the name of the current form.
    ///
    /// # Errors
    ///
    /// Returns `Error::Context` outside a wrapped handler.
    pub fn name(&self) -> Result<String, Error> {
        with_binding(|_, binding| Ok(binding.form.name().to_string()))
    }

    /// Returns whether a form is bound to the current invocation.
    pub fn is_bound(&self) -> bool {
        with_binding(|_, _| Ok(())).is_ok()
    }

    /// Resolves every field of the current form and reports all failures.
    ///
    /// # Errors
    ///
    /// Returns one error per failing field, or a single context error when
    /// no form is bound.
    pub fn validate(&self) -> Result<(), Vec<Error>> {
        with_binding(|request, binding| {
            let Binding { form, cache } = binding;
            Ok(form.validate_cached(request, cache))
        })
        .unwrap_or_else(|err| Err(vec![err]))
    }
}
