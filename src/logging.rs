use crate::error::Error;
use crate::field::Field;
use crate::value::Value;

/// Structured resolution events for one form invocation.
///
/// `ResolutionLog` is created per resolution by the form binding and tags
/// every event with the form name and, when the request has one, its ID.
/// Field values are never logged, only their kind.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolutionLog<'a> {
    form: &'a str,
    request_id: Option<&'a str>,
}

impl<'a> ResolutionLog<'a> {
    pub(crate) fn new(form: &'a str, request_id: Option<&'a str>) -> Self {
        Self { form, request_id }
    }

    /// Logs a freshly resolved field at debug level.
    pub(crate) fn resolved(&self, field: &Field, value: &Value) {
        tracing::debug!(
            form = %self.form,
            field = %field.name(),
            source = %field.source(),
            request_id = self.request_id.unwrap_or("-"),
            kind = value.kind_name(),
            "field resolved"
        );
    }

    /// Logs a value served from the invocation cache.
    pub(crate) fn cached(&self, field: &str) {
        tracing::debug!(
            form = %self.form,
            field = %field,
            request_id = self.request_id.unwrap_or("-"),
            "field served from invocation cache"
        );
    }

    /// Logs a rejected field at warn level.
    pub(crate) fn rejected(&self, field: &str, error: &Error) {
        tracing::warn!(
            form = %self.form,
            field = %field,
            request_id = self.request_id.unwrap_or("-"),
            error = %error,
            "field rejected"
        );
    }
}
