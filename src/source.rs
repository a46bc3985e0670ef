//! Request payload sources and the single-value lookup rule.

use std::fmt;
use std::str::FromStr;

use crate::error::{AmbiguousFieldError, ConfigurationError};
use crate::tainted::Tainted;
use crate::value::RawValue;
use crate::web::RequestData;

/// The request container a field reads its raw value from.
///
/// # Examples
///
/// ```
/// use form_core::Source;
///
/// assert_eq!("query".parse::<Source>().unwrap(), Source::Query);
/// assert_eq!("args".parse::<Source>().unwrap(), Source::Query);
/// assert_eq!("".parse::<Source>().unwrap(), Source::Json);
/// assert!("cookies".parse::<Source>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Source {
    /// URL query parameters
    Query,
    /// Form-encoded request body
    Body,
    /// JSON request body; falls back to `Body` when no JSON object was sent
    #[default]
    Json,
}

impl Source {
    /// Returns the canonical name of the source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Query => "query",
            Source::Body => "body",
            Source::Json => "json",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" | "args" => Ok(Source::Query),
            "body" | "form" => Ok(Source::Body),
            "json" | "" => Ok(Source::Json),
            other => Err(ConfigurationError::InvalidSource(other.to_string())),
        }
    }
}

/// Reads the raw value named `name` from `source`.
///
/// Returns `Ok(None)` when the request carries no value under that name.
/// Query and body parameters must be single-valued.
pub(crate) fn read(
    request: &dyn RequestData,
    source: Source,
    name: &str,
) -> Result<Option<Tainted<RawValue>>, AmbiguousFieldError> {
    match source {
        Source::Query => single(request.query_values(name), source, name),
        Source::Body => single(request.body_values(name), source, name),
        Source::Json => match request.json_body() {
            Some(serde_json::Value::Object(map)) => Ok(map
                .get(name)
                .map(|value| Tainted::new(RawValue::Json(value.clone())))),
            _ => single(request.body_values(name), Source::Body, name),
        },
    }
}

fn single(
    values: Vec<&str>,
    source: Source,
    name: &str,
) -> Result<Option<Tainted<RawValue>>, AmbiguousFieldError> {
    match values.as_slice() {
        [] => Ok(None),
        [value] => Ok(Some(Tainted::new(RawValue::Text((*value).to_string())))),
        many => Err(AmbiguousFieldError::new(name, source, many.len())),
    }
}
