//! Owned request adapter for frameworks and tests.

use url::form_urlencoded;

use super::RequestData;

/// Framework-agnostic request holding the three payload containers.
///
/// `RequestAdapter` contains simple, owned data so it is not coupled to any
/// framework's request types. Framework code can fill it from its own
/// request, and tests can build one directly.
///
/// Query and body parameters are multi-valued and keep arrival order.
///
/// # Examples
///
/// ```
/// use form_core::{RequestAdapter, RequestData};
///
/// let adapter = RequestAdapter::new("req-12345".to_string())
///     .with_query_string("a=10&b=hello%20world&d=12.5");
///
/// assert_eq!(adapter.query_values("b"), vec!["hello world"]);
/// assert_eq!(adapter.request_id(), Some("req-12345"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestAdapter {
    /// Unique request identifier (for log correlation)
    request_id: String,
    /// Query parameters from URL
    query_params: Vec<(String, String)>,
    /// Form-encoded body parameters
    body_params: Vec<(String, String)>,
    /// Parsed JSON body, if one parsed
    json: Option<serde_json::Value>,
}

impl RequestAdapter {
    /// Creates a new request adapter with the given request ID.
    ///
    /// All containers start empty.
    pub fn new(request_id: String) -> Self {
        Self {
            request_id,
            ..Self::default()
        }
    }

    /// Adds a query parameter. Repeated names accumulate.
    pub fn add_query_param(&mut self, key: String, value: String) {
        self.query_params.push((key, value));
    }

    /// Adds a form-body parameter. Repeated names accumulate.
    pub fn add_body_param(&mut self, key: String, value: String) {
        self.body_params.push((key, value));
    }

    /// Parses a URL-encoded query string (without the leading `?`) and adds
    /// every pair as a query parameter.
    pub fn with_query_string(mut self, query: &str) -> Self {
        self.query_params.extend(
            form_urlencoded::parse(query.trim_start_matches('?').as_bytes()).into_owned(),
        );
        self
    }

    /// Parses an `application/x-www-form-urlencoded` body and adds every pair
    /// as a body parameter.
    pub fn with_form_body(mut self, body: &str) -> Self {
        self.body_params
            .extend(form_urlencoded::parse(body.as_bytes()).into_owned());
        self
    }

    /// Sets the JSON body from raw text.
    ///
    /// Parsing is silent: text that is not valid JSON leaves the request
    /// without a JSON body, and JSON fields then read from the form body.
    pub fn set_json_body(&mut self, body: &str) {
        self.json = serde_json::from_str(body).ok();
    }

    /// Sets an already-parsed JSON body.
    pub fn set_json_value(&mut self, body: serde_json::Value) {
        self.json = Some(body);
    }

    /// Returns a reference to the request ID.
    pub fn id(&self) -> &str {
        &self.request_id
    }
}

fn lookup<'a>(params: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    params
        .iter()
        .filter(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
        .collect()
}

impl RequestData for RequestAdapter {
    fn query_values(&self, name: &str) -> Vec<&str> {
        lookup(&self.query_params, name)
    }

    fn body_values(&self, name: &str) -> Vec<&str> {
        lookup(&self.body_params, name)
    }

    fn json_body(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    fn request_id(&self) -> Option<&str> {
        Some(&self.request_id).filter(|id| !id.is_empty()).map(String::as_str)
    }
}
