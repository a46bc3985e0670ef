//! Lookup boundary between framework request types and field sources.

/// Read access to the payload containers of one request.
///
/// This trait is the only thing a field needs from the surrounding web
/// framework. Implementations map their own request type onto it:
/// - `query_values` returns every value sent for `name` in the query string,
///   in arrival order
/// - `body_values` does the same for a form-encoded body
/// - `json_body` returns the parsed JSON body, or `None` when the body is
///   missing or cannot be parsed
///
/// It ONLY maps framework types to lookups. Single-value enforcement,
/// absence rules and coercion all happen in the field pipeline.
///
/// # Examples
///
/// ```
/// use form_core::RequestData;
/// use std::collections::HashMap;
///
/// // Example framework-specific implementation
/// struct MyFrameworkRequest {
///     query: HashMap<String, Vec<String>>,
/// }
///
/// impl RequestData for MyFrameworkRequest {
///     fn query_values(&self, name: &str) -> Vec<&str> {
///         self.query
///             .get(name)
///             .map(|values| values.iter().map(String::as_str).collect())
///             .unwrap_or_default()
///     }
///
///     fn body_values(&self, _name: &str) -> Vec<&str> {
///         Vec::new()
///     }
///
///     fn json_body(&self) -> Option<&serde_json::Value> {
///         None
///     }
/// }
/// ```
pub trait RequestData {
    /// Returns all query-string values sent for `name`.
    fn query_values(&self, name: &str) -> Vec<&str>;

    /// Returns all form-body values sent for `name`.
    fn body_values(&self, name: &str) -> Vec<&str>;

    /// Returns the parsed JSON body, if one was sent and parsed.
    fn json_body(&self) -> Option<&serde_json::Value>;

    /// Returns an identifier for log correlation, if the request has one.
    fn request_id(&self) -> Option<&str> {
        None
    }
}
