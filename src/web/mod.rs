//! Request boundary.
//!
//! Fields never touch a framework request type directly. They read through
//! [`RequestData`], which exposes the three payload containers a field can
//! declare as its source:
//! - query parameters (multi-valued)
//! - form-encoded body parameters (multi-valued)
//! - a parsed JSON body
//!
//! Framework integrations implement `RequestData` for their own request type,
//! or copy the relevant parts into a [`RequestAdapter`].
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//! let adapter = RequestAdapter::new(request_id)
//!     .with_query_string(uri.query().unwrap_or_default())
//!     .with_form_body(&form_body);
//!
//! // Open the invocation context and dispatch to the wrapped handler.
//! let response = form_core::request_scope(adapter, || handler(args));
//! ```

mod adapter;
mod extract;

pub use adapter::RequestAdapter;
pub use extract::RequestData;
