use std::fmt;

/// A raw value read from a request that has not been through a field pipeline.
///
/// `Tainted<T>` is what the source lookup hands to a field. The only way to
/// get a usable value out of it is to resolve the field that read it, which
/// runs coercion and constraint checks first.
///
/// # Examples
///
/// ```
/// use form_core::{RawValue, Tainted};
///
/// let raw = Tainted::new(RawValue::Text("10".to_string()));
///
/// // Debug output shows it's tainted
/// assert!(format!("{:?}", raw).starts_with("Tainted"));
///
/// // But the inner value cannot be reached from outside the crate:
/// // let text = raw.inner; // Won't compile!
/// ```
#[derive(Clone, PartialEq)]
pub struct Tainted<T> {
    // Must stay private: fields are the only code allowed to unwrap request input.
    inner: T,
}

impl<T> Tainted<T> {
    /// Wraps an unprocessed value in `Tainted`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Borrows the inner value for crate-internal checks that do not
    /// let the value escape (e.g. absence tests).
    pub(crate) fn peek(&self) -> &T {
        &self.inner
    }

    /// Extracts the inner value for processing.
    ///
    /// Only the field pipeline calls this.
    pub(crate) fn into_inner(self) -> T {
        self.inner
    }
}

// Do not add Deref, AsRef, Borrow or Into<T>: they would let request input
// skip the field pipeline.

impl<T: fmt::Debug> fmt::Debug for Tainted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tainted")
            .field("inner", &self.inner)
            .finish()
    }
}
