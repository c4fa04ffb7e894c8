//! Ergonomic error context helpers.
//!
//! Converts IO errors from file-backed stores into context-rich
//! [`CookieError::Store`] values.

use crate::base::error::CookieError;
use std::io;
use std::path::Path;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Attach the path of the store that failed.
    ///
    /// # Example
    /// ```ignore
    /// use cookiemanager::base::context::IoResultExt;
    ///
    /// let raw = std::fs::read_to_string(&path).store_context(&path)?;
    /// // Error: "Cookie store /tmp/jar.json failed: permission denied"
    /// ```
    fn store_context(self, path: &Path) -> Result<T, CookieError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn store_context(self, path: &Path) -> Result<T, CookieError> {
        self.map_err(|e| CookieError::store(path.display().to_string(), e.to_string()))
    }
}
