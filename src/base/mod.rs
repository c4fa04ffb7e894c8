//! Base types and error handling.
//!
//! - [`CookieError`](error::CookieError): typed rejections with stable codes
//! - [`IoResultExt`](context::IoResultExt): IO error context for stores

pub mod context;
pub mod error;
