//! # cookiemanager
//!
//! Read, write, validate and remove cookies through a single string-based
//! cookie surface, the way a page uses `document.cookie`.
//!
//! ## Features
//!
//! - **Validation**: `__Secure-`/`__Host-` prefix rules, `SameSite=None`
//!   requiring `Secure`, reserved characters, public suffix domains
//! - **Serialization**: records to `Set-Cookie`-style attribute strings
//! - **Parsing**: the raw cookie string to ordered `{key, value}` pairs
//! - **Stores**: an in-memory browser jar shareable across threads, and a
//!   JSON file backed jar
//!
//! ## Quick Start
//!
//! ```rust
//! use cookiemanager::cookies::manager::CookieManager;
//! use cookiemanager::cookies::record::CookieRecord;
//! use cookiemanager::cookies::store::MemoryCookieStore;
//!
//! let cookies = CookieManager::new(MemoryCookieStore::new());
//! cookies.set(&CookieRecord::new("lang", "en"))?;
//! assert!(cookies.exist("lang")?);
//! # Ok::<(), cookiemanager::base::error::CookieError>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error types and IO context helpers
//! - [`cookies`] - Records, codec, stores and the manager

pub mod base;
pub mod cookies;
