//! Cookie validation, serialization, parsing and management.
//!
//! The pieces line up around one string-based cookie surface, the model of
//! a browser's `document.cookie`:
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`record`] | [`CookieRecord`](record::CookieRecord) and its attribute types |
//! | [`validator`] | Prefix, `Secure`, `SameSite` and expiry rules |
//! | [`serializer`] | Record to attribute string |
//! | [`parser`] | Cookie string to `{key, value}` pairs |
//! | [`store`] | The [`CookieStore`](store::CookieStore) surface and an in-memory jar |
//! | [`persistence`] | JSON file backed store |
//! | [`manager`] | [`CookieManager`](manager::CookieManager) operations |
//!
//! # Setting and reading cookies
//!
//! ```rust
//! use cookiemanager::cookies::manager::CookieManager;
//! use cookiemanager::cookies::record::{CookiePrefix, CookieRecord, SameSite};
//! use cookiemanager::cookies::store::MemoryCookieStore;
//!
//! let manager = CookieManager::new(MemoryCookieStore::new());
//! manager.set(
//!     &CookieRecord::new("session", "abc123")
//!         .prefix(CookiePrefix::Host)
//!         .secure(true)
//!         .path("/")
//!         .same_site(SameSite::Strict),
//! )?;
//!
//! assert_eq!(manager.keys()?, vec!["__Host-session"]);
//! # Ok::<(), cookiemanager::base::error::CookieError>(())
//! ```
//!
//! # Wire format
//!
//! `Max-Age` is written in whole seconds, `Path` defaults to `/` and
//! `SameSite` to `Lax`; both defaults come from
//! [`ManagerConfig`](config::ManagerConfig).

pub mod config;
pub mod manager;
pub mod parser;
pub mod persistence;
pub mod psl;
pub mod record;
pub mod serializer;
pub mod store;
pub mod validator;
