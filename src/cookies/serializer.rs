//! Attribute-string serialization.
//!
//! Output layout:
//!
//! ```text
//! <prefix><key>=<value>; Max-Age=<seconds|Session>;[ Domain=<d>;] Path=<p>;[ Secure;][ HttpOnly;] SameSite=<s>
//! ```
//!
//! `Max-Age` is always whole seconds. A store treats `Max-Age=Session` as an
//! unparseable attribute and keeps the cookie for the session.

use crate::cookies::config::ManagerConfig;
use crate::cookies::record::{CookiePrefix, CookieRecord, Expiration};

/// Serialize with the default config (`Path=/`, `SameSite=Lax`).
pub fn serialize(record: &CookieRecord) -> String {
    serialize_with(record, &ManagerConfig::default())
}

/// Serialize a validated record.
pub fn serialize_with(record: &CookieRecord, config: &ManagerConfig) -> String {
    let mut out = format!("{}={}; Max-Age=", record.full_name(), record.value);

    match record.expire {
        Some(Expiration::MaxAge(max_age)) => {
            out.push_str(&format!("{};", max_age.whole_seconds()));
        }
        Some(Expiration::Session) | None => out.push_str("Session;"),
    }

    if let Some(domain) = &record.domain {
        out.push_str(&format!(" Domain={};", domain));
    }

    let path = record.path.as_deref().unwrap_or(&config.default_path);
    out.push_str(&format!(" Path={};", path));

    if record.secure {
        out.push_str(" Secure;");
    }
    if record.http_only {
        out.push_str(" HttpOnly;");
    }

    let same_site = record.same_site.unwrap_or(config.default_same_site);
    out.push_str(&format!(" SameSite={}", same_site));

    out
}

/// Serialize the write that deletes `name` at `domain`/`path`.
///
/// Prefixed names get `Secure`, otherwise browsers refuse the overwrite.
pub fn serialize_removal(
    name: &str,
    domain: Option<&str>,
    path: Option<&str>,
    config: &ManagerConfig,
) -> String {
    let mut out = format!("{}=; Max-Age=-1;", name);

    if let Some(domain) = domain {
        out.push_str(&format!(" Domain={};", domain));
    }

    let path = match CookiePrefix::of(name) {
        Some(CookiePrefix::Host) => "/",
        _ => path.unwrap_or(&config.default_path),
    };
    out.push_str(&format!(" Path={};", path));

    if CookiePrefix::of(name).is_some() {
        out.push_str(" Secure;");
    }

    out
}
