use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::Duration;

use crate::base::error::CookieError;

/// A cookie as the caller describes it before it is written.
///
/// Records are transient: build one, hand it to
/// [`CookieManager::set`](crate::cookies::manager::CookieManager::set), drop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRecord {
    pub key: String,
    pub value: String,
    pub prefix: Option<CookiePrefix>,
    pub expire: Option<Expiration>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

/// Reserved name prefixes that browsers attach extra constraints to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CookiePrefix {
    /// `__Secure-`: requires `Secure` set from a secure page.
    #[serde(rename = "__Secure-")]
    Secure,
    /// `__Host-`: requires `Secure`, `Path=/` and no `Domain`.
    #[serde(rename = "__Host-")]
    Host,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

/// Lifetime of a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Removed when the browsing session ends.
    Session,
    /// Removed after the given duration. Serialized as whole seconds.
    MaxAge(Duration),
}

/// The `{key, value}` pair visible through the cookie string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentCookie {
    pub key: String,
    pub value: String,
}

impl CookiePrefix {
    pub const ALL: [CookiePrefix; 2] = [CookiePrefix::Secure, CookiePrefix::Host];

    pub fn as_str(&self) -> &'static str {
        match self {
            CookiePrefix::Secure => "__Secure-",
            CookiePrefix::Host => "__Host-",
        }
    }

    /// The prefix `name` starts with, if any.
    pub fn of(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| name.starts_with(p.as_str()))
    }
}

impl fmt::Display for CookiePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SameSite {
    type Err = CookieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("strict") {
            Ok(SameSite::Strict)
        } else if s.eq_ignore_ascii_case("lax") {
            Ok(SameSite::Lax)
        } else if s.eq_ignore_ascii_case("none") {
            Ok(SameSite::None)
        } else {
            Err(CookieError::invalid_config(format!(
                "unknown SameSite value '{s}'"
            )))
        }
    }
}

impl From<SameSite> for cookie::SameSite {
    fn from(same_site: SameSite) -> Self {
        match same_site {
            SameSite::Strict => cookie::SameSite::Strict,
            SameSite::Lax => cookie::SameSite::Lax,
            SameSite::None => cookie::SameSite::None,
        }
    }
}

impl From<cookie::SameSite> for SameSite {
    fn from(same_site: cookie::SameSite) -> Self {
        match same_site {
            cookie::SameSite::Strict => SameSite::Strict,
            cookie::SameSite::Lax => SameSite::Lax,
            cookie::SameSite::None => SameSite::None,
        }
    }
}

impl Expiration {
    /// Shorthand for `Expiration::MaxAge(Duration::seconds(secs))`.
    pub fn seconds(secs: i64) -> Self {
        Expiration::MaxAge(Duration::seconds(secs))
    }

    /// Shorthand for `Expiration::MaxAge(Duration::days(days))`.
    pub fn days(days: i64) -> Self {
        Expiration::MaxAge(Duration::days(days))
    }
}

impl CookieRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            prefix: None,
            expire: None,
            domain: None,
            path: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    pub fn prefix(mut self, prefix: CookiePrefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn expire(mut self, expire: Expiration) -> Self {
        self.expire = Some(expire);
        self
    }

    pub fn max_age(self, max_age: Duration) -> Self {
        self.expire(Expiration::MaxAge(max_age))
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = Some(same_site);
        self
    }

    /// Name as it appears in the cookie string: `<prefix><key>`.
    pub fn full_name(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{}{}", prefix.as_str(), self.key),
            None => self.key.clone(),
        }
    }

    /// The pair a store will expose once this record is written.
    pub fn document_cookie(&self) -> DocumentCookie {
        DocumentCookie {
            key: self.full_name(),
            value: self.value.clone(),
        }
    }

    /// Convert into a [`cookie::Cookie`] for use with HTTP stacks.
    ///
    /// Unset `path` and `same_site` are left unset rather than defaulted.
    pub fn to_cookie(&self) -> cookie::Cookie<'static> {
        let mut builder = cookie::Cookie::build((self.full_name(), self.value.clone()))
            .secure(self.secure)
            .http_only(self.http_only);

        if let Some(domain) = &self.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(path) = &self.path {
            builder = builder.path(path.clone());
        }
        if let Some(same_site) = self.same_site {
            builder = builder.same_site(same_site.into());
        }
        if let Some(Expiration::MaxAge(max_age)) = self.expire {
            builder = builder.max_age(max_age);
        }

        builder.build()
    }
}

impl DocumentCookie {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for DocumentCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}
