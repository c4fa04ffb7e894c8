//! The host cookie surface.
//!
//! A [`CookieStore`] is the single mutable cookie string a page sees:
//! `read` returns every visible cookie as `a=1; b=2`, `write` applies one
//! attribute string. [`MemoryCookieStore`] emulates a browser jar behind
//! that surface.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use time::OffsetDateTime;

use crate::base::error::CookieError;
use crate::cookies::record::{CookiePrefix, SameSite};

/// Read the whole cookie string, write one cookie at a time.
pub trait CookieStore {
    /// The current cookie string, `name=value` pairs joined by `"; "`.
    fn read(&self) -> Result<String, CookieError>;

    /// Apply one attribute string. Writes the jar refuses are dropped
    /// silently, like `document.cookie` assignments.
    fn write(&self, attributes: &str) -> Result<(), CookieError>;
}

impl<S: CookieStore + ?Sized> CookieStore for &S {
    fn read(&self) -> Result<String, CookieError> {
        (**self).read()
    }

    fn write(&self, attributes: &str) -> Result<(), CookieError> {
        (**self).write(attributes)
    }
}

impl<S: CookieStore + ?Sized> CookieStore for Arc<S> {
    fn read(&self) -> Result<String, CookieError> {
        (**self).read()
    }

    fn write(&self, attributes: &str) -> Result<(), CookieError> {
        (**self).write(attributes)
    }
}

/// A cookie held by [`MemoryCookieStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    /// `None` for host-only cookies.
    pub domain: Option<String>,
    pub path: String,
    pub secure: bool,
    pub same_site: Option<SameSite>,
    /// `None` for session cookies.
    pub expires: Option<OffsetDateTime>,
    /// Insertion order; kept when a cookie is overwritten.
    pub sequence: u64,
}

impl StoredCookie {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires.is_some_and(|expiry| expiry <= now)
    }

    fn key(&self) -> CookieKey {
        (
            self.name.clone(),
            self.domain.clone().unwrap_or_default(),
            self.path.clone(),
        )
    }
}

/// What a write did to the jar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Stored,
    Deleted,
    Ignored,
}

/// (name, domain, path); an empty domain means host-only.
type CookieKey = (String, String, String);

/// In-memory browser cookie jar.
///
/// Shared between threads through `Arc`, the way several tabs share one
/// browser profile. Cookies are keyed by name, domain and path, so a write
/// with the same triple replaces (or with `Max-Age<=0` deletes) the
/// earlier cookie.
pub struct MemoryCookieStore {
    entries: DashMap<CookieKey, StoredCookie>,
    next_sequence: AtomicU64,
    secure_origin: bool,
}

impl Default for MemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCookieStore {
    /// A jar for a secure (`https:`) origin.
    pub fn new() -> Self {
        Self::with_secure_origin(true)
    }

    /// A jar for an origin that may be insecure; `Secure` and prefixed
    /// cookies are then refused.
    pub fn with_secure_origin(secure_origin: bool) -> Self {
        Self {
            entries: DashMap::new(),
            next_sequence: AtomicU64::new(0),
            secure_origin,
        }
    }

    /// Parse and apply one attribute string.
    pub fn apply(&self, attributes: &str) -> WriteOutcome {
        self.apply_at(attributes, OffsetDateTime::now_utc())
    }

    fn apply_at(&self, attributes: &str, now: OffsetDateTime) -> WriteOutcome {
        let parsed = match cookie::Cookie::parse(attributes) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unparseable cookie write");
                return WriteOutcome::Ignored;
            }
        };

        if parsed.http_only().unwrap_or(false) {
            tracing::debug!(name = %parsed.name(), "ignoring HttpOnly cookie written from script");
            return WriteOutcome::Ignored;
        }

        let secure = parsed.secure().unwrap_or(false);
        if secure && !self.secure_origin {
            tracing::debug!(name = %parsed.name(), "ignoring Secure cookie from insecure origin");
            return WriteOutcome::Ignored;
        }

        let domain = parsed
            .domain()
            .filter(|d| !d.is_empty())
            .map(str::to_lowercase);
        let path = parsed
            .path()
            .filter(|p| p.starts_with('/'))
            .unwrap_or("/")
            .to_string();

        if !self.prefix_allowed(parsed.name(), secure, domain.is_some(), &path) {
            tracing::debug!(name = %parsed.name(), "ignoring cookie violating its name prefix");
            return WriteOutcome::Ignored;
        }

        let expires = match parsed.max_age() {
            // Out-of-range Max-Age degrades to a session cookie.
            Some(max_age) => now.checked_add(max_age),
            None => parsed.expires_datetime(),
        };

        let cookie = StoredCookie {
            name: parsed.name().to_string(),
            value: parsed.value().to_string(),
            domain,
            path,
            secure,
            same_site: parsed.same_site().map(SameSite::from),
            expires,
            sequence: 0,
        };

        let key = cookie.key();
        if cookie.is_expired(now) {
            self.entries.remove(&key);
            return WriteOutcome::Deleted;
        }

        self.insert(key, cookie);
        WriteOutcome::Stored
    }

    /// Same rules a browser applies to `__Secure-` and `__Host-` names.
    fn prefix_allowed(&self, name: &str, secure: bool, has_domain: bool, path: &str) -> bool {
        match CookiePrefix::of(name) {
            Some(CookiePrefix::Secure) => secure && self.secure_origin,
            Some(CookiePrefix::Host) => secure && self.secure_origin && !has_domain && path == "/",
            None => true,
        }
    }

    fn insert(&self, key: CookieKey, mut cookie: StoredCookie) {
        let mut entry = self.entries.entry(key).or_insert_with(|| StoredCookie {
            sequence: self.next_sequence.fetch_add(1, Ordering::Relaxed),
            ..cookie.clone()
        });
        cookie.sequence = entry.sequence;
        *entry = cookie;
    }

    /// Put back a cookie, e.g. one loaded from disk. Keeps the relative
    /// order of restored cookies.
    pub fn restore(&self, cookie: StoredCookie) {
        self.next_sequence
            .fetch_max(cookie.sequence.saturating_add(1), Ordering::Relaxed);
        self.entries.insert(cookie.key(), cookie);
    }

    /// Live cookies, longest path first, then oldest first.
    pub fn cookies(&self) -> Vec<StoredCookie> {
        self.cookies_at(OffsetDateTime::now_utc())
    }

    fn cookies_at(&self, now: OffsetDateTime) -> Vec<StoredCookie> {
        self.entries.retain(|_, cookie| !cookie.is_expired(now));

        let mut result: Vec<StoredCookie> = self.entries.iter().map(|e| e.value().clone()).collect();
        result.sort_by(|a, b| {
            b.path
                .len()
                .cmp(&a.path.len())
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        result
    }

    fn render_at(&self, now: OffsetDateTime) -> String {
        self.cookies_at(now)
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Number of cookies held, expired ones included until the next read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cookie, like a user clearing site data.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl CookieStore for MemoryCookieStore {
    fn read(&self) -> Result<String, CookieError> {
        Ok(self.render_at(OffsetDateTime::now_utc()))
    }

    fn write(&self, attributes: &str) -> Result<(), CookieError> {
        self.apply(attributes);
        Ok(())
    }
}
